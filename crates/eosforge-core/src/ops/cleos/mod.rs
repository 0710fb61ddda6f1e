//!
//! `cleos` invocations.
//!
//! Flags are fixed here so that every caller (and every fake toolchain used
//! in tests) agrees on a single argument layout per operation.
//!

pub mod parse;

use crate::{
    ThisError,
    infra::toolchain::{Invocation, ToolOp},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const FLAG_JSON: &str = "--json";
pub const FLAG_NAME: &str = "-n";
pub const FLAG_PASSWORD: &str = "--password";
pub const FLAG_PERMISSION: &str = "-p";
pub const FLAG_PRIVATE_KEY: &str = "--private-key";
pub const FLAG_TO_CONSOLE: &str = "--to-console";

///
/// ResponseError
///
/// A toolchain call succeeded but its output could not be understood.
///

#[derive(Debug, ThisError)]
pub enum ResponseError {
    #[error("unexpected {op} response: {detail}")]
    Unexpected { op: ToolOp, detail: String },
}

impl ResponseError {
    pub(crate) fn unexpected(op: ToolOp, detail: impl Into<String>) -> Self {
        Self::Unexpected {
            op,
            detail: detail.into(),
        }
    }
}

///
/// Stake
///
/// Resources bought for a funded (`system newaccount`) account.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Stake {
    pub net: String,
    pub cpu: String,
    pub ram_kbytes: u32,
    pub transfer: bool,
}

impl Default for Stake {
    fn default() -> Self {
        Self {
            net: "3 EOS".to_string(),
            cpu: "3 EOS".to_string(),
            ram_kbytes: 8,
            transfer: false,
        }
    }
}

///
/// KeyPair
///
/// Public key plus, when known locally, its private half.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct KeyPair {
    pub public: String,
    pub private: Option<String>,
}

impl KeyPair {
    #[must_use]
    pub fn new(public: impl Into<String>, private: impl Into<String>) -> Self {
        Self {
            public: public.into(),
            private: Some(private.into()),
        }
    }

    /// A key known only by its public half (restored accounts).
    #[must_use]
    pub fn public_only(public: impl Into<String>) -> Self {
        Self {
            public: public.into(),
            private: None,
        }
    }
}

///
/// CleosOps
///

pub struct CleosOps;

impl CleosOps {
    // ---- keys and wallets ----

    #[must_use]
    pub fn create_key() -> Invocation {
        Invocation::new(ToolOp::CreateKey).arg(FLAG_TO_CONSOLE)
    }

    #[must_use]
    pub fn wallet_create(name: &str) -> Invocation {
        Invocation::new(ToolOp::WalletCreate).args([FLAG_NAME, name, FLAG_TO_CONSOLE])
    }

    #[must_use]
    pub fn wallet_open(name: &str) -> Invocation {
        Invocation::new(ToolOp::WalletOpen).args([FLAG_NAME, name])
    }

    #[must_use]
    pub fn wallet_lock(name: &str) -> Invocation {
        Invocation::new(ToolOp::WalletLock).args([FLAG_NAME, name])
    }

    #[must_use]
    pub fn wallet_unlock(name: &str, password: &str) -> Invocation {
        Invocation::new(ToolOp::WalletUnlock).args([FLAG_NAME, name, FLAG_PASSWORD, password])
    }

    #[must_use]
    pub fn wallet_import(name: &str, private_key: &str) -> Invocation {
        Invocation::new(ToolOp::WalletImport).args([FLAG_NAME, name, FLAG_PRIVATE_KEY, private_key])
    }

    #[must_use]
    pub fn wallet_keys() -> Invocation {
        Invocation::new(ToolOp::WalletKeys)
    }

    #[must_use]
    pub fn wallet_list() -> Invocation {
        Invocation::new(ToolOp::WalletList)
    }

    // ---- accounts ----

    #[must_use]
    pub fn create_account(
        creator: &str,
        name: &str,
        owner_key: &str,
        active_key: &str,
        permission: &str,
        json: bool,
    ) -> Invocation {
        Invocation::new(ToolOp::CreateAccount)
            .args([creator, name, owner_key, active_key, FLAG_PERMISSION, permission])
            .args(json.then_some(FLAG_JSON))
    }

    #[must_use]
    pub fn system_newaccount(
        creator: &str,
        name: &str,
        owner_key: &str,
        active_key: &str,
        stake: &Stake,
        permission: &str,
        json: bool,
    ) -> Invocation {
        Invocation::new(ToolOp::SystemNewaccount)
            .args([creator, name, owner_key, active_key])
            .args(["--stake-net", stake.net.as_str(), "--stake-cpu", stake.cpu.as_str()])
            .args(["--buy-ram-kbytes".to_string(), stake.ram_kbytes.to_string()])
            .args(stake.transfer.then_some("--transfer"))
            .args([FLAG_PERMISSION, permission])
            .args(json.then_some(FLAG_JSON))
    }

    #[must_use]
    pub fn get_account(name: &str) -> Invocation {
        Invocation::new(ToolOp::GetAccount).args([name, FLAG_JSON])
    }

    #[must_use]
    pub fn get_accounts(public_key: &str) -> Invocation {
        Invocation::new(ToolOp::GetAccounts).arg(public_key)
    }

    // ---- contracts ----

    #[must_use]
    pub fn set_contract(
        account: &str,
        contract_dir: &Path,
        wasm_file: Option<&str>,
        abi_file: Option<&str>,
        permission: &str,
        json: bool,
    ) -> Invocation {
        let mut inv = Invocation::new(ToolOp::SetContract)
            .arg(account)
            .arg(contract_dir.display().to_string());
        if let Some(wasm) = wasm_file {
            inv = inv.arg(wasm);
            if let Some(abi) = abi_file {
                inv = inv.arg(abi);
            }
        }

        inv.args([FLAG_PERMISSION, permission])
            .args(json.then_some(FLAG_JSON))
    }

    #[must_use]
    pub fn push_action(
        contract: &str,
        action: &str,
        data: &str,
        permission: &str,
        json: bool,
    ) -> Invocation {
        Invocation::new(ToolOp::PushAction)
            .args([contract, action, data, FLAG_PERMISSION, permission])
            .args(json.then_some(FLAG_JSON))
    }

    #[must_use]
    pub fn get_table(code: &str, scope: &str, table: &str, limit: u32) -> Invocation {
        Invocation::new(ToolOp::GetTable)
            .args([code, scope, table])
            .args(["--limit".to_string(), limit.to_string()])
    }

    #[must_use]
    pub fn get_code(name: &str) -> Invocation {
        Invocation::new(ToolOp::GetCode).arg(name)
    }

    // ---- node ----

    #[must_use]
    pub fn get_info() -> Invocation {
        Invocation::new(ToolOp::GetInfo)
    }
}

///
/// TESTS
///
