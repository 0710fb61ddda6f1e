use crate::{
    ThisError,
    config::schema::{NodeConfig, ToolchainConfig},
    infra::process::{self, ProcessOutput, RunOutcome},
};
use derive_more::Display;
use std::{io, process::Command};

///
/// ToolOp
///
/// Logical toolchain operations. The set is closed: everything the core asks
/// of the node tooling is one of these.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum ToolOp {
    #[display("build abi")]
    BuildAbi,
    #[display("build wasm")]
    BuildWasm,
    #[display("create account")]
    CreateAccount,
    #[display("create key")]
    CreateKey,
    #[display("get account")]
    GetAccount,
    #[display("get accounts")]
    GetAccounts,
    #[display("get code")]
    GetCode,
    #[display("get info")]
    GetInfo,
    #[display("get table")]
    GetTable,
    #[display("node start")]
    NodeStart,
    #[display("node stop")]
    NodeStop,
    #[display("push action")]
    PushAction,
    #[display("set contract")]
    SetContract,
    #[display("system newaccount")]
    SystemNewaccount,
    #[display("wallet create")]
    WalletCreate,
    #[display("wallet import")]
    WalletImport,
    #[display("wallet keys")]
    WalletKeys,
    #[display("wallet list")]
    WalletList,
    #[display("wallet lock")]
    WalletLock,
    #[display("wallet open")]
    WalletOpen,
    #[display("wallet unlock")]
    WalletUnlock,
}

impl ToolOp {
    /// Sub-command words passed to `cleos`, or `None` for non-cleos ops.
    #[must_use]
    pub const fn cleos_words(self) -> Option<&'static [&'static str]> {
        let words: &'static [&'static str] = match self {
            Self::CreateAccount => &["create", "account"],
            Self::CreateKey => &["create", "key"],
            Self::GetAccount => &["get", "account"],
            Self::GetAccounts => &["get", "accounts"],
            Self::GetCode => &["get", "code"],
            Self::GetInfo => &["get", "info"],
            Self::GetTable => &["get", "table"],
            Self::PushAction => &["push", "action"],
            Self::SetContract => &["set", "contract"],
            Self::SystemNewaccount => &["system", "newaccount"],
            Self::WalletCreate => &["wallet", "create"],
            Self::WalletImport => &["wallet", "import"],
            Self::WalletKeys => &["wallet", "keys"],
            Self::WalletList => &["wallet", "list"],
            Self::WalletLock => &["wallet", "lock"],
            Self::WalletOpen => &["wallet", "open"],
            Self::WalletUnlock => &["wallet", "unlock"],
            Self::BuildAbi | Self::BuildWasm | Self::NodeStart | Self::NodeStop => return None,
        };

        Some(words)
    }

    /// True for operations that only read chain or wallet state.
    #[must_use]
    pub const fn is_query(self) -> bool {
        matches!(
            self,
            Self::GetAccount
                | Self::GetAccounts
                | Self::GetCode
                | Self::GetInfo
                | Self::GetTable
                | Self::WalletKeys
                | Self::WalletList
        )
    }
}

///
/// Invocation
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invocation {
    pub op: ToolOp,
    pub args: Vec<String>,
}

impl Invocation {
    #[must_use]
    pub const fn new(op: ToolOp) -> Self {
        Self {
            op,
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Value following `flag`, if present.
    #[must_use]
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }

    /// Positional argument `n`, skipping flags and their values.
    #[must_use]
    pub fn positional(&self, n: usize) -> Option<&str> {
        let mut skip = false;
        self.args
            .iter()
            .filter(|a| {
                if skip {
                    skip = false;
                    return false;
                }
                if a.starts_with('-') {
                    skip = !VALUELESS_FLAGS.contains(&a.as_str());
                    return false;
                }
                true
            })
            .nth(n)
            .map(String::as_str)
    }

    /// Single-line rendering used on the toolchain trace channel. Values of
    /// secret-bearing flags are masked, as is the private half of a
    /// `--signature-provider PUB=KEY:PRIV` spec.
    #[must_use]
    pub fn command_line(&self) -> String {
        let mut line = self.op.to_string();
        let mut previous: Option<&str> = None;
        for arg in &self.args {
            line.push(' ');
            if previous.is_some_and(|flag| SECRET_FLAGS.contains(&flag)) {
                line.push_str("***");
            } else if previous == Some(SIGNATURE_PROVIDER)
                && let Some(at) = arg.find(KEY_PROVIDER)
            {
                line.push_str(&arg[..at + KEY_PROVIDER.len()]);
                line.push_str("***");
            } else if arg.contains(char::is_whitespace) || arg.is_empty() {
                line.push('\'');
                line.push_str(arg);
                line.push('\'');
            } else {
                line.push_str(arg);
            }
            previous = Some(arg.as_str());
        }
        line
    }
}

const SECRET_FLAGS: &[&str] = &["--password", "--private-key"];

pub const SIGNATURE_PROVIDER: &str = "--signature-provider";
const KEY_PROVIDER: &str = "=KEY:";

// flags that never take a value
const VALUELESS_FLAGS: &[&str] = &["--json", "--to-console", "--transfer", "-j", "-e"];

///
/// ToolchainError
///

#[derive(Debug, ThisError)]
pub enum ToolchainError {
    #[error("cannot run {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("{op} did not finish within {secs}s")]
    Timeout { op: ToolOp, secs: u64 },

    #[error("{0} is not supported by this toolchain")]
    Unsupported(ToolOp),
}

///
/// Toolchain
///
/// The process seam. Implementations run one logical operation to completion
/// and hand back the captured output; they never interpret it.
///

pub trait Toolchain {
    fn invoke(&self, invocation: &Invocation) -> Result<ProcessOutput, ToolchainError>;
}

///
/// CliToolchain
///
/// Runs the real binaries: `cleos` for chain and wallet operations, the
/// contract compiler for builds, `nodeos` for the local node.
///

#[derive(Clone, Debug)]
pub struct CliToolchain {
    tools: ToolchainConfig,
    node: NodeConfig,
}

impl CliToolchain {
    #[must_use]
    pub fn new(tools: &ToolchainConfig, node: &NodeConfig) -> Self {
        Self {
            tools: tools.clone(),
            node: node.clone(),
        }
    }

    fn command(&self, invocation: &Invocation) -> Command {
        let op = invocation.op;

        if let Some(words) = op.cleos_words() {
            let mut cmd = Command::new(&self.tools.cleos);
            cmd.args(["--url", &self.node.url]);
            if self.node.use_keosd {
                cmd.args(["--wallet-url", &self.node.wallet_url]);
            }
            cmd.args(words).args(&invocation.args);
            return cmd;
        }

        let program: &str = match op {
            ToolOp::BuildAbi => &self.tools.abigen,
            ToolOp::BuildWasm => &self.tools.compiler,
            ToolOp::NodeStart => &self.tools.nodeos,
            _ => "pkill",
        };
        let mut cmd = Command::new(program);
        if op == ToolOp::NodeStop {
            cmd.args(["-f", &self.tools.nodeos]);
        }
        cmd.args(&invocation.args);
        cmd
    }

    fn spawn_error(&self, op: ToolOp, source: io::Error) -> ToolchainError {
        let program = match op {
            ToolOp::BuildAbi => self.tools.abigen.clone(),
            ToolOp::BuildWasm => self.tools.compiler.clone(),
            ToolOp::NodeStart => self.tools.nodeos.clone(),
            ToolOp::NodeStop => "pkill".to_string(),
            _ => self.tools.cleos.clone(),
        };

        ToolchainError::Spawn { program, source }
    }
}

impl Toolchain for CliToolchain {
    fn invoke(&self, invocation: &Invocation) -> Result<ProcessOutput, ToolchainError> {
        let op = invocation.op;
        let mut cmd = self.command(invocation);

        if op == ToolOp::NodeStart {
            let pid = process::spawn_detached(&mut cmd).map_err(|e| self.spawn_error(op, e))?;
            return Ok(ProcessOutput::success(format!("nodeos started, pid {pid}")));
        }

        match process::run_with_timeout(&mut cmd, self.tools.timeout())
            .map_err(|e| self.spawn_error(op, e))?
        {
            RunOutcome::Finished(out) => Ok(out),
            RunOutcome::TimedOut => Err(ToolchainError::Timeout {
                op,
                secs: self.tools.timeout_secs,
            }),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_skips_flags_and_their_values() {
        let inv = Invocation::new(ToolOp::PushAction).args([
            "host", "hi", "{\"user\":\"alice\"}", "-p", "alice", "--json",
        ]);

        assert_eq!(inv.positional(0), Some("host"));
        assert_eq!(inv.positional(2), Some("{\"user\":\"alice\"}"));
        assert_eq!(inv.positional(3), None);
        assert_eq!(inv.flag_value("-p"), Some("alice"));
        assert!(inv.has_flag("--json"));
    }

    #[test]
    fn command_line_quotes_spaced_args() {
        let inv = Invocation::new(ToolOp::WalletCreate).args(["-n", "my wallet"]);
        assert_eq!(inv.command_line(), "wallet create -n 'my wallet'");
    }

    #[test]
    fn command_line_masks_secrets() {
        let inv = Invocation::new(ToolOp::WalletUnlock).args(["-n", "default", "--password", "PW5secret"]);
        assert_eq!(inv.command_line(), "wallet unlock -n default --password ***");
    }

    #[test]
    fn command_line_masks_the_signature_provider_key() {
        let inv = Invocation::new(ToolOp::NodeStart).args([
            "-e",
            SIGNATURE_PROVIDER,
            "EOS6MRyAjQq=KEY:5KQwrPbwdL6",
            "--delete-all-blocks",
        ]);

        let line = inv.command_line();
        assert_eq!(
            line,
            "node start -e --signature-provider EOS6MRyAjQq=KEY:*** --delete-all-blocks"
        );
        assert!(!line.contains("5KQwr"));
    }

    #[test]
    fn cleos_commands_carry_the_node_url() {
        let node = NodeConfig {
            use_keosd: true,
            ..NodeConfig::default()
        };
        let tc = CliToolchain::new(&ToolchainConfig::default(), &node);
        let cmd = tc.command(&Invocation::new(ToolOp::GetInfo));

        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(cmd.get_program(), "cleos");
        assert_eq!(
            args,
            ["--url", "http://127.0.0.1:8888", "--wallet-url", "http://127.0.0.1:8900", "get", "info"]
        );
    }

    #[test]
    fn builds_use_the_compiler_binaries() {
        let tools = ToolchainConfig {
            abigen: "eosio-abigen".into(),
            ..ToolchainConfig::default()
        };
        let tc = CliToolchain::new(&tools, &NodeConfig::default());

        let abi = tc.command(&Invocation::new(ToolOp::BuildAbi).arg("a.cpp"));
        let wasm = tc.command(&Invocation::new(ToolOp::BuildWasm).arg("a.cpp"));

        assert_eq!(abi.get_program(), "eosio-abigen");
        assert_eq!(wasm.get_program(), "eosio-cpp");
        assert!(!ToolOp::BuildWasm.is_query());
    }
}
