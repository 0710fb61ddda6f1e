//! Core eosforge library: a local object model for wallets, accounts and
//! smart contracts on top of the EOSIO node toolchain (`cleos`, `nodeos`,
//! the contract compiler).
//!
//! Everything below the process boundary is delegated to a [`Toolchain`]
//! implementation; this crate reconciles names, caches wallet passwords,
//! classifies toolchain failures and drives the contract lifecycle.
//!
//! ## Layering
//!
//! - `config/` parses and validates `eosforge.toml`.
//! - `log` is the diagnostics channel (`Diagnostics` + the `log!` macro).
//! - `infra/` owns the process boundary (`Toolchain`, `CliToolchain`).
//! - `domain/policy/` holds side-effect-free decision rules (classification,
//!   registry conflicts, lifecycle ordering).
//! - `model/` owns the persisted files (object registry, credential cache).
//! - `ops/` builds toolchain invocations and parses their responses.
//! - `workflow/` composes the above into sessions, wallets, accounts,
//!   contracts, node control and template scaffolding.
//!
//! The default flow is: workflow → policy → ops → infra, with model reads and
//! writes at the workflow layer.

pub mod config;
pub mod domain;
pub mod error;
pub mod ids;
pub mod infra;
pub mod log;
pub mod model;
pub mod ops;
pub mod workflow;

#[cfg(test)]
mod test;

pub use ::eosforge_utils as utils;

pub(crate) use thiserror::Error as ThisError;

pub use {
    config::{Config, ConfigError, ConfigModel},
    domain::policy::{
        classify::{ClassifiedError, Classifier, ErrorKind, Rule},
        lifecycle::{ContractState, ImmutableContractError, LifecycleError},
        registry::ConflictError,
    },
    error::Error,
    ids::{AccountName, Permission},
    infra::{
        process::ProcessOutput,
        toolchain::{CliToolchain, Invocation, ToolOp, Toolchain, ToolchainError},
    },
    log::{Diagnostics, Topic, Verbosity},
    workflow::{
        account::{Account, AccountOptions, AccountOrigin, ActionData, ActionResult, KeyPair},
        contract::Contract,
        session::Session,
        wallet::Wallet,
    },
};

///
/// Crate Version
///

pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
