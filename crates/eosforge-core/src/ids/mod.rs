//!
//! Strongly-typed chain identifiers shared by the registry, the toolchain
//! argument builders and the account handles.
//!

mod account;
mod permission;

pub use account::*;
pub use permission::*;
