//! Crate-internal test support: canned toolchain responses and isolated
//! wallet directories.

mod support;

pub use config::*;
pub use support::*;
