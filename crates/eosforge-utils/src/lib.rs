//!
//! Utility helpers shared across eosforge crates: text formatting for the
//! diagnostics channel, random chain-name generation, and atomic JSON file
//! persistence. Each submodule provides a focused toolkit used by the core
//! model and workflow layers.
//!

pub mod format;
pub mod fs;
pub mod rand;
