//! Test utilities and fixtures for exercising eosforge without a node.
//!
//! [`node::FakeNode`] is a stateful stand-in for the whole toolchain (node,
//! wallet daemon and compiler); [`scripted::ScriptedToolchain`] replays
//! canned outputs; [`workspace::TestWorkspace`] owns a temporary wallet and
//! contract directory.

pub mod node;
pub mod scripted;
pub mod workspace;

pub use node::FakeNode;
pub use scripted::ScriptedToolchain;
pub use workspace::TestWorkspace;

use eosforge_core::utils::rand::{NAME_ALPHABET, NAME_LEN};

///
/// Deterministic dummy-value generator for tests.
///
/// Produces stable account names and keys derived from a numeric seed, which
/// makes tests reproducible without hardcoding literals.
///

pub struct Fake;

impl Fake {
    ///
    /// Deterministically derive a valid 12-character account name from `seed`.
    ///
    #[must_use]
    pub fn account_name(seed: u32) -> String {
        let mut n = u64::from(seed);
        (0..NAME_LEN)
            .map(|_| {
                let idx = usize::try_from(n % NAME_ALPHABET.len() as u64).unwrap_or_default();
                n = n / NAME_ALPHABET.len() as u64 + 7;
                char::from(NAME_ALPHABET[idx])
            })
            .collect()
    }

    ///
    /// Deterministically derive a `(public, private)` key pair from `seed`.
    ///
    #[must_use]
    pub fn key_pair(seed: u32) -> (String, String) {
        (format!("EOS{seed:0>50}"), format!("5K{seed:0>49}"))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use eosforge_core::AccountName;

    #[test]
    fn fake_names_are_deterministic_valid_and_unique() {
        let a1 = Fake::account_name(42);
        let a2 = Fake::account_name(42);
        let b = Fake::account_name(99);

        assert_eq!(a1, a2, "Fake::account_name should be deterministic");
        assert_ne!(a1, b, "Fake::account_name should vary by seed");
        assert!(AccountName::parse(&a1).is_ok(), "{a1} should be a valid name");
    }

    #[test]
    fn fake_keys_differ_by_seed() {
        assert_ne!(Fake::key_pair(1), Fake::key_pair(2));
        assert!(Fake::key_pair(1).0.starts_with("EOS"));
    }
}
