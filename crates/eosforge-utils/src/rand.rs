//!
//! Seedable PRNG used to mint chain account names.
//!
//! Names are identifiers, not secrets, so a ChaCha stream seeded from the OS
//! is plenty; tests seed it explicitly to get reproducible names.
//!
use rand_chacha::{
    ChaCha20Rng,
    rand_core::{RngCore, SeedableRng},
};

/// Characters allowed in a chain account name.
pub const NAME_ALPHABET: &[u8; 31] = b"abcdefghijklmnopqrstuvwxyz12345";

/// Length of a generated account name.
pub const NAME_LEN: usize = 12;

///
/// NameRng
///

pub struct NameRng {
    rng: ChaCha20Rng,
}

impl NameRng {
    /// Seed from operating-system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha20Rng::from_os_rng(),
        }
    }

    /// Seed with a fixed 32-byte value.
    #[must_use]
    pub fn seed_from(seed: [u8; 32]) -> Self {
        Self {
            rng: ChaCha20Rng::from_seed(seed),
        }
    }

    /// Produce a 32-bit random value.
    pub fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    /// Produce a fresh 12-character account name over `a-z1-5`.
    pub fn account_name(&mut self) -> String {
        (0..NAME_LEN)
            .map(|_| {
                let idx = self.rng.next_u32() as usize % NAME_ALPHABET.len();
                char::from(NAME_ALPHABET[idx])
            })
            .collect()
    }
}

impl Default for NameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn account_names_use_the_chain_alphabet() {
        let mut rng = NameRng::seed_from([5; 32]);

        for _ in 0..200 {
            let name = rng.account_name();
            assert_eq!(name.len(), NAME_LEN);
            assert!(
                name.bytes().all(|b| NAME_ALPHABET.contains(&b)),
                "bad character in {name}"
            );
        }
    }

    #[test]
    fn fixed_seed_is_deterministic() {
        let mut a = NameRng::seed_from([42; 32]);
        let mut b = NameRng::seed_from([42; 32]);

        for _ in 0..20 {
            assert_eq!(a.account_name(), b.account_name());
        }
    }

    #[test]
    fn names_do_not_repeat_in_practice() {
        let mut rng = NameRng::seed_from([9; 32]);
        let mut seen = HashSet::new();

        while seen.len() < 500 {
            let name = rng.account_name();
            assert!(seen.insert(name), "name already generated");
        }
    }
}
