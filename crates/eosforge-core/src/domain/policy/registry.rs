use crate::ThisError;
use std::collections::{BTreeMap, BTreeSet};

///
/// ConflictError
///
/// A chain account is already registered under another local name.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error(
    "chain account '{chain_name}' is already registered as '{existing}'; cannot register it as '{requested}'"
)]
pub struct ConflictError {
    pub chain_name: String,
    pub existing: String,
    pub requested: String,
}

///
/// RegistryPolicy
///

pub struct RegistryPolicy;

impl RegistryPolicy {
    /// Decide whether `local_name → chain_name` may be written into
    /// `mapping`. Re-registering an identical pair is allowed, as is mapping a
    /// reserved chain name under several local names. A local name that is
    /// reused for a different chain account simply moves.
    pub fn can_register(
        local_name: &str,
        chain_name: &str,
        mapping: &BTreeMap<String, String>,
        reserved: &BTreeSet<String>,
    ) -> Result<(), ConflictError> {
        if reserved.contains(chain_name) {
            return Ok(());
        }

        if let Some((existing, _)) = mapping
            .iter()
            .find(|(local, chain)| chain.as_str() == chain_name && local.as_str() != local_name)
        {
            return Err(ConflictError {
                chain_name: chain_name.to_string(),
                existing: existing.clone(),
                requested: local_name.to_string(),
            });
        }

        Ok(())
    }

    /// Entries that survive a clear: those whose chain name is excluded.
    #[must_use]
    pub fn retain_excluded(
        mapping: &BTreeMap<String, String>,
        exclude: &BTreeSet<String>,
    ) -> BTreeMap<String, String> {
        mapping
            .iter()
            .filter(|(_, chain)| exclude.contains(chain.as_str()))
            .map(|(local, chain)| (local.clone(), chain.clone()))
            .collect()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(l, c)| ((*l).to_string(), (*c).to_string()))
            .collect()
    }

    #[test]
    fn second_local_name_for_a_chain_name_conflicts() {
        let map = mapping(&[("alice", "x1y2z3aaaaaa")]);
        let err = RegistryPolicy::can_register("bob", "x1y2z3aaaaaa", &map, &BTreeSet::new())
            .expect_err("conflict");

        assert_eq!(err.existing, "alice");
        assert_eq!(err.requested, "bob");
    }

    #[test]
    fn identical_pair_and_moved_local_name_are_fine() {
        let map = mapping(&[("alice", "x1y2z3aaaaaa")]);
        let none = BTreeSet::new();

        assert!(RegistryPolicy::can_register("alice", "x1y2z3aaaaaa", &map, &none).is_ok());
        assert!(RegistryPolicy::can_register("alice", "b1b1b1b1b1b1", &map, &none).is_ok());
    }

    #[test]
    fn reserved_chain_names_may_repeat() {
        let map = mapping(&[("master", "eosio")]);
        let reserved = BTreeSet::from(["eosio".to_string()]);

        assert!(RegistryPolicy::can_register("eosio", "eosio", &map, &reserved).is_ok());
    }

    #[test]
    fn retain_keeps_entries_with_excluded_chain_names() {
        let map = mapping(&[("a", "X"), ("b", "Y")]);
        let exclude = BTreeSet::from(["X".to_string()]);

        assert_eq!(
            RegistryPolicy::retain_excluded(&map, &exclude),
            mapping(&[("a", "X")])
        );
    }
}
