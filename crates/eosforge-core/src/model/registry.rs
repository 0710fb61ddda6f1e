//!
//! Object registry: local object names mapped to chain account names.
//!
//! On disk the map is `{local_name: chain_name}`; the chain → local direction
//! is derived on every lookup. Entry counts are small (tens to low hundreds),
//! so lookups are linear scans over a freshly loaded snapshot.
//!

use crate::{
    Error,
    domain::policy::registry::{ConflictError, RegistryPolicy},
    ids::is_name_char,
    log::{Diagnostics, Topic},
    model::{FileStateError, load_map, save_map},
};
use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

const WHAT: &str = "account map";

///
/// ObjectRegistry
///

#[derive(Clone, Debug)]
pub struct ObjectRegistry {
    path: PathBuf,
    reserved: BTreeSet<String>,
}

impl ObjectRegistry {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, reserved: BTreeSet<String>) -> Self {
        Self {
            path: path.into(),
            reserved,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Chain names kept by [`Self::clear_reserved`] and allowed to repeat.
    #[must_use]
    pub const fn reserved(&self) -> &BTreeSet<String> {
        &self.reserved
    }

    #[must_use]
    pub fn entries(&self, diag: &Diagnostics) -> BTreeMap<String, String> {
        load_map(diag, Topic::Registry, WHAT, &self.path)
    }

    /// Dry run of [`Self::register`]; never writes.
    pub fn check(
        &self,
        diag: &Diagnostics,
        local_name: &str,
        chain_name: &str,
    ) -> Result<(), ConflictError> {
        RegistryPolicy::can_register(local_name, chain_name, &self.entries(diag), &self.reserved)
    }

    /// Record `local_name → chain_name`. A conflict leaves the file untouched.
    pub fn register(
        &self,
        diag: &Diagnostics,
        local_name: &str,
        chain_name: &str,
    ) -> Result<(), Error> {
        let mut map = self.entries(diag);
        RegistryPolicy::can_register(local_name, chain_name, &map, &self.reserved)?;

        if map.get(local_name).map(String::as_str) == Some(chain_name) {
            return Ok(());
        }
        if let Some(previous) = map.insert(local_name.to_string(), chain_name.to_string()) {
            crate::log!(
                diag,
                Topic::Registry,
                Info,
                "'{local_name}' moves from {previous} to {chain_name}"
            );
        }

        save_map(WHAT, &self.path, &map)?;
        crate::log!(
            diag,
            Topic::Registry,
            Trace,
            "'{local_name}' ({chain_name}) >>> {}",
            self.path.display()
        );

        Ok(())
    }

    /// Local name registered for a chain account.
    #[must_use]
    pub fn lookup_by_chain_name(&self, diag: &Diagnostics, chain_name: &str) -> Option<String> {
        self.entries(diag)
            .into_iter()
            .find(|(_, chain)| chain == chain_name)
            .map(|(local, _)| local)
    }

    /// Chain account registered under a local name.
    #[must_use]
    pub fn lookup_by_local_name(&self, diag: &Diagnostics, local_name: &str) -> Option<String> {
        self.entries(diag).remove(local_name)
    }

    /// Rewrite the map keeping only entries whose chain name is in `exclude`.
    /// Returns what was kept.
    pub fn clear(
        &self,
        diag: &Diagnostics,
        exclude: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, String>, FileStateError> {
        let kept = RegistryPolicy::retain_excluded(&self.entries(diag), exclude);
        save_map(WHAT, &self.path, &kept)?;
        crate::log!(
            diag,
            Topic::Registry,
            Info,
            "account map cleared; {} entries kept",
            kept.len()
        );

        Ok(kept)
    }

    /// [`Self::clear`] keeping the reserved chain names.
    pub fn clear_reserved(
        &self,
        diag: &Diagnostics,
    ) -> Result<BTreeMap<String, String>, FileStateError> {
        self.clear(diag, &self.reserved)
    }

    /// Replace every chain account name in `text` with its local name.
    /// Only whole name tokens are replaced.
    #[must_use]
    pub fn translate(&self, diag: &Diagnostics, text: &str) -> String {
        let reverse: BTreeMap<String, String> = self
            .entries(diag)
            .into_iter()
            .map(|(local, chain)| (chain, local))
            .collect();
        if reverse.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut token = String::new();
        for c in text.chars() {
            if is_name_char(c) {
                token.push(c);
                continue;
            }
            flush_token(&mut out, &mut token, &reverse);
            out.push(c);
        }
        flush_token(&mut out, &mut token, &reverse);

        out
    }
}

fn flush_token(out: &mut String, token: &mut String, reverse: &BTreeMap<String, String>) {
    if token.is_empty() {
        return;
    }
    // chain names never end in '.', so a trailing run is punctuation
    let stem = token.trim_end_matches('.');
    if let Some(local) = reverse.get(token.as_str()) {
        out.push_str(local);
    } else if let Some(local) = reverse.get(stem) {
        out.push_str(local);
        out.push_str(&token[stem.len()..]);
    } else {
        out.push_str(token);
    }
    token.clear();
}

///
/// TESTS
///
