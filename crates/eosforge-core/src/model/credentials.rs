use crate::{
    log::{Diagnostics, Topic},
    model::{FileStateError, load_map, save_map},
};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

const WHAT: &str = "password map";

///
/// CredentialCache
///
/// `{wallet_name: password}` next to the wallet files. An optimization that
/// spares re-entering passwords across runs, not a secret store.
///

#[derive(Clone, Debug)]
pub struct CredentialCache {
    path: PathBuf,
}

impl CredentialCache {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn load(&self, diag: &Diagnostics) -> BTreeMap<String, String> {
        load_map(diag, Topic::Wallet, WHAT, &self.path)
    }

    #[must_use]
    pub fn get(&self, diag: &Diagnostics, wallet_name: &str) -> Option<String> {
        self.load(diag).remove(wallet_name)
    }

    pub fn put(
        &self,
        diag: &Diagnostics,
        wallet_name: &str,
        password: &str,
    ) -> Result<(), FileStateError> {
        let mut map = self.load(diag);
        map.insert(wallet_name.to_string(), password.to_string());

        save_map(WHAT, &self.path, &map)?;
        crate::log!(
            diag,
            Topic::Wallet,
            Trace,
            "password of '{wallet_name}' cached in {}",
            self.path.display()
        );

        Ok(())
    }
}

///
/// TESTS
///
