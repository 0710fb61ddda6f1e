//! Files owned by the wallet directory: the object registry and the
//! credential cache. Reads never fail; a missing or corrupt file is empty.

pub mod credentials;
pub mod registry;

pub use credentials::CredentialCache;
pub use registry::ObjectRegistry;

use crate::{
    ThisError,
    log::{Diagnostics, Topic},
    utils::fs::{self as fsx, FsError},
};
use std::{collections::BTreeMap, path::Path};

///
/// FileStateError
///

#[derive(Debug, ThisError)]
#[error("{what}: {source}")]
pub struct FileStateError {
    pub what: &'static str,
    pub source: FsError,
}

// Load a string map, degrading to empty on any read failure.
fn load_map(
    diag: &Diagnostics,
    topic: Topic,
    what: &'static str,
    path: &Path,
) -> BTreeMap<String, String> {
    match fsx::read_json(path) {
        Ok(map) => map,
        Err(err) if err.is_missing() => BTreeMap::new(),
        Err(err) => {
            crate::log!(
                diag,
                topic,
                Error,
                "{}; treating it as empty",
                FileStateError { what, source: err }
            );
            BTreeMap::new()
        }
    }
}

fn save_map(
    what: &'static str,
    path: &Path,
    map: &BTreeMap<String, String>,
) -> Result<(), FileStateError> {
    fsx::write_json_atomic(path, map).map_err(|source| FileStateError { what, source })
}
