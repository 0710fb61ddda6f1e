//!
//! JSON file persistence for the small mapping files kept next to a wallet.
//!
//! Writes go to a temporary file in the target's directory and are renamed
//! over the target, so a crash mid-write never leaves a truncated document.
//!

use serde::{Serialize, de::DeserializeOwned};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use thiserror::Error as ThisError;

///
/// FsError
///

#[derive(Debug, ThisError)]
pub enum FsError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("cannot serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl FsError {
    /// True when the file simply does not exist yet.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Read { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Read and decode a JSON document.
pub fn read_json<T>(path: &Path) -> Result<T, FsError>
where
    T: DeserializeOwned,
{
    let text = fs::read_to_string(path).map_err(|source| FsError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&text).map_err(|source| FsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode `value` as pretty JSON and atomically replace `path` with it.
/// Missing parent directories are created.
pub fn write_json_atomic<T>(path: &Path, value: &T) -> Result<(), FsError>
where
    T: Serialize,
{
    let write_err = |source: io::Error| FsError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut text = serde_json::to_string_pretty(value).map_err(|source| FsError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    text.push('\n');

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(text.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|err| write_err(err.error))?;

    Ok(())
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("map.json");

        let mut map = BTreeMap::new();
        map.insert("b".to_string(), "2".to_string());
        map.insert("a".to_string(), "1".to_string());

        write_json_atomic(&path, &map).expect("write");
        let back: BTreeMap<String, String> = read_json(&path).expect("read");

        assert_eq!(back, map);
    }

    #[test]
    fn written_keys_are_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("map.json");

        let mut map = BTreeMap::new();
        map.insert("zeta".to_string(), "z".to_string());
        map.insert("alpha".to_string(), "a".to_string());
        write_json_atomic(&path, &map).expect("write");

        let text = fs::read_to_string(&path).expect("read back");
        let alpha = text.find("alpha").expect("alpha present");
        let zeta = text.find("zeta").expect("zeta present");
        assert!(alpha < zeta);
    }

    #[test]
    fn missing_file_is_reported_as_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read_json::<BTreeMap<String, String>>(&dir.path().join("absent.json"))
            .expect_err("file is absent");

        assert!(err.is_missing());
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").expect("seed");

        let err = read_json::<BTreeMap<String, String>>(&path).expect_err("corrupt");
        assert!(matches!(err, FsError::Parse { .. }));
        assert!(!err.is_missing());
    }
}
