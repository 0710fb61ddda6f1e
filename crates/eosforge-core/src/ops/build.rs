//!
//! Contract build planning: where the sources are, where the artifacts go,
//! and the compiler invocations that produce them.
//!

use crate::{
    ThisError,
    domain::policy::classify::ClassifiedError,
    infra::toolchain::{Invocation, ToolOp},
};
use derive_more::Display;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// File extensions treated as contract sources.
pub const SOURCE_EXTENSIONS: &[&str] = &["c", "cpp", "cxx", "c++"];

///
/// BuildStage
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum BuildStage {
    #[display("ABI")]
    Abi,
    #[display("WASM")]
    Wasm,
}

///
/// BuildError
///

#[derive(Debug, ThisError)]
pub enum BuildError {
    #[error("no contract sources in {0}")]
    NoSources(PathBuf),

    #[error("ABI generation failed:\n{0}")]
    Abi(ClassifiedError),

    #[error("WASM compilation failed:\n{0}")]
    Wasm(ClassifiedError),

    #[error("build i/o on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

impl BuildError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    #[must_use]
    pub const fn classified(&self) -> Option<&ClassifiedError> {
        match self {
            Self::Abi(err) | Self::Wasm(err) => Some(err),
            _ => None,
        }
    }

    /// Compilation stage that failed, if the failure came from the compiler.
    #[must_use]
    pub const fn stage(&self) -> Option<BuildStage> {
        match self {
            Self::Abi(_) => Some(BuildStage::Abi),
            Self::Wasm(_) => Some(BuildStage::Wasm),
            _ => None,
        }
    }
}

///
/// BuildPlan
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuildPlan {
    pub source_dir: PathBuf,
    pub sources: Vec<PathBuf>,
    pub code_name: String,
    pub target_dir: PathBuf,
}

impl BuildPlan {
    /// Locate sources under `contract_dir` (or its `src/`) and pick the
    /// target directory, creating `build/` when needed.
    pub fn new(contract_dir: &Path) -> Result<Self, BuildError> {
        let (source_dir, sources) = [contract_dir.to_path_buf(), contract_dir.join("src")]
            .into_iter()
            .filter(|dir| dir.is_dir())
            .map(|dir| source_files(&dir).map(|files| (dir, files)))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .find(|(_, files)| !files.is_empty())
            .ok_or_else(|| BuildError::NoSources(contract_dir.to_path_buf()))?;

        let code_name = sources
            .first()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| BuildError::NoSources(contract_dir.to_path_buf()))?;

        let target_dir = target_dir(&source_dir)?;

        Ok(Self {
            source_dir,
            sources,
            code_name,
            target_dir,
        })
    }

    #[must_use]
    pub fn abi_path(&self) -> PathBuf {
        self.target_dir.join(format!("{}.abi", self.code_name))
    }

    #[must_use]
    pub fn wasm_path(&self) -> PathBuf {
        self.target_dir.join(format!("{}.wasm", self.code_name))
    }

    /// A hand-written ABI shipped with the sources, if any.
    #[must_use]
    pub fn existing_abi(&self) -> Option<PathBuf> {
        fs::read_dir(&self.source_dir)
            .ok()?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .find(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("abi")))
    }

    #[must_use]
    pub fn abi_invocation(&self, include_dirs: &[String]) -> Invocation {
        Invocation::new(ToolOp::BuildAbi)
            .arg(format!("-contract={}", self.code_name))
            .arg("-abigen")
            .arg(format!("-abigen_output={}", self.abi_path().display()))
            .args(self.include_args(include_dirs))
            .args(self.source_args())
    }

    #[must_use]
    pub fn wasm_invocation(&self, include_dirs: &[String]) -> Invocation {
        Invocation::new(ToolOp::BuildWasm)
            .args(self.include_args(include_dirs))
            .args(self.source_args())
            .arg(format!("-o={}", self.wasm_path().display()))
    }

    fn include_args(&self, include_dirs: &[String]) -> Vec<String> {
        std::iter::once(format!("-I={}", self.source_dir.display()))
            .chain(include_dirs.iter().map(|dir| format!("-I={dir}")))
            .collect()
    }

    fn source_args(&self) -> Vec<String> {
        self.sources
            .iter()
            .map(|p| p.display().to_string())
            .collect()
    }
}

/// Contract sources directly inside `dir`, sorted.
pub fn source_files(dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| BuildError::io(dir, e))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_source(path))
        .collect();
    files.sort();

    Ok(files)
}

fn is_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// `<source_dir>/../build` when it exists, otherwise `<source_dir>/build`.
pub fn target_dir(source_dir: &Path) -> Result<PathBuf, BuildError> {
    if let Some(parent) = source_dir.parent() {
        let sibling = parent.join("build");
        if sibling.is_dir() {
            return Ok(sibling);
        }
    }

    let own = source_dir.join("build");
    fs::create_dir_all(&own).map_err(|e| BuildError::io(&own, e))?;

    Ok(own)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_in_src_build_into_sibling_build_dir() {
        let root = tempfile::tempdir().expect("tempdir");
        let project = root.path().join("hello");
        fs::create_dir_all(project.join("src")).expect("src");
        fs::create_dir_all(project.join("build")).expect("build");
        fs::write(project.join("src/hello.cpp"), "// contract").expect("source");
        fs::write(project.join("src/notes.md"), "ignored").expect("notes");

        let plan = BuildPlan::new(&project).expect("plan");

        assert_eq!(plan.code_name, "hello");
        assert_eq!(plan.target_dir, project.join("build"));
        assert_eq!(plan.sources, vec![project.join("src/hello.cpp")]);
        assert_eq!(plan.wasm_path(), project.join("build/hello.wasm"));
    }

    #[test]
    fn flat_sources_get_their_own_build_dir() {
        let root = tempfile::tempdir().expect("tempdir");
        let project = root.path().join("flat");
        fs::create_dir_all(&project).expect("dir");
        fs::write(project.join("token.cpp"), "// contract").expect("source");

        let plan = BuildPlan::new(&project).expect("plan");

        assert_eq!(plan.target_dir, project.join("build"));
        assert!(project.join("build").is_dir());
    }

    #[test]
    fn empty_directory_has_no_sources() {
        let root = tempfile::tempdir().expect("tempdir");
        let err = BuildPlan::new(root.path()).expect_err("no sources");

        assert!(matches!(err, BuildError::NoSources(_)));
        assert_eq!(err.stage(), None);
    }

    #[test]
    fn invocations_name_code_and_outputs() {
        let plan = BuildPlan {
            source_dir: PathBuf::from("/p/src"),
            sources: vec![PathBuf::from("/p/src/hello.cpp")],
            code_name: "hello".into(),
            target_dir: PathBuf::from("/p/build"),
        };

        let abi = plan.abi_invocation(&["/opt/eosio/include".into()]);
        assert!(abi.has_flag("-contract=hello"));
        assert!(abi.has_flag("-abigen_output=/p/build/hello.abi"));
        assert!(abi.has_flag("-I=/opt/eosio/include"));

        let wasm = plan.wasm_invocation(&[]);
        assert_eq!(wasm.args.last().map(String::as_str), Some("-o=/p/build/hello.wasm"));
    }
}
