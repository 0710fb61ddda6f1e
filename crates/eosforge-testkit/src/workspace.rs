use derive_more::{Deref, DerefMut};
use eosforge_core::{ConfigModel, Session, Toolchain};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

/// Source of the contract used across the end-to-end tests: `hi` greets the
/// given user after requiring that user's authority.
pub const HELLO_WORLD: &str = r#"#include <eosio/eosio.hpp>

using namespace eosio;

class [[eosio::contract("${CONTRACT_NAME}")]] ${CONTRACT_NAME} : public contract {
  public:
    using contract::contract;

    [[eosio::action]] void hi(name user) {
      require_auth(user);
      print("Hello, ", user);
    }
};
"#;

///
/// TestWorkspace
///
/// A temporary directory holding the wallet files, a template directory with
/// `hello_world`, and the contract workspace. Derefs to its config so tests
/// can adjust settings before opening a session.
///

#[derive(Deref, DerefMut)]
pub struct TestWorkspace {
    dir: TempDir,
    #[deref]
    #[deref_mut]
    config: ConfigModel,
}

impl TestWorkspace {
    /// # Panics
    /// When the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp workspace");
        let root = dir.path();

        let mut config = ConfigModel::for_wallet_dir(root.join("wallet").display().to_string());
        config.node.probe_interval_ms = 0;
        config.templates.dir = root.join("templates").display().to_string();
        config.templates.workspace = root.join("contracts").display().to_string();

        let hello = root.join("templates").join("hello_world").join("src");
        fs::create_dir_all(&hello).expect("create template dir");
        fs::write(hello.join("CONTRACT_NAME.cpp"), HELLO_WORLD).expect("write template source");

        Self { dir, config }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub const fn config(&self) -> &ConfigModel {
        &self.config
    }

    /// A session over `toolchain` with this workspace's config.
    #[must_use]
    pub fn session(&self, toolchain: impl Toolchain + 'static) -> Session {
        Session::new(self.config.clone(), Box::new(toolchain)).with_name_seed([7; 32])
    }

    /// Write `source` as `<workspace>/<name>/src/<name>.cpp` next to an
    /// empty `build/`; returns the contract directory.
    ///
    /// # Panics
    /// When the files cannot be written.
    #[must_use]
    pub fn contract(&self, name: &str, source: &str) -> PathBuf {
        let dir = Path::new(&self.config.templates.workspace).join(name);
        let src = dir.join("src");
        fs::create_dir_all(&src).expect("create contract dir");
        fs::create_dir_all(dir.join("build")).expect("create build dir");
        fs::write(src.join(format!("{name}.cpp")), source.replace("${CONTRACT_NAME}", name))
            .expect("write contract source");

        dir
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}
