use super::{ConfigSchemaError, Validate, require_non_empty};
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod defaults {
    pub fn cleos() -> String {
        "cleos".to_string()
    }

    pub fn nodeos() -> String {
        "nodeos".to_string()
    }

    pub fn compiler() -> String {
        "eosio-cpp".to_string()
    }

    pub fn abigen() -> String {
        "eosio-cpp".to_string()
    }

    pub const fn timeout_secs() -> u64 {
        60
    }

    pub const fn json() -> bool {
        true
    }

    pub fn node_args() -> Vec<String> {
        [
            "-e",
            "-p",
            "eosio",
            "--plugin",
            "eosio::producer_plugin",
            "--plugin",
            "eosio::chain_api_plugin",
            "--plugin",
            "eosio::http_plugin",
        ]
        .into_iter()
        .map(str::to_string)
        .collect()
    }
}

///
/// ToolchainConfig
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ToolchainConfig {
    #[serde(default = "defaults::cleos")]
    pub cleos: String,

    #[serde(default = "defaults::nodeos")]
    pub nodeos: String,

    #[serde(default = "defaults::compiler")]
    pub compiler: String,

    #[serde(default = "defaults::abigen")]
    pub abigen: String,

    /// Upper bound for one blocking toolchain call.
    #[serde(default = "defaults::timeout_secs")]
    pub timeout_secs: u64,

    /// Ask `cleos` for JSON output where it supports it.
    #[serde(default = "defaults::json")]
    pub json: bool,

    #[serde(default = "defaults::node_args")]
    pub node_args: Vec<String>,

    #[serde(default)]
    pub include_dirs: Vec<String>,

    #[serde(default)]
    pub genesis_json: Option<String>,
}

impl ToolchainConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            cleos: defaults::cleos(),
            nodeos: defaults::nodeos(),
            compiler: defaults::compiler(),
            abigen: defaults::abigen(),
            timeout_secs: defaults::timeout_secs(),
            json: defaults::json(),
            node_args: defaults::node_args(),
            include_dirs: Vec::new(),
            genesis_json: None,
        }
    }
}

impl Validate for ToolchainConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        require_non_empty(&self.cleos, "toolchain.cleos")?;
        require_non_empty(&self.nodeos, "toolchain.nodeos")?;
        require_non_empty(&self.compiler, "toolchain.compiler")?;
        require_non_empty(&self.abigen, "toolchain.abigen")?;

        if self.timeout_secs == 0 {
            return Err(ConfigSchemaError::ValidationError(
                "toolchain.timeout_secs must be at least 1".into(),
            ));
        }

        Ok(())
    }
}
