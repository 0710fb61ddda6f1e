pub mod schema;

use schema::{ConfigSchemaError, Validate};
use std::{fs, io, path::Path};
use thiserror::Error as ThisError;

pub use schema::ConfigModel;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "eosforge.toml";

/// Errors related to configuration loading and parsing.
#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    CannotRead { path: String, source: io::Error },

    /// TOML could not be parsed into the expected structure.
    #[error("toml error: {0}")]
    CannotParseToml(String),

    #[error("toml serialize error: {0}")]
    CannotSerializeToml(String),

    /// Wrapper for schema-level errors.
    #[error(transparent)]
    ConfigSchema(#[from] ConfigSchemaError),
}

///
/// Config
///
/// Loading entry points. The parsed model is handed to a `Session`; nothing
/// here is cached process-wide.
///

pub struct Config;

impl Config {
    /// Parse and validate a TOML document.
    pub fn parse(config_str: &str) -> Result<ConfigModel, ConfigError> {
        let config: ConfigModel =
            toml::from_str(config_str).map_err(|e| ConfigError::CannotParseToml(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path`; a missing file yields the validated defaults.
    pub fn load(path: &Path) -> Result<ConfigModel, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let config = ConfigModel::default();
                config.validate()?;

                Ok(config)
            }
            Err(source) => Err(ConfigError::CannotRead {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// Render a model back to TOML.
    pub fn to_toml(config: &ConfigModel) -> Result<String, ConfigError> {
        toml::to_string_pretty(config).map_err(|e| ConfigError::CannotSerializeToml(e.to_string()))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::Verbosity;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = Config::parse("").expect("empty config parses");

        assert_eq!(cfg.node.url, "http://127.0.0.1:8888");
        assert_eq!(cfg.wallet.default_name, "default");
        assert_eq!(cfg.log.channels, Verbosity::DEFAULT.to_vec());
        assert!(cfg.bootstrap.reserved.contains("eosio"));
    }

    #[test]
    fn sections_override_defaults() {
        let cfg = Config::parse(
            r#"
            [node]
            url = "https://api.kylin.alohaeos.com"

            [wallet]
            dir = "/tmp/w"
            prefix_by_node = true

            [toolchain]
            timeout_secs = 5

            [log]
            channels = ["debug", "error"]
            testing_errors = true
            "#,
        )
        .expect("config parses");

        assert_eq!(cfg.toolchain.timeout_secs, 5);
        assert!(cfg.log.testing_errors);
        assert_eq!(cfg.log.channels, vec![Verbosity::Debug, Verbosity::Error]);
        assert_eq!(
            cfg.wallet.account_map_path(&cfg.node),
            std::path::PathBuf::from("/tmp/w/api_kylin_alohaeos_com_accounts.json")
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::parse("[node]\nport = 1\n").expect_err("unknown field");
        assert!(matches!(err, ConfigError::CannotParseToml(_)));
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let err = Config::parse("[toolchain]\ntimeout_secs = 0\n").expect_err("invalid timeout");
        assert!(matches!(err, ConfigError::ConfigSchema(_)));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load(&dir.path().join(CONFIG_FILE)).expect("defaults");

        assert_eq!(cfg.toolchain.cleos, "cleos");
    }

    #[test]
    fn model_round_trips_through_toml() {
        let cfg = Config::parse("[wallet]\ndefault_name = \"work\"\n").expect("parse");
        let text = Config::to_toml(&cfg).expect("render");
        let back = Config::parse(&text).expect("reparse");

        assert_eq!(back.wallet.default_name, "work");
    }
}
