use super::{ConfigSchemaError, NodeConfig, Validate, require_non_empty};
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

mod defaults {
    pub fn dir() -> String {
        "~/eosio-wallet".to_string()
    }

    pub fn account_map() -> String {
        "accounts.json".to_string()
    }

    pub fn password_map() -> String {
        "passwords.json".to_string()
    }

    pub fn default_name() -> String {
        "default".to_string()
    }
}

///
/// WalletConfig
///
/// Where the wallet directory lives and what the two mapping files in it are
/// called. With `prefix_by_node` each node URL gets its own pair of files.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WalletConfig {
    #[serde(default = "defaults::dir")]
    pub dir: String,

    #[serde(default = "defaults::account_map")]
    pub account_map: String,

    #[serde(default = "defaults::password_map")]
    pub password_map: String,

    #[serde(default = "defaults::default_name")]
    pub default_name: String,

    #[serde(default)]
    pub prefix_by_node: bool,
}

impl WalletConfig {
    /// Wallet directory with a leading `~` expanded from `$HOME`.
    #[must_use]
    pub fn dir_path(&self) -> PathBuf {
        match self.dir.strip_prefix("~/") {
            Some(rest) => env::var_os("HOME").map_or_else(
                || PathBuf::from(&self.dir),
                |home| PathBuf::from(home).join(rest),
            ),
            None => PathBuf::from(&self.dir),
        }
    }

    #[must_use]
    pub fn account_map_path(&self, node: &NodeConfig) -> PathBuf {
        self.dir_path().join(self.file_name(&self.account_map, node))
    }

    #[must_use]
    pub fn password_map_path(&self, node: &NodeConfig) -> PathBuf {
        self.dir_path().join(self.file_name(&self.password_map, node))
    }

    fn file_name(&self, base: &str, node: &NodeConfig) -> String {
        if self.prefix_by_node {
            format!("{}{base}", node.file_prefix())
        } else {
            base.to_string()
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            dir: defaults::dir(),
            account_map: defaults::account_map(),
            password_map: defaults::password_map(),
            default_name: defaults::default_name(),
            prefix_by_node: false,
        }
    }
}

impl Validate for WalletConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        require_non_empty(&self.dir, "wallet.dir")?;
        require_non_empty(&self.account_map, "wallet.account_map")?;
        require_non_empty(&self.password_map, "wallet.password_map")?;
        require_non_empty(&self.default_name, "wallet.default_name")?;

        if self.account_map == self.password_map {
            return Err(ConfigSchemaError::ValidationError(
                "wallet.account_map and wallet.password_map must differ".into(),
            ));
        }

        Ok(())
    }
}
