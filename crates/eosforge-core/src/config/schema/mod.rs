mod bootstrap;
mod log;
mod node;
mod templates;
mod toolchain;
mod wallet;

pub use bootstrap::*;
pub use log::*;
pub use node::*;
pub use templates::*;
pub use toolchain::*;
pub use wallet::*;

use crate::{Error, ThisError, config::ConfigError};
use serde::{Deserialize, Serialize};

///
/// ConfigSchemaError
///

#[derive(Debug, ThisError)]
pub enum ConfigSchemaError {
    #[error("validation error: {0}")]
    ValidationError(String),
}

impl From<ConfigSchemaError> for Error {
    fn from(err: ConfigSchemaError) -> Self {
        ConfigError::from(err).into()
    }
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigSchemaError> {
    if value.trim().is_empty() {
        return Err(ConfigSchemaError::ValidationError(format!(
            "{field} must not be empty"
        )));
    }

    Ok(())
}

///
/// Validate
///

pub trait Validate {
    fn validate(&self) -> Result<(), ConfigSchemaError>;
}

///
/// ConfigModel
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigModel {
    #[serde(default)]
    pub node: NodeConfig,

    #[serde(default)]
    pub wallet: WalletConfig,

    #[serde(default)]
    pub toolchain: ToolchainConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub bootstrap: BootstrapConfig,

    #[serde(default)]
    pub templates: TemplateConfig,
}

impl ConfigModel {
    /// Baseline for tests: wallet files under `dir`, nothing printed.
    #[must_use]
    pub fn for_wallet_dir(dir: impl Into<String>) -> Self {
        let mut cfg = Self::default();
        cfg.wallet.dir = dir.into();
        cfg.log.channels.clear();
        cfg
    }
}

impl Validate for ConfigModel {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        self.node.validate()?;
        self.wallet.validate()?;
        self.toolchain.validate()?;
        self.log.validate()?;
        self.bootstrap.validate()?;
        self.templates.validate()?;

        Ok(())
    }
}
