use super::{ConfigSchemaError, Validate, require_non_empty};
use crate::utils::format;
use serde::{Deserialize, Serialize};

mod defaults {
    pub fn url() -> String {
        "http://127.0.0.1:8888".to_string()
    }

    pub fn wallet_url() -> String {
        "http://127.0.0.1:8900".to_string()
    }

    pub const fn probe_attempts() -> u32 {
        15
    }

    pub const fn probe_blocks() -> u64 {
        5
    }

    pub const fn probe_interval_ms() -> u64 {
        1_000
    }
}

///
/// NodeConfig
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    #[serde(default = "defaults::url")]
    pub url: String,

    /// Talk to a standalone `keosd` instead of the node's own wallet plugin.
    #[serde(default)]
    pub use_keosd: bool,

    #[serde(default = "defaults::wallet_url")]
    pub wallet_url: String,

    #[serde(default = "defaults::probe_attempts")]
    pub probe_attempts: u32,

    #[serde(default = "defaults::probe_blocks")]
    pub probe_blocks: u64,

    #[serde(default = "defaults::probe_interval_ms")]
    pub probe_interval_ms: u64,
}

impl NodeConfig {
    /// File-name prefix derived from the node URL, e.g. `127_0_0_1_8888_`.
    #[must_use]
    pub fn file_prefix(&self) -> String {
        format!("{}_", format::slug(&self.url))
    }

    /// True when the node runs on this machine.
    #[must_use]
    pub fn is_local(&self) -> bool {
        let host = format::slug(&self.url);
        host.starts_with("127_0_0_1") || host.starts_with("localhost")
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: defaults::url(),
            use_keosd: false,
            wallet_url: defaults::wallet_url(),
            probe_attempts: defaults::probe_attempts(),
            probe_blocks: defaults::probe_blocks(),
            probe_interval_ms: defaults::probe_interval_ms(),
        }
    }
}

impl Validate for NodeConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        require_non_empty(&self.url, "node.url")?;
        if self.use_keosd {
            require_non_empty(&self.wallet_url, "node.wallet_url")?;
        }
        if self.probe_attempts == 0 {
            return Err(ConfigSchemaError::ValidationError(
                "node.probe_attempts must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_and_locality_follow_the_url() {
        let local = NodeConfig::default();
        assert_eq!(local.file_prefix(), "127_0_0_1_8888_");
        assert!(local.is_local());

        let remote = NodeConfig {
            url: "https://jungle.example.io:443".into(),
            ..NodeConfig::default()
        };
        assert_eq!(remote.file_prefix(), "jungle_example_io_443_");
        assert!(!remote.is_local());
    }
}
