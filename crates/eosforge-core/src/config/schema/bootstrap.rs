use super::{ConfigSchemaError, Validate};
use crate::ids::AccountName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

mod defaults {
    use std::collections::BTreeSet;

    pub fn master() -> String {
        "eosio".to_string()
    }

    // well-known development key of a fresh local testnet
    pub fn key_public() -> String {
        "EOS6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5GDW5CV".to_string()
    }

    pub fn key_private() -> String {
        "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD3".to_string()
    }

    pub fn reserved() -> BTreeSet<String> {
        BTreeSet::from(["eosio".to_string()])
    }
}

///
/// BootstrapConfig
///
/// The master identity of a local testnet. Chain names in `reserved` survive
/// a registry clear.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapConfig {
    #[serde(default = "defaults::master")]
    pub master: String,

    #[serde(default = "defaults::key_public")]
    pub key_public: String,

    #[serde(default = "defaults::key_private")]
    pub key_private: String,

    #[serde(default = "defaults::reserved")]
    pub reserved: BTreeSet<String>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            master: defaults::master(),
            key_public: defaults::key_public(),
            key_private: defaults::key_private(),
            reserved: defaults::reserved(),
        }
    }
}

impl Validate for BootstrapConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        AccountName::parse(&self.master).map_err(|err| {
            ConfigSchemaError::ValidationError(format!("bootstrap.master: {err}"))
        })?;

        for name in &self.reserved {
            AccountName::parse(name).map_err(|err| {
                ConfigSchemaError::ValidationError(format!("bootstrap.reserved: {err}"))
            })?;
        }

        Ok(())
    }
}
