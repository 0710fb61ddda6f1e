use super::{ConfigSchemaError, Validate};
use crate::log::Verbosity;
use serde::{Deserialize, Serialize};

mod defaults {
    use crate::log::Verbosity;

    pub fn channels() -> Vec<Verbosity> {
        Verbosity::DEFAULT.to_vec()
    }
}

///
/// LogConfig
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    #[serde(default = "defaults::channels")]
    pub channels: Vec<Verbosity>,

    /// Return classified failures as errors instead of printing them.
    #[serde(default)]
    pub testing_errors: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            channels: defaults::channels(),
            testing_errors: false,
        }
    }
}

impl Validate for LogConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        for (i, channel) in self.channels.iter().enumerate() {
            if self.channels[..i].contains(channel) {
                return Err(ConfigSchemaError::ValidationError(format!(
                    "log.channels lists '{channel}' twice"
                )));
            }
        }

        Ok(())
    }
}
