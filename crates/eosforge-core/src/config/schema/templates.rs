use super::{ConfigSchemaError, Validate, require_non_empty};
use serde::{Deserialize, Serialize};

mod defaults {
    pub fn dir() -> String {
        "templates/contracts".to_string()
    }

    pub fn workspace() -> String {
        "contracts".to_string()
    }

    pub fn default() -> String {
        "hello_world".to_string()
    }
}

///
/// TemplateConfig
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    /// Directory holding one subdirectory per template.
    #[serde(default = "defaults::dir")]
    pub dir: String,

    /// Where new contract workspaces are created.
    #[serde(default = "defaults::workspace")]
    pub workspace: String,

    #[serde(default = "defaults::default")]
    pub default: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            dir: defaults::dir(),
            workspace: defaults::workspace(),
            default: defaults::default(),
        }
    }
}

impl Validate for TemplateConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        require_non_empty(&self.dir, "templates.dir")?;
        require_non_empty(&self.workspace, "templates.workspace")?;
        require_non_empty(&self.default, "templates.default")?;

        Ok(())
    }
}
