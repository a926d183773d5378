use super::{ConfigValues, Label};
use serde::{Deserialize, Serialize};

/// A named bundle of flags that targets (and other configs) can pull in.
///
#[derive(Builder, Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    label: Label,

    #[builder(default)]
    values: ConfigValues,

    /// Nested configs, applied after this config's own values.
    #[builder(default)]
    configs: Vec<Label>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn values(&self) -> &ConfigValues {
        &self.values
    }

    pub fn configs(&self) -> &[Label] {
        &self.configs
    }
}
