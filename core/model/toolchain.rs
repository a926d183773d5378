use super::Label;
use serde::{Deserialize, Serialize};

/// How the Rust compiler of a toolchain spells library switches.
///
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[builder(default, setter(into))]
#[serde(default)]
pub struct RustTool {
    lib_switch: String,
    lib_dir_switch: String,
}

impl Default for RustTool {
    fn default() -> Self {
        Self {
            lib_switch: "-l".to_string(),
            lib_dir_switch: "-L".to_string(),
        }
    }
}

impl RustTool {
    pub fn builder() -> RustToolBuilder {
        RustToolBuilder::default()
    }

    pub fn lib_switch(&self) -> &str {
        &self.lib_switch
    }

    pub fn lib_dir_switch(&self) -> &str {
        &self.lib_dir_switch
    }
}

#[derive(Builder, Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toolchain {
    label: Label,

    /// Targets that must be resolved before anything is built with this toolchain.
    #[builder(default)]
    deps: Vec<Label>,

    #[builder(default, setter(strip_option))]
    rust_tool: Option<RustTool>,
}

impl Toolchain {
    pub fn builder() -> ToolchainBuilder {
        ToolchainBuilder::default()
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn deps(&self) -> &[Label] {
        &self.deps
    }

    pub fn rust_tool(&self) -> Option<&RustTool> {
        self.rust_tool.as_ref()
    }
}
