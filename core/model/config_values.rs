use serde::{Deserialize, Serialize};

/// An explicitly named extern crate: either a file in the build, or a raw value handed verbatim
/// to the compiler.
///
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LibFile {
    Path(String),
    Value(String),
}

impl LibFile {
    pub fn as_str(&self) -> &str {
        match self {
            LibFile::Path(p) => p,
            LibFile::Value(v) => v,
        }
    }

    pub fn is_path(&self) -> bool {
        matches!(self, LibFile::Path(_))
    }
}

impl std::fmt::Display for LibFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flags a target or a config contributes to compiling and linking.
///
#[derive(Builder, Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[builder(default, setter(into))]
#[serde(default)]
pub struct ConfigValues {
    rustflags: Vec<String>,
    rustenv: Vec<String>,
    ldflags: Vec<String>,
    lib_dirs: Vec<String>,
    libs: Vec<String>,
    externs: Vec<(String, LibFile)>,
    inputs: Vec<String>,
}

impl ConfigValues {
    pub fn builder() -> ConfigValuesBuilder {
        ConfigValuesBuilder::default()
    }

    pub fn rustflags(&self) -> &[String] {
        &self.rustflags
    }

    pub fn rustenv(&self) -> &[String] {
        &self.rustenv
    }

    pub fn ldflags(&self) -> &[String] {
        &self.ldflags
    }

    pub fn lib_dirs(&self) -> &[String] {
        &self.lib_dirs
    }

    pub fn libs(&self) -> &[String] {
        &self.libs
    }

    pub fn externs(&self) -> &[(String, LibFile)] {
        &self.externs
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn is_empty(&self) -> bool {
        *self == ConfigValues::default()
    }
}
