use super::{Label, OutputType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Copy, Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CrateType {
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "bin")]
    Bin,
    #[serde(rename = "cdylib")]
    Cdylib,
    #[serde(rename = "dylib")]
    Dylib,
    #[serde(rename = "proc-macro")]
    ProcMacro,
    #[serde(rename = "rlib")]
    Rlib,
    #[serde(rename = "staticlib")]
    Staticlib,
}

impl CrateType {
    pub fn name(&self) -> &'static str {
        match self {
            CrateType::Auto => "auto",
            CrateType::Bin => "bin",
            CrateType::Cdylib => "cdylib",
            CrateType::Dylib => "dylib",
            CrateType::ProcMacro => "proc-macro",
            CrateType::Rlib => "rlib",
            CrateType::Staticlib => "staticlib",
        }
    }
}

/// The Rust-specific bits of a target.
///
#[derive(Builder, Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[builder(default, setter(into))]
#[serde(default)]
pub struct RustValues {
    crate_name: String,

    #[builder(setter(into, strip_option))]
    crate_root: Option<String>,

    crate_type: CrateType,

    #[builder(setter(into, strip_option))]
    edition: Option<String>,

    /// Per-consumer renames: the crate name this target uses for a given dependency.
    aliased_deps: BTreeMap<Label, String>,
}

impl RustValues {
    pub fn builder() -> RustValuesBuilder {
        RustValuesBuilder::default()
    }

    pub fn crate_name(&self) -> &str {
        &self.crate_name
    }

    pub fn crate_root(&self) -> Option<&str> {
        self.crate_root.as_deref()
    }

    pub fn crate_type(&self) -> CrateType {
        self.crate_type
    }

    pub fn edition(&self) -> Option<&str> {
        self.edition.as_deref()
    }

    pub fn aliased_deps(&self) -> &BTreeMap<Label, String> {
        &self.aliased_deps
    }

    /// Resolves `auto` against the kind of output the target produces.
    pub fn inferred_crate_type(&self, output_type: OutputType) -> CrateType {
        match self.crate_type {
            CrateType::Auto => match output_type {
                OutputType::Executable => CrateType::Bin,
                OutputType::StaticLibrary => CrateType::Staticlib,
                OutputType::RustLibrary => CrateType::Rlib,
                OutputType::RustProcMacro => CrateType::ProcMacro,
                OutputType::SharedLibrary => CrateType::Dylib,
                OutputType::LoadableModule => CrateType::Cdylib,
                _ => CrateType::Auto,
            },
            explicit => explicit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_crate_types_follow_the_output_type() {
        let values = RustValues::default();
        assert_eq!(
            values.inferred_crate_type(OutputType::Executable),
            CrateType::Bin
        );
        assert_eq!(
            values.inferred_crate_type(OutputType::RustLibrary),
            CrateType::Rlib
        );
        assert_eq!(
            values.inferred_crate_type(OutputType::SharedLibrary),
            CrateType::Dylib
        );
        assert_eq!(
            values.inferred_crate_type(OutputType::LoadableModule),
            CrateType::Cdylib
        );
        assert_eq!(values.inferred_crate_type(OutputType::Group), CrateType::Auto);
    }

    #[test]
    fn explicit_crate_types_win() {
        let values = RustValues::builder()
            .crate_type(CrateType::Cdylib)
            .build()
            .unwrap();
        assert_eq!(
            values.inferred_crate_type(OutputType::SharedLibrary),
            CrateType::Cdylib
        );
    }

    #[test]
    fn crate_types_deserialize_from_their_rustc_names() {
        let ty: CrateType = serde_json::from_str(r#""proc-macro""#).unwrap();
        assert_eq!(ty, CrateType::ProcMacro);
        assert_eq!(ty.name(), "proc-macro");
    }
}
