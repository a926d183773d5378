use crate::model::{CrateType, Label, OutputFile};
use serde::Serialize;
use std::fmt;

/// A crate added to the extern prelude of the compiled crate.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternCrateArg {
    pub crate_name: String,
    pub path: String,

    /// The target this crate comes from. Explicit externs from configs have none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Label>,
}

impl fmt::Display for ExternCrateArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--extern {}={}", self.crate_name, self.path)
    }
}

/// A directory rustc may search for crate metadata, without making its crates nameable.
///
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SearchPath(pub String);

impl fmt::Display for SearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-Ldependency={}", self.0)
    }
}

/// Everything a build file needs to compile and link one Rust target.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RustLinkArgs {
    pub target: Label,
    pub crate_name: String,
    pub crate_type: CrateType,

    /// Direct externs, one per distinct artifact.
    pub externs: Vec<ExternCrateArg>,

    pub search_only_paths: Vec<SearchPath>,

    /// `-Lnative=`, `-Clink-arg=` and library switches for non-Rust dependencies.
    pub native_link_args: Vec<String>,

    pub custom_linker_flags: Vec<String>,

    pub rustflags: Vec<String>,
    pub rustenv: Vec<String>,

    pub implicit_deps: Vec<OutputFile>,
    pub order_only_deps: Vec<OutputFile>,
}

impl RustLinkArgs {
    pub fn externs_line(&self) -> String {
        join(self.externs.iter())
    }

    /// Search paths followed by native link arguments, as they go on the rustc command line.
    pub fn rustdeps_line(&self) -> String {
        let mut parts: Vec<String> = self.search_only_paths.iter().map(|p| p.to_string()).collect();
        parts.extend(self.native_link_args.iter().cloned());
        parts.join(" ")
    }

    pub fn ldflags_line(&self) -> String {
        self.custom_linker_flags.join(" ")
    }
}

fn join<T: fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(" ")
}

impl fmt::Display for RustLinkArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.target)?;
        writeln!(f, "crate_name = {}", self.crate_name)?;
        writeln!(f, "crate_type = {}", self.crate_type.name())?;
        writeln!(f, "externs = {}", self.externs_line())?;
        writeln!(f, "rustdeps = {}", self.rustdeps_line())?;
        writeln!(f, "ldflags = {}", self.ldflags_line())
    }
}
