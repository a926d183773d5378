use super::{ConfigValues, CrateType, Label, OutputFile, RustValues};
use serde::{Deserialize, Serialize};
use thiserror::*;

#[derive(Copy, Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    Executable,
    SharedLibrary,
    LoadableModule,
    StaticLibrary,
    SourceSet,
    RustLibrary,
    RustProcMacro,
    #[default]
    Group,
    Action,
    Copy,
    CreateBundle,
}

impl OutputType {
    pub fn name(&self) -> &'static str {
        match self {
            OutputType::Executable => "executable",
            OutputType::SharedLibrary => "shared_library",
            OutputType::LoadableModule => "loadable_module",
            OutputType::StaticLibrary => "static_library",
            OutputType::SourceSet => "source_set",
            OutputType::RustLibrary => "rust_library",
            OutputType::RustProcMacro => "rust_proc_macro",
            OutputType::Group => "group",
            OutputType::Action => "action",
            OutputType::Copy => "copy",
            OutputType::CreateBundle => "create_bundle",
        }
    }
}

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum SourceLanguage {
    Rust,
    C,
    Cpp,
    Asm,
    ObjC,
    Swift,
}

impl SourceLanguage {
    pub fn of_path(path: &str) -> Option<SourceLanguage> {
        let ext = path.rsplit_once('.').map(|(_, ext)| ext)?;
        match ext {
            "rs" => Some(SourceLanguage::Rust),
            "c" => Some(SourceLanguage::C),
            "cc" | "cpp" | "cxx" => Some(SourceLanguage::Cpp),
            "S" | "s" | "asm" => Some(SourceLanguage::Asm),
            "m" | "mm" => Some(SourceLanguage::ObjC),
            "swift" => Some(SourceLanguage::Swift),
            _ => None,
        }
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

/// The set of languages a target's sources are written in.
///
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceTypes(u8);

impl SourceTypes {
    pub fn set(&mut self, lang: SourceLanguage) {
        self.0 |= lang.bit();
    }

    pub fn get(&self, lang: SourceLanguage) -> bool {
        self.0 & lang.bit() != 0
    }

    pub fn rust_source_used(&self) -> bool {
        self.get(SourceLanguage::Rust)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// A declared build target, as handed over by the build description parser.
///
/// The graph only cares about its label and the labels it references. Everything else is read
/// once the graph is resolved, when computing link arguments.
///
#[derive(Builder, Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[builder(build_fn(error = "TargetError"))]
#[serde(default)]
pub struct Target {
    label: Label,

    output_type: OutputType,

    #[builder(default)]
    sources: Vec<String>,

    #[builder(default)]
    public_deps: Vec<Label>,

    #[builder(default)]
    private_deps: Vec<Label>,

    #[builder(default)]
    data_deps: Vec<Label>,

    #[builder(default)]
    configs: Vec<Label>,

    #[builder(default, setter(strip_option))]
    toolchain: Option<Label>,

    #[builder(default, setter(strip_option))]
    pool: Option<Label>,

    #[builder(default)]
    rust_values: RustValues,

    #[builder(default)]
    config_values: ConfigValues,

    /// What dependents of this target consume: an `.rlib` for Rust libraries, a stamp for groups.
    #[builder(default, setter(into))]
    dependency_output_file: OutputFile,

    /// What goes on a link line. Defaults to the dependency output.
    #[builder(default, setter(into, strip_option))]
    link_output_file: Option<OutputFile>,

    /// Object files of a source set, linked straight into final targets.
    #[builder(default)]
    object_files: Vec<OutputFile>,

    #[builder(default)]
    bundle_is_framework: bool,

    #[builder(default)]
    complete_static_lib: bool,
}

impl Target {
    pub fn builder() -> TargetBuilder {
        TargetBuilder::default()
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn output_type(&self) -> OutputType {
        self.output_type
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn public_deps(&self) -> &[Label] {
        &self.public_deps
    }

    pub fn private_deps(&self) -> &[Label] {
        &self.private_deps
    }

    pub fn data_deps(&self) -> &[Label] {
        &self.data_deps
    }

    /// Dependencies that take part in linking, public ones first, paired with whether the edge
    /// is public.
    pub fn linked_deps(&self) -> impl Iterator<Item = (&Label, bool)> {
        self.public_deps
            .iter()
            .map(|l| (l, true))
            .chain(self.private_deps.iter().map(|l| (l, false)))
    }

    pub fn configs(&self) -> &[Label] {
        &self.configs
    }

    pub fn toolchain(&self) -> Option<&Label> {
        self.toolchain.as_ref()
    }

    pub fn pool(&self) -> Option<&Label> {
        self.pool.as_ref()
    }

    pub fn rust_values(&self) -> &RustValues {
        &self.rust_values
    }

    pub fn config_values(&self) -> &ConfigValues {
        &self.config_values
    }

    pub fn dependency_output_file(&self) -> &OutputFile {
        &self.dependency_output_file
    }

    pub fn link_output_file(&self) -> &OutputFile {
        self.link_output_file
            .as_ref()
            .unwrap_or(&self.dependency_output_file)
    }

    pub fn object_files(&self) -> &[OutputFile] {
        &self.object_files
    }

    pub fn bundle_is_framework(&self) -> bool {
        self.bundle_is_framework
    }

    pub fn is_complete_static_lib(&self) -> bool {
        self.complete_static_lib
    }

    pub fn source_types_used(&self) -> SourceTypes {
        let mut types = SourceTypes::default();
        for lang in self.sources.iter().filter_map(|s| SourceLanguage::of_path(s)) {
            types.set(lang);
        }
        if self.rust_values.crate_root().is_some() {
            types.set(SourceLanguage::Rust);
        }
        types
    }

    pub fn inferred_crate_type(&self) -> CrateType {
        self.rust_values.inferred_crate_type(self.output_type)
    }

    /// Whether this target produces something that goes on a link line.
    pub fn is_linkable(&self) -> bool {
        matches!(
            self.output_type,
            OutputType::StaticLibrary
                | OutputType::SharedLibrary
                | OutputType::RustLibrary
                | OutputType::RustProcMacro
        )
    }

    /// Whether this target is the end of a link: its dependencies get linked into it rather than
    /// passed along to its dependents.
    pub fn is_final(&self) -> bool {
        let final_output = match self.output_type {
            OutputType::Executable
            | OutputType::SharedLibrary
            | OutputType::LoadableModule
            | OutputType::Action
            | OutputType::Copy
            | OutputType::CreateBundle
            | OutputType::RustProcMacro => true,
            OutputType::StaticLibrary => self.complete_static_lib,
            _ => false,
        };

        final_output
            || (self.source_types_used().rust_source_used()
                && matches!(
                    self.inferred_crate_type(),
                    CrateType::Bin
                        | CrateType::Cdylib
                        | CrateType::Dylib
                        | CrateType::Staticlib
                        | CrateType::ProcMacro
                ))
    }

    /// Whether dependents see this target as a Rust crate in their transitive closure.
    pub fn is_rust_crate(&self) -> bool {
        match self.output_type {
            OutputType::RustLibrary | OutputType::RustProcMacro => true,
            OutputType::SourceSet | OutputType::Group => false,
            _ => self.source_types_used().rust_source_used(),
        }
    }

    /// Whether `rustc` can read crate metadata out of this target's dependency output.
    pub fn exposes_rust_metadata(&self) -> bool {
        self.is_rust_crate() && self.inferred_crate_type() != CrateType::Cdylib
    }
}

impl AsRef<Target> for Target {
    fn as_ref(&self) -> &Target {
        self
    }
}

#[derive(Error, Debug)]
pub enum TargetError {
    #[error(transparent)]
    BuilderError(derive_builder::UninitializedFieldError),
}

impl From<derive_builder::UninitializedFieldError> for TargetError {
    fn from(value: derive_builder::UninitializedFieldError) -> Self {
        TargetError::BuilderError(value)
    }
}
