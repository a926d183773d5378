use crate::link::InheritedLibraries;

/// The result of an item's kind-specific resolution step.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Target(TargetResolution),
    Config,
    Toolchain,
    Pool,
}

impl Resolution {
    pub fn as_target(&self) -> Option<&TargetResolution> {
        match self {
            Resolution::Target(t) => Some(t),
            _ => None,
        }
    }
}

/// What a target learned from its resolved dependencies.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetResolution {
    /// Every Rust crate reachable from this target, flagged with whether the target may name it.
    rust_libs: InheritedLibraries,

    /// The Rust crates dependents of this target pull in through it.
    inheritable_libs: InheritedLibraries,

    /// Non-Rust libraries reachable through intermediate (non-final) targets, which must be
    /// linked into whichever final target consumes them.
    native_libs: InheritedLibraries,
}

impl TargetResolution {
    pub fn new(
        rust_libs: InheritedLibraries,
        inheritable_libs: InheritedLibraries,
        native_libs: InheritedLibraries,
    ) -> Self {
        Self {
            rust_libs,
            inheritable_libs,
            native_libs,
        }
    }

    pub fn rust_libs(&self) -> &InheritedLibraries {
        &self.rust_libs
    }

    pub fn inheritable_libs(&self) -> &InheritedLibraries {
        &self.inheritable_libs
    }

    pub fn native_libs(&self) -> &InheritedLibraries {
        &self.native_libs
    }
}
