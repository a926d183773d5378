use serde::{Deserialize, Serialize};

/// A file produced by the build, relative to the build directory (`obj/base/libbase.rlib`).
///
#[derive(Default, Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputFile(String);

impl OutputFile {
    pub fn new<S>(path: S) -> Self
    where
        S: Into<String>,
    {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The directory containing this file, without a trailing slash. Files at the root of the
    /// build directory live in `.`.
    pub fn dir(&self) -> &str {
        match self.0.rsplit_once('/') {
            Some(("", _)) => "/",
            Some((dir, _)) => dir,
            None => ".",
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for OutputFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for OutputFile {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OutputFile {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_strips_the_file_name() {
        assert_eq!(OutputFile::from("obj/base/libbase.rlib").dir(), "obj/base");
        assert_eq!(OutputFile::from("libroot.a").dir(), ".");
        assert_eq!(OutputFile::from("/libroot.a").dir(), "/");
    }
}
