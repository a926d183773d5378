use serde::de::Visitor;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::*;

/// A globally unique name for a declared item: a source-absolute directory, a name within that
/// directory, and optionally the toolchain the item is built with.
///
/// Labels are written as `//dir/sub:name`. When the name matches the last directory component it
/// may be omitted (`//dir/sub`). A toolchain is appended in parentheses:
/// `//dir/sub:name(//build/toolchain:linux)`.
///
#[derive(Default, Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Label {
    dir: String,
    name: String,
    toolchain: Option<Box<Label>>,
}

impl Label {
    pub fn new<D, N>(dir: D, name: N) -> Self
    where
        D: Into<String>,
        N: Into<String>,
    {
        let mut dir = dir.into();
        if !dir.ends_with('/') {
            dir.push('/');
        }
        Self {
            dir,
            name: name.into(),
            toolchain: None,
        }
    }

    pub fn with_toolchain(mut self, toolchain: Label) -> Self {
        self.toolchain = Some(Box::new(toolchain.without_toolchain()));
        self
    }

    pub fn without_toolchain(&self) -> Label {
        Label {
            dir: self.dir.clone(),
            name: self.name.clone(),
            toolchain: None,
        }
    }

    /// The directory of this label, always ending in a slash.
    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn toolchain(&self) -> Option<&Label> {
        self.toolchain.as_deref()
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dir = match self.dir.as_str() {
            "//" => "//",
            dir => dir.strip_suffix('/').unwrap_or(dir),
        };
        write!(f, "{}:{}", dir, self.name)?;
        if let Some(toolchain) = &self.toolchain {
            write!(f, "({})", toolchain)?;
        }
        Ok(())
    }
}

impl FromStr for Label {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let (main, toolchain) = match s.find('(') {
            Some(open) => {
                let rest = &s[open + 1..];
                let inner = rest
                    .strip_suffix(')')
                    .ok_or_else(|| LabelError::UnbalancedToolchain(s.to_string()))?;
                if inner.contains('(') || inner.contains(')') {
                    return Err(LabelError::UnbalancedToolchain(s.to_string()));
                }
                (&s[..open], Some(inner.parse::<Label>()?))
            }
            None if s.contains(')') => return Err(LabelError::UnbalancedToolchain(s.to_string())),
            None => (s, None),
        };

        if !main.starts_with("//") {
            return Err(LabelError::NotSourceAbsolute(s.to_string()));
        }

        let (dir, name) = match main.split_once(':') {
            Some((dir, name)) => (dir, name.to_string()),
            None => {
                let name = main
                    .trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_string();
                (main, name)
            }
        };

        if name.is_empty() || name.contains('/') || name.contains(':') {
            return Err(LabelError::InvalidName(s.to_string()));
        }

        let mut label = Label::new(dir, name);
        if let Some(toolchain) = toolchain {
            label = label.with_toolchain(toolchain);
        }
        Ok(label)
    }
}

impl TryFrom<&str> for Label {
    type Error = LabelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Serialize for Label {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

struct LabelVisitor;

impl Visitor<'_> for LabelVisitor {
    type Value = Label;

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        v.parse::<Label>().map_err(E::custom)
    }

    fn expecting(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "a label of the form //dir:name")
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(LabelVisitor)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("Label {0:?} must start with //")]
    NotSourceAbsolute(String),

    #[error("Label {0:?} has an invalid name")]
    InvalidName(String),

    #[error("Label {0:?} has an unbalanced toolchain suffix")]
    UnbalancedToolchain(String),
}
