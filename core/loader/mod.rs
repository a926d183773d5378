//! # Build Description Loader
//!
//! Reads a `Brisk.json` file: a version and a flat list of items, each tagged with its `kind`.
//! Comments are allowed in the file.
//!
//! ```json
//! {
//!   "version": 1,
//!   "items": [
//!     // The standard library is prebuilt.
//!     { "kind": "config", "label": "//build:std" },
//!     { "kind": "target", "label": "//app:app", "output_type": "executable", "sources": ["app/main.rs"] }
//!   ]
//! }
//! ```
//!
use crate::model::Item;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::*;
use tracing::*;

pub const BUILD_DESCRIPTION: &str = "Brisk.json";

pub const SUPPORTED_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Could not parse build description: {0}")]
    ParseError(serde_json::Error),

    #[error("Could not read build description at {path:?}: {err}")]
    CouldNotReadFile { path: PathBuf, err: std::io::Error },

    #[error("Build description version {found} is not supported, expected version 1")]
    UnsupportedVersion { found: u32 },

    #[error("Could not find a Brisk.json walking upwards from {0:?}")]
    NotFound(PathBuf),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BuildDescriptionFile {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub items: Vec<Item>,
}

fn default_version() -> u32 {
    SUPPORTED_VERSION
}

impl BuildDescriptionFile {
    #[tracing::instrument(name = "BuildDescriptionFile::read")]
    pub fn read(path: &Path) -> Result<Self, LoaderError> {
        let file = fs::File::open(path).map_err(|err| LoaderError::CouldNotReadFile {
            path: path.to_path_buf(),
            err,
        })?;

        let reader = json_comments::StripComments::new(BufReader::new(file));
        let description: Self =
            serde_json::from_reader(reader).map_err(LoaderError::ParseError)?;
        description.check_version()?;

        debug!("Loaded {} items from {:?}", description.items.len(), path);
        Ok(description)
    }

    /// Walk upwards from `start` until a directory holding a build description is found.
    pub fn find(start: &Path) -> Result<PathBuf, LoaderError> {
        start
            .ancestors()
            .map(|dir| dir.join(BUILD_DESCRIPTION))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| LoaderError::NotFound(start.to_path_buf()))
    }

    fn check_version(&self) -> Result<(), LoaderError> {
        if self.version != SUPPORTED_VERSION {
            return Err(LoaderError::UnsupportedVersion {
                found: self.version,
            });
        }
        Ok(())
    }
}

impl FromStr for BuildDescriptionFile {
    type Err = LoaderError;

    fn from_str(json: &str) -> Result<Self, Self::Err> {
        let reader = json_comments::StripComments::new(json.as_bytes());
        let description: Self =
            serde_json::from_reader(reader).map_err(LoaderError::ParseError)?;
        description.check_version()?;
        Ok(description)
    }
}
