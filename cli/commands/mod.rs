mod check;
mod resolve;

pub use check::*;
pub use resolve::*;

use brisk_core::loader::BuildDescriptionFile;
use brisk_core::{BuildSession, ResolvedSession, ResolverConfig};
use std::convert::TryFrom;
use std::path::{Path, PathBuf};

use crate::flags::Flags;

/// The build description named on the command line, or the closest one above the current
/// directory.
pub(crate) fn description_path(file: Option<PathBuf>) -> Result<PathBuf, anyhow::Error> {
    match file {
        Some(file) => Ok(file),
        None => Ok(BuildDescriptionFile::find(&std::env::current_dir()?)?),
    }
}

pub(crate) fn resolve_file(path: &Path, flags: Flags) -> Result<ResolvedSession, anyhow::Error> {
    let session = BuildSession::new(ResolverConfig::try_from(flags)?);
    session.load(path)?;
    Ok(session.finish()?)
}
