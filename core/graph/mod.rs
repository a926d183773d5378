//! # Dependency Resolution Graph
//!
//! Items of a build description can be declared in any order, and may refer to each other before
//! being declared. The graph keeps a record per label, counting how many of its dependencies
//! have yet to resolve, and resolves records in cascade as those counts drop to zero.
//!
//! When every declaration has been submitted, `ResolutionGraph::finish` either hands out a
//! `ResolvedGraph`, or reports the labels that were never declared and the cycles that kept
//! records from resolving.
//!
mod error;
mod finalize;
#[allow(clippy::module_inception)]
mod graph;
mod record;
mod report;
mod resolution;
mod resolved;

pub use error::*;
pub use graph::*;
pub use record::RecordId;
pub(crate) use record::*;
pub use report::*;
pub use resolution::*;
pub use resolved::*;
