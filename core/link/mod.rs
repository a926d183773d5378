//! # Rust Link Visibility
//!
//! Once the graph is resolved, every Rust target knows the crates reachable from it and whether
//! it may name each of them. This module turns that into `rustc` arguments: `--extern` for the
//! crates a target can name, `-Ldependency=` for the directories of every crate it transitively
//! needs, and native link arguments for whatever was not built by `rustc`.
//!
mod classifier;
mod configs;
mod error;
mod inherited_libraries;
mod resolver;
mod rust_link_args;

pub use classifier::*;
pub use configs::*;
pub use error::*;
pub use inherited_libraries::*;
pub use resolver::*;
pub use rust_link_args::*;
