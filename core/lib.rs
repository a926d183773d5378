//! # Brisk
//!
//! Brisk resolves the build graph of a build description and computes the `rustc` arguments of
//! its Rust targets.
//!
//! The flow begins by creating a `ResolverConfig` and using it to start a `BuildSession`. Items
//! (targets, configs, toolchains and pools) are declared into the session in any order, from any
//! number of threads, and the graph resolves each of them as soon as everything it depends on
//! has resolved. Finishing the session either reports why the graph could not be resolved
//! (missing labels, cycles) or hands out a `ResolvedSession` that computes link arguments.
//!

pub mod config;
pub mod events;
pub mod graph;
pub mod link;
pub mod loader;
pub mod model;
mod session;
pub(crate) mod sync;
pub(crate) mod util;

pub use config::*;
pub use session::*;

#[macro_use]
extern crate derive_builder;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;
