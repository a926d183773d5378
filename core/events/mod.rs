//! # Graph Resolution Events
//!
//! Events are self-contained: they carry labels and counts rather than references into the graph,
//! so a consumer can hold on to them after the graph is gone.
//!
//! The resolution graph publishes an `ItemResolved` event for every record the moment it
//! resolves, which is the hook for anything that wants to act on items as soon as they are
//! complete (e.g. writing out build files incrementally).
//!
mod channel;
mod consumer;
pub mod event;

pub use channel::*;
pub use consumer::*;
