//! A headless outline (tree list) projection engine.
//!
//! For host list integration (cell binding, batched row animations, deferred cleanup), see the
//! `outliner-adapter` crate.
//!
//! This crate turns a lazily queried tree into the flat, indentable row sequence a
//! single-column list widget displays, and keeps it in sync as rows are expanded, collapsed,
//! inserted, deleted, reloaded and filtered. Every change is reported as a minimal batch of
//! row indexes for the host to animate.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - the tree, through [`TreeSource`]
//! - row virtualization and rendering
//! - playback of the returned [`RowChanges`]
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod batch;
mod error;
mod filter;
mod flatten;
mod key;
mod node;
mod options;
mod outline;
mod source;
mod types;

#[cfg(test)]
mod tests;

pub use batch::IndexBatch;
pub use error::OutlineError;
pub use filter::Exclusion;
pub use node::{Node, NodeId};
pub use options::{ExpansionHook, FilterPredicate, OutlineOptions};
pub use outline::Outline;
pub use source::TreeSource;
pub use types::{IndexPath, ItemIdentity, RowChanges};
