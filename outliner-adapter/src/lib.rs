//! Host list adapter for the `outliner` crate.
//!
//! The `outliner` crate is UI-agnostic and only computes row deltas. This crate provides the
//! framework-neutral glue a list widget integration needs:
//!
//! - [`HostList`] / [`OutlineCell`] traits the widget implements
//! - [`OutlineView`], which answers row queries and replays every change as batched row
//!   instructions with animation hints
//! - cell expansion subscriptions scoped to the cell's current binding
//! - a task queue for cleanup that must run after the host's selection callback returns
//!
//! It has no bindings to any particular UI framework.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod host;
mod layout;
mod observers;
mod options;
mod tasks;
mod view;


pub use host::{CellBinding, HostList, OutlineCell, RowAnimation, ToggleHandle};
pub use layout::RowLayout;
pub use observers::ExpansionObservers;
pub use options::{HeightFn, HighlightFn, SelectFn, ViewOptions};
pub use tasks::{PendingTask, TaskQueue};
pub use view::{CellKey, OutlineView};
