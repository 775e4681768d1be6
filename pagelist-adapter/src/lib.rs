//! Adapter utilities for the `pagelist` crate.
//!
//! The `pagelist` crate is UI-agnostic and focuses on paging, filtering and window math. This
//! crate provides small, framework-neutral helpers commonly needed by adapters:
//!
//! - A list view binding that turns scroll events into the rows to draw
//! - Debounced search input (adapter-driven; no timers)
//! - Scroll anchoring across optimistic inserts
//! - A "load more" trigger near the end of the list
//!
//! This crate is intentionally framework-agnostic (no DOM/egui/ratatui bindings).
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod anchor;
mod controller;
mod debounce;
mod load_more;
mod view;


pub use anchor::{ScrollAnchor, apply_anchor, capture_first_visible_anchor};
pub use controller::ListController;
pub use debounce::{DEFAULT_SEARCH_DEBOUNCE_MS, Debouncer};
pub use load_more::{DEFAULT_LOAD_MORE_THRESHOLD, LoadMoreTrigger};
pub use view::{DEFAULT_OVERSCAN, ListView, ListViewOptions, RowSource, VisibleRow};
