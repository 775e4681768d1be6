//! Headless paging, filtering and windowing for large team collections.
//!
//! For adapter-level utilities (list view binding, debounced search, anchoring), see the
//! `pagelist-adapter` crate.
//!
//! This crate focuses on the parts of a task/note/todo dashboard that have real algorithmic
//! content: cursor-based "load more" against a document store, a memoized client-side
//! filter/sort pipeline over whatever has been loaded, and O(1) fixed-height windowing.
//!
//! It is UI-agnostic. A UI layer is expected to provide:
//! - a [`PagedSource`] backed by the real database
//! - a [`PermissionGate`] (or a [`SessionContext`]) answering role checks
//! - container height and scroll offset
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod error;
pub mod filter;
mod key;
mod model;
mod options;
mod pager;
mod permission;
mod source;
mod state;
mod store;
mod types;
mod window;

#[cfg(test)]
mod tests;

pub use error::SourceError;
pub use filter::{ALL, FilterPipeline, FilterState, FilteredView, SortDirective};
pub use key::ItemKey;
pub use model::{
    Editable, FilterField, Note, NoteDraft, NotePatch, PagedItem, Priority, Task, TaskDraft,
    TaskPatch, TaskStatus, TextField, Todo, TodoDraft, TodoPatch,
};
pub use options::{DEFAULT_PAGE_SIZE, StoreOptions};
pub use pager::{CursorPager, PageKind, PageOutcome, PageRequest, Skip};
pub use permission::{Action, PermissionGate, Role, SessionContext};
pub use source::{MemorySource, PagedSource};
pub use state::StoreSnapshot;
pub use store::{MutationOutcome, PageTicket, PagedListStore};
pub use types::{Collection, ListContext, Timestamp, ViewWindow};
pub use window::{WindowInput, compute_window, row_top};
