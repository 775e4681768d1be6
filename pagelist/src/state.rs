use crate::{ListContext, Timestamp};

/// A lightweight, serializable snapshot of a store's paging status.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`. It is meant for
/// status bars, debugging overlays and logs; it does not carry items.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoreSnapshot {
    pub context: ListContext,
    pub loaded: usize,
    pub cursor: Option<Timestamp>,
    pub has_more: bool,
    pub loading: bool,
    pub filtering: bool,
    pub error: Option<String>,
}
