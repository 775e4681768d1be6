use pagelist::{PagedItem, PagedListStore, ViewWindow};

/// Default number of rows before the end at which "load more" fires.
pub const DEFAULT_LOAD_MORE_THRESHOLD: usize = 5;

/// Decides when scrolling has come close enough to the end to fetch the next page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadMoreTrigger {
    pub threshold_rows: usize,
}

impl Default for LoadMoreTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_LOAD_MORE_THRESHOLD)
    }
}

impl LoadMoreTrigger {
    pub fn new(threshold_rows: usize) -> Self {
        Self { threshold_rows }
    }

    /// `true` when the window reaches within `threshold_rows` of the last row and a fetch could
    /// return something.
    pub fn should_load(
        &self,
        window: &ViewWindow,
        row_count: usize,
        has_more: bool,
        loading: bool,
    ) -> bool {
        has_more && !loading && window.end_index.saturating_add(self.threshold_rows) >= row_count
    }

    /// [`Self::should_load`] against a store; never fires while a filter is active.
    pub fn should_load_store<T: PagedItem>(
        &self,
        window: &ViewWindow,
        store: &PagedListStore<T>,
    ) -> bool {
        !store.is_filtering()
            && self.should_load(window, store.items().len(), store.has_more(), store.loading())
    }
}
