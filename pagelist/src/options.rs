use crate::{FilterState, SortDirective, TextField};

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Configuration for [`crate::PagedListStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoreOptions {
    /// Items requested per fetch (`take`). Zero is treated as one.
    pub page_size: usize,
    /// Fields the free-text search looks at.
    pub search_fields: Vec<TextField>,
    /// Sort restored on every context reset.
    pub default_sort: SortDirective,
    /// Group pinned items at the front (notes).
    pub pinned_first: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_fields: vec![TextField::Title, TextField::Content, TextField::Category],
            default_sort: SortDirective::Newest,
            pinned_first: false,
        }
    }
}

impl StoreOptions {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_search_fields(mut self, search_fields: impl Into<Vec<TextField>>) -> Self {
        self.search_fields = search_fields.into();
        self
    }

    pub fn with_default_sort(mut self, sort: SortDirective) -> Self {
        self.default_sort = sort;
        self
    }

    pub fn with_pinned_first(mut self, pinned_first: bool) -> Self {
        self.pinned_first = pinned_first;
        self
    }

    pub(crate) fn take(&self) -> usize {
        self.page_size.max(1)
    }

    /// The filter state a freshly reset list starts with.
    pub fn default_filter(&self) -> FilterState {
        FilterState::default()
            .with_sort(self.default_sort)
            .with_pinned_first(self.pinned_first)
    }
}
