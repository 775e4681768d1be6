use std::collections::BTreeMap;

use crate::{FilterField, PagedItem, TextField};

/// Predicate value that disables filtering on a field.
pub const ALL: &str = "all";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortDirective {
    /// Descending creation time.
    #[default]
    Newest,
    /// Ascending creation time.
    Oldest,
}

/// What the user asked to see: search text, exact-match predicates and ordering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterState {
    pub search_text: String,
    pub predicates: BTreeMap<FilterField, String>,
    pub sort: SortDirective,
    pub pinned_first: bool,
}

impl FilterState {
    pub fn with_search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn with_predicate(mut self, field: FilterField, value: impl Into<String>) -> Self {
        self.predicates.insert(field, value.into());
        self
    }

    pub fn with_sort(mut self, sort: SortDirective) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_pinned_first(mut self, pinned_first: bool) -> Self {
        self.pinned_first = pinned_first;
        self
    }

    /// Trimmed, lower-cased query, or `None` when it matches everything.
    pub fn query(&self) -> Option<String> {
        let q = self.search_text.trim();
        (!q.is_empty()).then(|| q.to_lowercase())
    }

    /// Predicates that actually constrain the result (`"all"` excluded).
    pub fn active_predicates(&self) -> impl Iterator<Item = (FilterField, &str)> {
        self.predicates
            .iter()
            .filter(|(_, v)| v.as_str() != ALL)
            .map(|(k, v)| (*k, v.as_str()))
    }

    /// Whether a search or a non-default predicate is active.
    ///
    /// Server paging is suspended while this holds; sorting alone does not count.
    pub fn is_filtering(&self) -> bool {
        self.query().is_some() || self.active_predicates().next().is_some()
    }
}

/// Derives the ordered, filtered view of a loaded set.
///
/// Results are memoized on (loaded-set revision, filter state), so asking again with unchanged
/// inputs does no work.
#[derive(Clone, Debug)]
pub struct FilterPipeline {
    search_fields: Vec<TextField>,
    memo: Option<(u64, FilterState)>,
    indexes: Vec<usize>,
    runs: u64,
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new(vec![TextField::Title, TextField::Content, TextField::Category])
    }
}

impl FilterPipeline {
    pub fn new(search_fields: Vec<TextField>) -> Self {
        Self {
            search_fields,
            memo: None,
            indexes: Vec::new(),
            runs: 0,
        }
    }

    pub fn search_fields(&self) -> &[TextField] {
        &self.search_fields
    }

    pub fn set_search_fields(&mut self, search_fields: Vec<TextField>) {
        self.search_fields = search_fields;
        self.invalidate();
    }

    /// Number of times the pipeline actually recomputed.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub fn invalidate(&mut self) {
        self.memo = None;
    }

    /// Returns the memoized view, recomputing only if `revision` or `state` changed.
    pub fn view<'a, T: PagedItem>(
        &'a mut self,
        items: &'a [T],
        revision: u64,
        state: &FilterState,
    ) -> FilteredView<'a, T> {
        let fresh = matches!(&self.memo, Some((rev, s)) if *rev == revision && s == state);
        if !fresh {
            ptrace!(revision, loaded = items.len(), "FilterPipeline: recompute");
            self.indexes = run(items, state, &self.search_fields);
            self.memo = Some((revision, state.clone()));
            self.runs = self.runs.saturating_add(1);
        }
        FilteredView {
            items,
            indexes: &self.indexes,
        }
    }
}

/// Runs the pipeline once and returns indexes into `items`, in display order.
///
/// Steps, in order: text search, exact-match predicates, stable sort by creation time, then an
/// optional stable partition putting pinned items first.
pub fn run<T: PagedItem>(
    items: &[T],
    state: &FilterState,
    search_fields: &[TextField],
) -> Vec<usize> {
    let query = state.query();
    let predicates: Vec<(FilterField, &str)> = state.active_predicates().collect();

    let mut out: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| match &query {
            Some(q) => matches_query(*item, q, search_fields),
            None => true,
        })
        .filter(|(_, item)| {
            predicates
                .iter()
                .all(|(field, want)| item.filter_field(*field) == Some(*want))
        })
        .map(|(i, _)| i)
        .collect();

    // `sort_by` is stable: ties keep loaded-set order.
    match state.sort {
        SortDirective::Newest => {
            out.sort_by(|&a, &b| items[b].created_at().cmp(&items[a].created_at()));
        }
        SortDirective::Oldest => {
            out.sort_by(|&a, &b| items[a].created_at().cmp(&items[b].created_at()));
        }
    }

    if state.pinned_first {
        out.sort_by_key(|&i| !items[i].is_pinned());
    }

    out
}

fn matches_query<T: PagedItem>(item: &T, query: &str, fields: &[TextField]) -> bool {
    fields.iter().any(|f| {
        item.text_field(*f)
            .is_some_and(|text| text.to_lowercase().contains(query))
    })
}

/// A borrowed, ordered view over the loaded set.
#[derive(Debug)]
pub struct FilteredView<'a, T> {
    items: &'a [T],
    indexes: &'a [usize],
}

impl<T> Clone for FilteredView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FilteredView<'_, T> {}

impl<'a, T> FilteredView<'a, T> {
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a T> {
        self.indexes.get(index).and_then(|&i| self.items.get(i))
    }

    /// Positions of the shown items in the loaded set.
    pub fn source_indexes(&self) -> &'a [usize] {
        self.indexes
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &'a T> + use<'a, T> {
        let items = self.items;
        self.indexes.iter().map(move |&i| &items[i])
    }

    pub fn to_vec(&self) -> Vec<&'a T> {
        self.iter().collect()
    }
}

impl<T: PagedItem> FilteredView<'_, T> {
    /// Display position of the item with `key`, if shown.
    pub fn position_of(&self, key: &T::Key) -> Option<usize> {
        self.iter().position(|item| &item.key() == key)
    }
}
