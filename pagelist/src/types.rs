use core::fmt;
use core::ops::Range;

/// Creation time of an item, in milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// The entity collection a list is showing (one dashboard tab).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Collection {
    Tasks,
    Notes,
    Todos,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Notes => "notes",
            Self::Todos => "todos",
        }
    }
}

/// Identifies where a page request came from: the selected team plus the active tab.
///
/// Responses are only applied when their originating context still matches the store's.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListContext {
    pub team_id: String,
    pub collection: Collection,
}

impl ListContext {
    pub fn new(team_id: impl Into<String>, collection: Collection) -> Self {
        Self {
            team_id: team_id.into(),
            collection,
        }
    }
}

impl fmt::Display for ListContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.team_id, self.collection.as_str())
    }
}

/// The slice of a list that should be rendered for the current scroll position.
///
/// `end_index` is exclusive. Heights are in the same unit as the configured row height.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewWindow {
    pub start_index: usize,
    pub end_index: usize, // exclusive
    /// Height of the spacer holding every row.
    pub total_height: f64,
    /// Where the first rendered row is positioned inside the spacer.
    pub offset_top: f64,
}

impl ViewWindow {
    pub const EMPTY: Self = Self {
        start_index: 0,
        end_index: 0,
        total_height: 0.0,
        offset_top: 0.0,
    };

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn range(&self) -> Range<usize> {
        self.start_index..self.end_index
    }

    pub fn contains(&self, index: usize) -> bool {
        self.range().contains(&index)
    }

    /// Returns `true` when `scroll_offset` points past the end of the content.
    pub fn is_scroll_out_of_range(&self, scroll_offset: f64) -> bool {
        scroll_offset > self.total_height
    }
}
