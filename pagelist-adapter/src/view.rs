use pagelist::{FilteredView, ViewWindow, WindowInput, compute_window, row_top};

/// Default rows rendered beyond each edge of the viewport.
pub const DEFAULT_OVERSCAN: usize = 8;

/// Geometry of one list instance. Row height is fixed; nothing is measured.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListViewOptions {
    pub item_height: f64,
    pub container_height: f64,
    pub overscan: usize,
}

impl ListViewOptions {
    pub fn new(item_height: f64, container_height: f64) -> Self {
        Self {
            item_height,
            container_height,
            overscan: DEFAULT_OVERSCAN,
        }
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }
}

/// Anything a list view can index into.
pub trait RowSource {
    type Row;

    fn row_count(&self) -> usize;

    fn row(&self, index: usize) -> Option<&Self::Row>;
}

impl<T> RowSource for [T] {
    type Row = T;

    fn row_count(&self) -> usize {
        self.len()
    }

    fn row(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}

impl<T> RowSource for Vec<T> {
    type Row = T;

    fn row_count(&self) -> usize {
        self.len()
    }

    fn row(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}

impl<T> RowSource for FilteredView<'_, T> {
    type Row = T;

    fn row_count(&self) -> usize {
        self.len()
    }

    fn row(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}

/// A row handed to the render callback.
#[derive(Debug)]
pub struct VisibleRow<'a, R, K> {
    pub index: usize,
    pub key: K,
    /// Absolute top inside the spacer.
    pub top: f64,
    pub height: f64,
    pub row: &'a R,
}

/// Binds a scrollable surface to the window calculator.
///
/// The adapter forwards scroll offsets and container resizes; [`Self::render`] then yields only
/// the rows inside the window, each with a stable key so per-row UI state survives re-sorts.
#[derive(Clone, Debug)]
pub struct ListView {
    options: ListViewOptions,
    scroll_offset: f64,
}

impl ListView {
    pub fn new(options: ListViewOptions) -> Self {
        Self {
            options,
            scroll_offset: 0.0,
        }
    }

    pub fn options(&self) -> &ListViewOptions {
        &self.options
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn on_scroll(&mut self, offset: f64) {
        self.scroll_offset = if offset.is_finite() && offset > 0.0 {
            offset
        } else {
            0.0
        };
    }

    pub fn on_container_height(&mut self, height: f64) {
        self.options.container_height = height;
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        self.options.overscan = overscan;
    }

    /// The window for `count` rows at the current offset, without side effects.
    pub fn window_for(&self, count: usize) -> ViewWindow {
        compute_window(
            WindowInput::new(count, self.options.item_height, self.options.container_height)
                .with_overscan(self.options.overscan)
                .with_scroll_offset(self.scroll_offset),
        )
    }

    /// The window for `count` rows.
    ///
    /// If the list shrank below the current offset, the offset is reset to the top first.
    pub fn window(&mut self, count: usize) -> ViewWindow {
        let window = self.window_for(count);
        if !window.is_scroll_out_of_range(self.scroll_offset) {
            return window;
        }
        adebug!(
            scroll_offset = self.scroll_offset,
            total_height = window.total_height,
            "ListView: offset past end, resetting"
        );
        self.scroll_offset = 0.0;
        self.window_for(count)
    }

    /// Calls `f` for every row inside the window and returns the window used.
    pub fn render<'r, R, K>(
        &mut self,
        rows: &'r R,
        key_of: impl Fn(&R::Row) -> K,
        mut f: impl FnMut(VisibleRow<'r, R::Row, K>),
    ) -> ViewWindow
    where
        R: RowSource + ?Sized,
    {
        let window = self.window(rows.row_count());
        let height = self.options.item_height;
        atrace!(
            start = window.start_index,
            end = window.end_index,
            "ListView::render"
        );
        for index in window.range() {
            let Some(row) = rows.row(index) else {
                break;
            };
            f(VisibleRow {
                index,
                key: key_of(row),
                top: row_top(index, height),
                height,
                row,
            });
        }
        window
    }

    /// Index of the row at the top edge of the viewport (no overscan).
    pub fn first_visible_index(&self, count: usize) -> Option<usize> {
        let h = self.options.item_height;
        if count == 0 || !(h.is_finite() && h > 0.0) {
            return None;
        }
        let index = (self.scroll_offset / h).floor() as usize;
        Some(index.min(count - 1))
    }

    /// Largest offset that still fills the viewport.
    pub fn max_scroll_offset(&self, count: usize) -> f64 {
        let total = self.window_for(count).total_height;
        (total - self.options.container_height).max(0.0)
    }

    pub fn set_scroll_offset_clamped(&mut self, offset: f64, count: usize) {
        let max = self.max_scroll_offset(count);
        self.on_scroll(offset.min(max));
    }

    /// Scrolls so row `index` sits at the top (clamped). Returns the applied offset.
    pub fn scroll_to_index(&mut self, index: usize, count: usize) -> f64 {
        self.set_scroll_offset_clamped(row_top(index, self.options.item_height), count);
        self.scroll_offset
    }
}
