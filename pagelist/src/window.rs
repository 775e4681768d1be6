use crate::ViewWindow;

/// Inputs for [`compute_window`].
///
/// All lengths share one unit (typically CSS pixels). Rows have a fixed height.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowInput {
    pub item_count: usize,
    pub item_height: f64,
    pub container_height: f64,
    /// Extra rows rendered above and below the viewport.
    pub overscan: usize,
    pub scroll_offset: f64,
}

impl WindowInput {
    pub fn new(item_count: usize, item_height: f64, container_height: f64) -> Self {
        Self {
            item_count,
            item_height,
            container_height,
            overscan: 0,
            scroll_offset: 0.0,
        }
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_scroll_offset(mut self, scroll_offset: f64) -> Self {
        self.scroll_offset = scroll_offset;
        self
    }
}

/// Maps a scroll position onto the range of rows to render.
///
/// This is O(1) and holds no state, so it can run on every scroll event.
///
/// Bad geometry never panics: a non-finite or non-positive `item_height` yields
/// [`ViewWindow::EMPTY`], and a non-finite or negative `container_height`/`scroll_offset` is
/// treated as `0`.
pub fn compute_window(input: WindowInput) -> ViewWindow {
    let Some(item_height) = positive(input.item_height) else {
        pwarn!(item_height = input.item_height, "compute_window: invalid item height");
        return ViewWindow::EMPTY;
    };
    let count = input.item_count;
    if count == 0 {
        return ViewWindow::EMPTY;
    }

    let container_height = non_negative(input.container_height);
    let scroll_offset = non_negative(input.scroll_offset);
    let overscan = input.overscan;

    // Float -> usize casts saturate, so huge ratios stay in range.
    let rows_in_view = (container_height / item_height).ceil() as usize;
    let visible_count = rows_in_view.saturating_add(overscan.saturating_mul(2));
    let first_visible = (scroll_offset / item_height).floor() as usize;

    let start_index = first_visible.saturating_sub(overscan).min(count);
    let end_index = start_index.saturating_add(visible_count).min(count);

    ViewWindow {
        start_index,
        end_index,
        total_height: count as f64 * item_height,
        offset_top: start_index as f64 * item_height,
    }
}

/// Top edge of row `index` inside the spacer.
pub fn row_top(index: usize, item_height: f64) -> f64 {
    positive(item_height).map_or(0.0, |h| index as f64 * h)
}

fn positive(v: f64) -> Option<f64> {
    (v.is_finite() && v > 0.0).then_some(v)
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}
