use pagelist::row_top;

use crate::{ListView, RowSource};

/// A scroll anchor that keeps the viewport pinned to an item across data changes.
///
/// Typical use cases:
/// - an optimistic create prepending a row above the reader
/// - a re-sort that moves the row under the reader's eyes
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollAnchor<K> {
    pub key: K,
    /// The distance from the anchor row's top to the viewport's scroll offset.
    pub offset_in_viewport: f64,
}

/// Captures an anchor for the row at the top edge of the viewport.
///
/// Returns `None` when there are no rows or the row height is unusable.
pub fn capture_first_visible_anchor<R, K>(
    view: &ListView,
    rows: &R,
    key_of: impl Fn(&R::Row) -> K,
) -> Option<ScrollAnchor<K>>
where
    R: RowSource + ?Sized,
{
    let index = view.first_visible_index(rows.row_count())?;
    let row = rows.row(index)?;
    let top = row_top(index, view.options().item_height);
    Some(ScrollAnchor {
        key: key_of(row),
        offset_in_viewport: (view.scroll_offset() - top).max(0.0),
    })
}

/// Applies a previously captured anchor by adjusting the scroll offset.
///
/// `count` and `key_to_index` describe the *current* rows. Returns `true` when the anchor row is
/// still present and the offset was moved.
pub fn apply_anchor<K>(
    view: &mut ListView,
    anchor: &ScrollAnchor<K>,
    count: usize,
    mut key_to_index: impl FnMut(&K) -> Option<usize>,
) -> bool {
    let Some(index) = key_to_index(&anchor.key) else {
        return false;
    };
    if index >= count {
        return false;
    }
    let target = row_top(index, view.options().item_height) + anchor.offset_in_viewport;
    view.set_scroll_offset_clamped(target, count);
    true
}
