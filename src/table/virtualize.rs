//! Visible slice of a long list

use std::ops::Range;

/// Rows of `len` items that fit a viewport of `viewport` lines when each row
/// is `row_height` lines tall and the first wanted row is `offset`.
///
/// The offset is clamped so the last page stays full.
pub fn visible_range(offset: usize, viewport: usize, row_height: usize, len: usize) -> Range<usize> {
    let fits = viewport / row_height.max(1);
    if fits == 0 || len == 0 {
        return 0..0;
    }
    let max_offset = len.saturating_sub(fits);
    let start = offset.min(max_offset);
    start..(start + fits).min(len)
}

/// Smallest scroll offset that keeps `selected` inside a window of `fits`
/// rows starting at `offset`
pub fn scroll_to_reveal(offset: usize, fits: usize, selected: usize) -> usize {
    if fits == 0 {
        return selected;
    }
    if selected < offset {
        selected
    } else if selected >= offset + fits {
        selected + 1 - fits
    } else {
        offset
    }
}
