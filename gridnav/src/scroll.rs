/// Geometry of the content scroll container, supplied by the rendering layer.
///
/// `widths` has one entry per matrix column; hidden columns have width 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    widths: Vec<u32>,
    positions: Vec<u32>,
    /// Visible width of the content scroll container.
    pub viewport_width: u32,
    /// Height of one content row.
    pub row_height: u32,
    /// Visible height of the content scroll container.
    pub viewport_height: u32,
}

impl ColumnLayout {
    pub fn new(widths: Vec<u32>, viewport_width: u32) -> Self {
        let positions = Self::calculate_positions(&widths);
        Self {
            widths,
            positions,
            viewport_width,
            row_height: 0,
            viewport_height: 0,
        }
    }

    /// Set the vertical geometry used for page-wise navigation.
    pub fn with_rows(mut self, row_height: u32, viewport_height: u32) -> Self {
        self.row_height = row_height;
        self.viewport_height = viewport_height;
        self
    }

    fn calculate_positions(widths: &[u32]) -> Vec<u32> {
        let mut positions = Vec::with_capacity(widths.len());
        let mut x = 0;
        for w in widths {
            positions.push(x);
            x += w;
        }
        positions
    }

    pub fn total_width(&self) -> u32 {
        self.widths.iter().sum()
    }

    /// Largest valid horizontal scroll offset.
    pub fn max_scroll_left(&self) -> u32 {
        self.total_width().saturating_sub(self.viewport_width)
    }

    /// `(left, right)` edges of a column in content coordinates.
    pub fn column_span(&self, col: usize) -> Option<(u32, u32)> {
        let left = *self.positions.get(col)?;
        Some((left, left + self.widths[col]))
    }

    /// True when there is a vertically scrollable content area.
    pub fn is_scrollable(&self) -> bool {
        self.row_height > 0 && self.viewport_height > 0
    }

    /// Number of rows one PageUp/PageDown moves.
    pub fn rows_per_page(&self) -> usize {
        if self.row_height == 0 {
            return 0;
        }
        ((self.viewport_height / self.row_height) as usize).max(1)
    }

    /// Smallest signed change to `scroll_left` that brings `col` fully into view.
    ///
    /// Zero when the column is already visible or unknown. A column wider than
    /// the viewport is aligned to its left edge.
    pub fn reveal_delta(&self, col: usize, scroll_left: u32) -> i64 {
        let Some((left, right)) = self.column_span(col) else {
            return 0;
        };
        if self.viewport_width == 0 {
            return 0;
        }
        let view_right = scroll_left + self.viewport_width;
        if left < scroll_left {
            left as i64 - scroll_left as i64
        } else if right > view_right {
            let wanted = right.saturating_sub(self.viewport_width).min(left);
            wanted as i64 - scroll_left as i64
        } else {
            0
        }
    }
}

/// Deferred vertical scroll reconciliation, drained by the host on its next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    /// Row that must end up inside the viewport.
    pub row: usize,
    /// Suggested scroll-top offset for that row.
    pub top: u32,
}

/// Header and content horizontal scroll positions kept in lock-step.
///
/// Writing either side mirrors the value to the other; the mirrored write is
/// skipped when both already match, so a host echoing scroll events back does
/// not loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollSync {
    header_left: u32,
    content_left: u32,
    mirrored_writes: usize,
}

impl ScrollSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header_left(&self) -> u32 {
        self.header_left
    }

    pub fn content_left(&self) -> u32 {
        self.content_left
    }

    /// Number of mirrored writes applied so far.
    pub fn mirrored_writes(&self) -> usize {
        self.mirrored_writes
    }

    /// Scroll the content area. Returns true if either position changed.
    pub fn set_content_left(&mut self, left: u32) -> bool {
        let changed = self.content_left != left;
        self.content_left = left;
        let mirrored = Self::mirror(left, &mut self.header_left, &mut self.mirrored_writes);
        changed || mirrored
    }

    /// Scroll the header area. Returns true if either position changed.
    pub fn set_header_left(&mut self, left: u32) -> bool {
        let changed = self.header_left != left;
        self.header_left = left;
        let mirrored = Self::mirror(left, &mut self.content_left, &mut self.mirrored_writes);
        changed || mirrored
    }

    fn mirror(source: u32, target: &mut u32, writes: &mut usize) -> bool {
        if *target == source {
            return false;
        }
        *target = source;
        *writes += 1;
        true
    }

    /// Bring `col` into view, applying the minimal delta to both sides.
    /// Returns the new offset when scrolling was necessary.
    pub fn reveal(&mut self, layout: &ColumnLayout, col: usize) -> Option<u32> {
        let delta = layout.reveal_delta(col, self.content_left);
        if delta == 0 {
            return None;
        }
        let left = (self.content_left as i64 + delta).clamp(0, layout.max_scroll_left() as i64) as u32;
        log::debug!(
            "[scroll] reveal column {} delta={} left {} -> {}",
            col,
            delta,
            self.content_left,
            left
        );
        self.set_content_left(left);
        Some(left)
    }
}
