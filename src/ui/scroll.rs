//! Line offset into a block of text.

/// Lines moved by `j`/`k`.
pub const LINE_STEP: isize = 3;
/// Lines moved by Space/PageDown/PageUp.
pub const PAGE_STEP: isize = 15;

/// Largest valid offset for `total_lines` shown `visible_rows` at a time.
pub fn max_offset(total_lines: usize, visible_rows: usize) -> usize {
    total_lines.saturating_sub(visible_rows)
}

/// Moves `offset` by `delta` lines, clamped to `[0, max_offset]`.
pub fn step(offset: usize, delta: isize, total_lines: usize, visible_rows: usize) -> usize {
    let moved = if delta.is_negative() {
        offset.saturating_sub(delta.unsigned_abs())
    } else {
        offset.saturating_add(delta.unsigned_abs())
    };
    moved.min(max_offset(total_lines, visible_rows))
}

/// Scroll position of the reader body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    offset: usize,
}

impl ScrollState {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn scroll_by(&mut self, delta: isize, total_lines: usize, visible_rows: usize) {
        self.offset = step(self.offset, delta, total_lines, visible_rows);
    }

    /// Re-clamps after the content or the viewport changed size.
    pub fn clamp(&mut self, total_lines: usize, visible_rows: usize) {
        self.offset = self.offset.min(max_offset(total_lines, visible_rows));
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn page_down_sequence_clamps_at_end() {
        let mut s = ScrollState::default();
        let mut seen = vec![s.offset()];
        for _ in 0..4 {
            s.scroll_by(PAGE_STEP, 50, 10);
            seen.push(s.offset());
        }
        assert_eq!(seen, vec![0, 15, 30, 40, 40]);
    }

    #[test]
    fn scrolling_up_stops_at_zero() {
        assert_eq!(step(2, -LINE_STEP, 50, 10), 0);
        assert_eq!(step(0, -PAGE_STEP, 50, 10), 0);
    }

    #[test]
    fn short_content_never_scrolls() {
        assert_eq!(step(0, PAGE_STEP, 5, 10), 0);
    }

    #[test]
    fn clamp_after_viewport_grows() {
        let mut s = ScrollState::default();
        s.scroll_by(PAGE_STEP * 3, 50, 10);
        assert_eq!(s.offset(), 40);
        s.clamp(50, 30);
        assert_eq!(s.offset(), 20);
    }

    proptest! {
        #[test]
        fn prop_step_stays_in_range(
            offset in 0usize..10_000,
            delta in any::<isize>(),
            total in 0usize..10_000,
            visible in 0usize..200,
        ) {
            let out = step(offset, delta, total, visible);
            prop_assert!(out <= max_offset(total, visible));
        }
    }
}
