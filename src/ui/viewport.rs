/// Computes the `[start, end)` slice of a list to show in `visible_rows`
/// rows, keeping `selected` centered when possible.
///
/// The window is clamped at both ends of the list, so near the top the
/// selection sits above center and near the bottom it sits below.
/// `selected` is always inside the window when `total > 0` and
/// `visible_rows > 0`.
pub fn compute_window(total: usize, selected: usize, visible_rows: usize) -> (usize, usize) {
    if visible_rows == 0 {
        return (0, 0);
    }
    let start = selected
        .saturating_sub(visible_rows / 2)
        .min(total.saturating_sub(visible_rows));
    let end = (start + visible_rows).min(total);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn centers_selection() {
        assert_eq!(compute_window(25, 12, 10), (7, 17));
    }

    #[test]
    fn clamps_at_top_and_bottom() {
        assert_eq!(compute_window(25, 2, 10), (0, 10));
        assert_eq!(compute_window(25, 24, 10), (15, 25));
    }

    #[test]
    fn short_list_shows_everything() {
        assert_eq!(compute_window(3, 1, 10), (0, 3));
    }

    #[test]
    fn zero_rows_shows_nothing() {
        assert_eq!(compute_window(25, 12, 0), (0, 0));
    }

    #[test]
    fn empty_list() {
        assert_eq!(compute_window(0, 0, 10), (0, 0));
    }

    proptest! {
        #[test]
        fn prop_selection_inside_window(
            total in 0usize..500,
            visible in 1usize..80,
            seed in 0usize..500,
        ) {
            let selected = seed % total.max(1);
            let (start, end) = compute_window(total, selected, visible);
            prop_assert!(end - start <= visible);
            prop_assert!(end <= total);
            if total > 0 {
                prop_assert!(start <= selected && selected < end);
            }
        }
    }
}
