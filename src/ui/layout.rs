//! Screen geometry shared by the renderer and the controller.
//!
//! The controller needs the reader's visible row count to clamp scrolling,
//! and the renderer needs the same numbers to draw, so both derive them from
//! the terminal size here.

/// Smallest terminal the normal views are drawn in.
pub const MIN_WIDTH: usize = 40;
pub const MIN_HEIGHT: usize = 10;

pub const LOGO: [&str; 5] = [
    " ██████╗██╗   ██╗██████╗  █████╗ ██╗  ██╗",
    "██╔════╝██║   ██║██╔══██╗██╔══██╗██║ ██╔╝",
    "██║     ██║   ██║██████╔╝███████║█████╔╝ ",
    "╚██████╗╚██████╔╝██║  ██║██║  ██║██║  ██╗",
    " ╚═════╝ ╚═════╝ ╚═╝  ╚═╝╚═╝  ╚═╝╚═╝  ╚═╝",
];

/// The logo is shown above the list only when this many rows are available.
pub const LOGO_MIN_HEIGHT: usize = 24;

pub const LIST_MIN_WIDTH: usize = 30;
pub const PREVIEW_MIN_WIDTH: usize = 20;
pub const GUTTER: usize = 1;
pub const FOOTER_ROWS: usize = 1;

/// Title, byline and separator above the reader body.
pub const READER_HEADER_ROWS: usize = 3;

pub fn too_small(width: usize, height: usize) -> bool {
    width < MIN_WIDTH || height < MIN_HEIGHT
}

pub fn show_logo(width: usize, height: usize) -> bool {
    height >= LOGO_MIN_HEIGHT && width >= LOGO[0].chars().count()
}

/// Rows above the panels: optional logo plus the stats line.
pub fn header_rows(width: usize, height: usize) -> usize {
    if show_logo(width, height) {
        LOGO.len() + 1
    } else {
        1
    }
}

/// Height of the list / preview panels including their borders.
pub fn body_height(width: usize, height: usize) -> usize {
    height.saturating_sub(header_rows(width, height) + FOOTER_ROWS)
}

/// Rows of list entries inside the list panel.
pub fn list_rows(width: usize, height: usize) -> usize {
    body_height(width, height).saturating_sub(2)
}

/// Horizontal split of the main view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub list: usize,
    /// `None` when the terminal is too narrow for a second panel.
    pub preview: Option<usize>,
}

/// The list takes two fifths of the width but never less than
/// [`LIST_MIN_WIDTH`]; the preview gets the rest if it is at least
/// [`PREVIEW_MIN_WIDTH`] wide.
pub fn columns(width: usize) -> Columns {
    let list = (width * 2 / 5).max(LIST_MIN_WIDTH).min(width);
    let rest = width.saturating_sub(list + GUTTER);
    if rest >= PREVIEW_MIN_WIDTH {
        Columns {
            list,
            preview: Some(rest),
        }
    } else {
        Columns {
            list: width,
            preview: None,
        }
    }
}

/// Space available to the reader body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderGeometry {
    /// Columns inside the reader border.
    pub inner_width: usize,
    /// Rows of article text visible at once.
    pub body_rows: usize,
}

pub fn reader(width: usize, height: usize) -> ReaderGeometry {
    ReaderGeometry {
        inner_width: width.saturating_sub(2),
        body_rows: height.saturating_sub(FOOTER_ROWS + 2 + READER_HEADER_ROWS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_terminal_split() {
        let cols = columns(80);
        assert_eq!(cols.list, 32);
        assert_eq!(cols.preview, Some(47));
        assert_eq!(cols.list + GUTTER + cols.preview.unwrap_or(0), 80);
    }

    #[test]
    fn list_never_narrower_than_floor() {
        assert_eq!(columns(60).list, LIST_MIN_WIDTH);
    }

    #[test]
    fn narrow_terminal_drops_preview() {
        let cols = columns(45);
        assert_eq!(cols, Columns { list: 45, preview: None });
    }

    #[test]
    fn logo_only_on_tall_terminals() {
        assert_eq!(header_rows(80, 24), 6);
        assert_eq!(header_rows(80, 23), 1);
        assert_eq!(body_height(80, 24), 17);
        assert_eq!(list_rows(80, 24), 15);
    }

    #[test]
    fn reader_rows_follow_height() {
        assert_eq!(
            reader(80, 24),
            ReaderGeometry {
                inner_width: 78,
                body_rows: 18
            }
        );
        assert_eq!(reader(80, 3).body_rows, 0);
    }
}
