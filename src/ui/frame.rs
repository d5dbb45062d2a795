//! Bordered panels drawn into a fixed character grid.
//!
//! A panel is a `Vec<Row>` where every row is exactly the declared width in
//! display columns. Rows are kept as role-tagged segments so the ratatui
//! layer can color borders, titles and each content line independently.

use crate::theme::Role;
use crate::util::{display_width, fit, pad};
use thiserror::Error;

/// A run of text drawn with a single role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub role: Role,
}

impl Segment {
    pub fn new(text: impl Into<String>, role: Role) -> Self {
        Self {
            text: text.into(),
            role,
        }
    }
}

/// One grid row.
pub type Row = Vec<Segment>;

/// A content line with the role used to draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledLine {
    pub text: String,
    pub role: Role,
}

impl StyledLine {
    pub fn new(text: impl Into<String>, role: Role) -> Self {
        Self {
            text: text.into(),
            role,
        }
    }

    pub fn blank() -> Self {
        Self::new("", Role::Text)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FrameError {
    #[error("panels must have equal height to sit side by side (left {left}, right {right})")]
    HeightMismatch { left: usize, right: usize },
}

/// Concatenated text of a row.
pub fn row_text(row: &Row) -> String {
    row.iter().map(|s| s.text.as_str()).collect()
}

/// A row of `width` spaces.
pub fn blank_row(width: usize) -> Row {
    vec![Segment::new(" ".repeat(width), Role::Text)]
}

/// A single line fitted to exactly `width` columns.
pub fn text_row(text: &str, role: Role, width: usize) -> Row {
    vec![Segment::new(fit(text, width), role)]
}

/// Draws a bordered panel `width` columns by `height` rows.
///
/// The title sits inline in the top border as `┌─ title ─…┐` and is left
/// out entirely when it does not fit. Content lines beyond `height - 2` are
/// ignored (callers slice for scrolling); missing lines are blank.
/// Panels smaller than 2x2 have no room for a border and come back blank.
pub fn draw_panel(width: usize, height: usize, title: &str, lines: &[StyledLine]) -> Vec<Row> {
    if width < 2 || height < 2 {
        return (0..height).map(|_| blank_row(width)).collect();
    }

    let inner = width - 2;
    let mut rows = Vec::with_capacity(height);
    rows.push(top_border(width, title));

    let mut content = lines.iter();
    for _ in 0..height - 2 {
        let body = match content.next() {
            Some(line) => Segment::new(fit(&line.text, inner), line.role),
            None => Segment::new(" ".repeat(inner), Role::Text),
        };
        rows.push(vec![
            Segment::new("│", Role::Border),
            body,
            Segment::new("│", Role::Border),
        ]);
    }

    rows.push(vec![Segment::new(
        format!("└{}┘", "─".repeat(inner)),
        Role::Border,
    )]);
    rows
}

fn top_border(width: usize, title: &str) -> Row {
    // "┌─ " + title + " " + fill + "┐"
    let title_width = display_width(title);
    if title.is_empty() || title_width + 5 > width {
        return vec![Segment::new(
            format!("┌{}┐", "─".repeat(width - 2)),
            Role::Border,
        )];
    }

    let fill = width - 5 - title_width;
    vec![
        Segment::new("┌─ ", Role::Border),
        Segment::new(title, Role::Primary),
        Segment::new(format!(" {}┐", "─".repeat(fill)), Role::Border),
    ]
}

/// Places two panels next to each other with a one-column gutter.
///
/// Both panels must have the same number of rows.
pub fn join_side_by_side(left: Vec<Row>, right: Vec<Row>) -> Result<Vec<Row>, FrameError> {
    if left.len() != right.len() {
        return Err(FrameError::HeightMismatch {
            left: left.len(),
            right: right.len(),
        });
    }

    Ok(left
        .into_iter()
        .zip(right)
        .map(|(mut l, r)| {
            l.push(Segment::new(" ", Role::Text));
            l.extend(r);
            l
        })
        .collect())
}

/// Pads a row with spaces to `width` columns. Rows already at or beyond the
/// width are returned unchanged.
pub fn pad_row(mut row: Row, width: usize) -> Row {
    let current: usize = row.iter().map(|s| display_width(&s.text)).sum();
    if current < width {
        row.push(Segment::new(pad("", width - current), Role::Text));
    }
    row
}
