//! Render functions for the TUI.
//!
//! [`render_grid`] is a pure projection of the app state onto a
//! `width` x `height` character grid of role-tagged segments. [`draw`] hands
//! that grid to ratatui, resolving roles through the active theme. Nothing
//! here is cached between frames.

use crate::app::{App, Overlay, ReaderState, ReaderView, SPINNER_FRAMES};
use crate::config::StartScreen;
use crate::theme::{Role, ThemeName};
use crate::ui::frame::{
    blank_row, draw_panel, join_side_by_side, pad_row, text_row, Row, Segment, StyledLine,
};
use crate::ui::layout::{self, LOGO};
use crate::ui::viewport::compute_window;
use crate::util::{display_width, fit, wrap};
use ratatui::{
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub type Grid = Vec<Row>;

const LIST_HINTS: &str = "j/k:Navigate  Enter:Read  m:Done  o:Open  T:Theme  ^R:Refresh  q:Quit";
const READER_HINTS: &str = "j/k:Scroll  Space:Page  o:Open  Esc:Back";
const ERROR_HINTS: &str = "^R: Retry  q: Quit";
const THEME_HINTS: &str = "Enter:Apply  Esc:Cancel";

/// Longest separator drawn under the reader title.
const SEPARATOR_MAX: usize = 50;

/// Tags shown in the preview panel.
const PREVIEW_TAGS: usize = 3;

/// Draws the current state into the terminal frame.
pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    let grid = render_grid(app, usize::from(area.width), usize::from(area.height));
    let lines: Vec<Line> = grid
        .into_iter()
        .map(|row| {
            Line::from(
                row.into_iter()
                    .map(|seg| Span::styled(seg.text, app.theme.style(seg.role)))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();
    f.render_widget(Paragraph::new(lines), area);
}

/// Projects `app` onto exactly `height` rows of exactly `width` columns.
pub fn render_grid(app: &App, width: usize, height: usize) -> Grid {
    let rows = if layout::too_small(width, height) {
        render_too_small(width, height)
    } else if app.loading {
        render_loading(app, width, height)
    } else if let Overlay::Reader(view) = &app.overlay {
        render_reader(app, view, width, height)
    } else if let Some(error) = &app.error {
        render_error(error, width, height)
    } else {
        render_main(app, width, height)
    };
    normalize(rows, width, height)
}

/// Pads every row to `width` and the grid to `height` rows.
fn normalize(mut rows: Grid, width: usize, height: usize) -> Grid {
    rows.truncate(height);
    while rows.len() < height {
        rows.push(blank_row(width));
    }
    rows.into_iter().map(|row| pad_row(row, width)).collect()
}

fn center_row(text: &str, role: Role, width: usize) -> Row {
    let text_width = display_width(text);
    if text_width >= width {
        return text_row(text, role, width);
    }
    let left = (width - text_width) / 2;
    vec![
        Segment::new(" ".repeat(left), Role::Text),
        Segment::new(fit(text, width - left), role),
    ]
}

fn footer_row(app: &App, hints: &str, width: usize) -> Row {
    match &app.status_message {
        Some((msg, _)) => text_row(&format!(" {msg}"), Role::Accent, width),
        None => text_row(&format!(" {hints}"), Role::TextDim, width),
    }
}

fn spinner(app: &App) -> &'static str {
    SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()]
}

fn logo_rows(width: usize) -> Vec<Row> {
    LOGO.iter()
        .map(|line| center_row(line, Role::Primary, width))
        .collect()
}

/// Stacks `block` in the vertical middle of `height` rows.
fn vertically_centered(block: Vec<Row>, width: usize, height: usize) -> Grid {
    let top = height.saturating_sub(block.len()) / 2;
    let mut rows: Grid = (0..top).map(|_| blank_row(width)).collect();
    rows.extend(block);
    rows
}

// ============================================================================
// Full-screen states
// ============================================================================

fn render_too_small(width: usize, height: usize) -> Grid {
    let block = if height < 3 || width < 20 {
        vec![text_row("Too small", Role::TextDim, width)]
    } else {
        vec![
            center_row("Terminal too small", Role::Accent, width),
            blank_row(width),
            center_row(
                &format!("Minimum: {}x{}", layout::MIN_WIDTH, layout::MIN_HEIGHT),
                Role::TextDim,
                width,
            ),
            center_row(&format!("Current: {width}x{height}"), Role::TextDim, width),
        ]
    };
    vertically_centered(block, width, height)
}

fn render_loading(app: &App, width: usize, height: usize) -> Grid {
    let mut block = Vec::new();
    if layout::show_logo(width, height) {
        block.extend(logo_rows(width));
        block.push(blank_row(width));
    }
    block.push(center_row(
        &format!("{} Loading articles...", spinner(app)),
        Role::TextDim,
        width,
    ));
    vertically_centered(block, width, height)
}

fn render_error(error: &str, width: usize, height: usize) -> Grid {
    let mut block = Vec::new();
    if layout::show_logo(width, height) {
        block.extend(logo_rows(width));
        block.push(blank_row(width));
    }
    for line in wrap(&format!("Error: {error}"), width.saturating_sub(4)) {
        block.push(center_row(&line, Role::Accent, width));
    }
    block.push(center_row(ERROR_HINTS, Role::TextDim, width));
    vertically_centered(block, width, height)
}

// ============================================================================
// Main view: header, list + preview, footer
// ============================================================================

fn render_main(app: &App, width: usize, height: usize) -> Grid {
    let mut rows = Vec::with_capacity(height);

    if layout::show_logo(width, height) {
        rows.extend(logo_rows(width));
    }
    let stats = format!(
        " {} articles  ~{}min  [{}]",
        app.articles.len(),
        app.total_reading_minutes(),
        app.start_screen
    );
    rows.push(text_row(&stats, Role::Secondary, width));

    let body_height = layout::body_height(width, height);
    let visible = layout::list_rows(width, height);
    let columns = layout::columns(width);
    let theme_index = match app.overlay {
        Overlay::ThemePicker { index } => Some(index),
        _ => None,
    };

    let body = match (columns.preview, theme_index) {
        (Some(preview_width), picker) => {
            let left = list_panel(app, columns.list, body_height, visible);
            let right = match picker {
                Some(index) => theme_panel(app, index, preview_width, body_height),
                None => preview_panel(app, preview_width, body_height),
            };
            join_side_by_side(left, right).unwrap_or_else(|e| {
                tracing::error!(error = %e, "Panel layout mismatch");
                Vec::new()
            })
        }
        (None, Some(index)) => theme_panel(app, index, width, body_height),
        (None, None) => list_panel(app, width, body_height, visible),
    };
    rows.extend(body);

    let hints = if theme_index.is_some() {
        THEME_HINTS
    } else {
        LIST_HINTS
    };
    rows.push(footer_row(app, hints, width));
    rows
}

/// `visible` is the number of entry rows inside the panel border.
fn list_panel(app: &App, width: usize, height: usize, visible: usize) -> Vec<Row> {
    if app.articles.is_empty() {
        return draw_panel(
            width,
            height,
            "Articles",
            &[StyledLine::new(" No articles", Role::TextDim)],
        );
    }

    let (start, end) = compute_window(app.articles.len(), app.selected, visible);
    let unselected_role = match app.start_screen {
        StartScreen::Unread => Role::Unread,
        StartScreen::Read => Role::Read,
    };

    let lines: Vec<StyledLine> = app.articles[start..end]
        .iter()
        .enumerate()
        .map(|(offset, article)| {
            if start + offset == app.selected {
                StyledLine::new(format!(" ► {}", article.title), Role::Primary)
            } else {
                StyledLine::new(format!("   {}", article.title), unselected_role)
            }
        })
        .collect();

    let title = format!("Articles {}/{}", app.selected + 1, app.articles.len());
    draw_panel(width, height, &title, &lines)
}

fn preview_panel(app: &App, width: usize, height: usize) -> Vec<Row> {
    let inner = width.saturating_sub(2);
    let mut lines = Vec::new();

    if let Some(article) = app.selected_article() {
        for line in wrap(&article.title, inner) {
            lines.push(StyledLine::new(line, Role::Primary));
        }
        lines.push(StyledLine::new(article.url.as_str(), Role::TextDim));

        let mut meta: Vec<String> = article
            .tags
            .iter()
            .take(PREVIEW_TAGS)
            .map(|t| format!("#{t}"))
            .collect();
        meta.push(format!("{}min", article.reading_time_minutes));
        lines.push(StyledLine::new(meta.join(" "), Role::Secondary));

        if !article.summary.is_empty() {
            lines.push(StyledLine::blank());
            for source in article.summary.lines() {
                for line in wrap(source, inner) {
                    lines.push(StyledLine::new(line, Role::Text));
                }
            }
        }
    }

    draw_panel(width, height, "Preview", &lines)
}

fn theme_panel(app: &App, index: usize, width: usize, height: usize) -> Vec<Row> {
    let mut lines: Vec<StyledLine> = ThemeName::ALL
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let current = if *name == app.theme.name {
                " (current)"
            } else {
                ""
            };
            if i == index {
                StyledLine::new(format!(" ► {name}{current}"), Role::Primary)
            } else {
                StyledLine::new(format!("   {name}{current}"), Role::Text)
            }
        })
        .collect();
    lines.push(StyledLine::blank());
    lines.push(StyledLine::new(format!(" {THEME_HINTS}"), Role::TextDim));
    draw_panel(width, height, "Theme", &lines)
}

// ============================================================================
// Reader overlay
// ============================================================================

fn render_reader(app: &App, view: &ReaderView, width: usize, height: usize) -> Grid {
    let geometry = layout::reader(width, height);
    let panel_height = height.saturating_sub(layout::FOOTER_ROWS);

    let (lines, hints) = match &view.state {
        ReaderState::Loading => (
            vec![StyledLine::new(
                format!("{} Loading article...", spinner(app)),
                Role::Accent,
            )],
            READER_HINTS.to_string(),
        ),
        ReaderState::Failed(message) => (
            vec![
                StyledLine::new("Failed to load article", Role::Accent),
                StyledLine::new(message.as_str(), Role::TextDim),
                StyledLine::blank(),
                StyledLine::new("Press Esc to go back", Role::TextDim),
            ],
            READER_HINTS.to_string(),
        ),
        ReaderState::Loaded { content, lines } => {
            let heading = if content.title.is_empty() {
                view.title.as_str()
            } else {
                content.title.as_str()
            };
            let mut out = vec![
                StyledLine::new(heading, Role::Primary),
                StyledLine::new(content.byline.as_str(), Role::TextDim),
                StyledLine::new(
                    "─".repeat(geometry.inner_width.min(SEPARATOR_MAX)),
                    Role::Border,
                ),
            ];
            let offset = view.scroll.offset();
            out.extend(
                lines
                    .iter()
                    .skip(offset)
                    .take(geometry.body_rows)
                    .map(|l| StyledLine::new(l.as_str(), Role::Text)),
            );

            let hints = if lines.len() > geometry.body_rows {
                let last = (offset + geometry.body_rows).min(lines.len());
                format!("[{}-{}/{}]  {READER_HINTS}", offset + 1, last, lines.len())
            } else {
                READER_HINTS.to_string()
            };
            (out, hints)
        }
    };

    let mut rows = draw_panel(width, panel_height, &view.title, &lines);
    rows.push(footer_row(app, &hints, width));
    rows
}
