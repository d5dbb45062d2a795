use std::borrow::Cow;

/// Ellipsis string used for truncation
const ELLIPSIS: &str = "...";
/// Display width of the ellipsis (3 columns for ASCII "...")
const ELLIPSIS_WIDTH: usize = 3;

/// Returns true for East-Asian wide / full-width code points.
///
/// Covers Hangul Jamo, the CJK block run from radicals through Yi (minus the
/// half-width ideographic space U+303F), Hangul syllables, CJK compatibility
/// ideographs, vertical forms, CJK compatibility forms, full-width forms and
/// signs, and the supplementary ideographic planes.
fn is_wide(c: char) -> bool {
    let cp = c as u32;
    matches!(cp,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3040..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE10..=0xFE19
        | 0xFE30..=0xFE6F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x2FFFD
        | 0x30000..=0x3FFFD
    )
}

/// Display width of a single code point: 2 for wide glyphs, 1 otherwise.
pub fn char_width(c: char) -> usize {
    if is_wide(c) {
        2
    } else {
        1
    }
}

/// Calculates the display width of a string in terminal columns.
///
/// East-Asian wide code points count as 2 columns, every other code point
/// (including combining marks and emoji) counts as 1. No normalization is
/// performed.
///
/// # Examples
///
/// ```
/// use curak::util::display_width;
///
/// assert_eq!(display_width("Hello"), 5);
/// assert_eq!(display_width("你好"), 4);
/// assert_eq!(display_width("Hi 世界"), 7);
/// ```
pub fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Truncates a string to fit within a maximum display width.
///
/// If truncation is necessary, appends "..." to indicate text was cut off.
/// The result never exceeds `max_width` columns.
///
/// - If the string fits, returns `Cow::Borrowed(s)` unchanged (no ellipsis).
/// - If `max_width <= 3` there is no room for text plus ellipsis, so as many
///   code points as fit are returned without one.
/// - Otherwise code points are kept while the running width stays within
///   `max_width - 3`, then "..." is appended.
///
/// # Examples
///
/// ```
/// use curak::util::truncate;
///
/// assert_eq!(truncate("Short", 10), "Short");
/// assert_eq!(truncate("Hello World", 8), "Hello...");
/// assert_eq!(truncate("你好世界", 7), "你好...");
/// assert_eq!(truncate("Test", 0), "");
/// assert_eq!(truncate("Test", 2), "Te");
/// ```
pub fn truncate(s: &str, max_width: usize) -> Cow<'_, str> {
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    if max_width <= ELLIPSIS_WIDTH {
        let mut byte_end = 0;
        let mut current_width = 0;
        for (idx, c) in s.char_indices() {
            let w = char_width(c);
            if current_width + w > max_width {
                break;
            }
            current_width += w;
            byte_end = idx + c.len_utf8();
        }
        if byte_end == s.len() {
            return Cow::Borrowed(s);
        }
        return Cow::Owned(s[..byte_end].to_string());
    }

    let target_width = max_width - ELLIPSIS_WIDTH;
    let mut current_width = 0;
    let mut cut_point = None;

    for (idx, c) in s.char_indices() {
        let w = char_width(c);

        if cut_point.is_none() && current_width + w > target_width {
            cut_point = Some(idx);
        }

        if current_width + w > max_width {
            let cut = cut_point.unwrap_or(idx);
            return Cow::Owned(format!("{}{}", &s[..cut], ELLIPSIS));
        }

        current_width += w;
    }

    Cow::Borrowed(s)
}

/// Pads a string with spaces until its display width equals `target_width`.
///
/// Never truncates: a string already at or beyond the target is returned
/// unchanged, so callers truncate first.
pub fn pad(s: &str, target_width: usize) -> Cow<'_, str> {
    let width = display_width(s);
    if width >= target_width {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + (target_width - width));
    out.push_str(s);
    out.extend(std::iter::repeat(' ').take(target_width - width));
    Cow::Owned(out)
}

/// Truncate then pad: the result is exactly `width` columns unless a wide
/// glyph straddles the boundary, in which case it is one column short and
/// padded back up.
pub fn fit(s: &str, width: usize) -> String {
    pad(&truncate(s, width), width).into_owned()
}

/// Greedy word wrap of a single line to `width` columns.
///
/// Always yields at least one row (an empty line wraps to one empty row).
/// Words wider than `width` are split at code point boundaries.
pub fn wrap(line: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![String::new()];
    }

    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    let mut row_has_words = false;

    for word in line.split(' ') {
        let word_width = display_width(word);
        let sep = usize::from(row_has_words);

        if current_width + sep + word_width <= width {
            if row_has_words {
                current.push(' ');
            }
            current.push_str(word);
            current_width += sep + word_width;
            row_has_words = true;
            continue;
        }

        if row_has_words {
            rows.push(std::mem::take(&mut current));
            current_width = 0;
        }

        if word_width <= width {
            current.push_str(word);
            current_width = word_width;
        } else {
            for c in word.chars() {
                let w = char_width(c);
                if current_width + w > width && current_width > 0 {
                    rows.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push(c);
                current_width += w;
            }
        }
        row_has_words = true;
    }

    rows.push(current);
    rows
}

/// Columns between tab stops used by [`expand_tabs`].
pub const TAB_WIDTH: usize = 4;

/// Replaces each tab with spaces up to the next [`TAB_WIDTH`] stop.
///
/// Columns are counted with [`char_width`] and restart after every newline,
/// so the result renders at exactly its [`display_width`].
pub fn expand_tabs(s: &str) -> Cow<'_, str> {
    if !s.contains('\t') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + TAB_WIDTH);
    let mut column = 0;
    for c in s.chars() {
        match c {
            '\t' => {
                let spaces = TAB_WIDTH - column % TAB_WIDTH;
                out.extend(std::iter::repeat(' ').take(spaces));
                column += spaces;
            }
            '\n' => {
                out.push(c);
                column = 0;
            }
            c => {
                out.push(c);
                column += char_width(c);
            }
        }
    }
    Cow::Owned(out)
}

fn is_stripped_control(c: char) -> bool {
    c.is_control() && !matches!(c, '\t' | '\n' | '\r')
}

/// Strip terminal control characters and ANSI escape sequences from text.
///
/// Removes CSI (`ESC [` ... final byte) and OSC (`ESC ]` ... BEL or `ESC \`)
/// sequences, bare ESC, DEL and other control characters. Tab, newline and
/// carriage return are kept.
///
/// Returns `Cow::Borrowed` when the input is already clean.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_stripped_control) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\x1b' => match chars.peek() {
                Some('[') => {
                    chars.next();
                    for c in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&c) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '\x07' {
                            break;
                        }
                        if c == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            },
            c if is_stripped_control(c) => {}
            c => out.push(c),
        }
    }

    Cow::Owned(out)
}
