//! Theme registry for the TUI.
//!
//! A theme assigns a color to each of eight semantic roles. The renderer only
//! ever asks for a [`Role`]; the active [`Theme`] turns it into a ratatui
//! `Style`. Exactly one theme is active at a time and it is swapped whole.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Theme Name
// ============================================================================

/// Names of the built-in themes, in picker order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Default,
    Ocean,
    Forest,
    Sunset,
    Mono,
}

impl ThemeName {
    /// Every registered theme, in the order the picker lists them.
    pub const ALL: [ThemeName; 5] = [
        ThemeName::Default,
        ThemeName::Ocean,
        ThemeName::Forest,
        ThemeName::Sunset,
        ThemeName::Mono,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Ocean => "ocean",
            Self::Forest => "forest",
            Self::Sunset => "sunset",
            Self::Mono => "mono",
        }
    }

    /// Position of this theme in [`ThemeName::ALL`].
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    /// Theme at `index` in picker order, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn theme(self) -> Theme {
        Theme::named(self)
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for theme names not present in the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme '{0}' (available: default, ocean, forest, sunset, mono)")]
pub struct UnknownTheme(pub String);

impl FromStr for ThemeName {
    type Err = UnknownTheme;

    /// Case-insensitive lookup.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| UnknownTheme(s.to_string()))
    }
}

// ============================================================================
// Roles
// ============================================================================

/// Semantic color roles. Every styled piece of the grid carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Headings, panel titles, the selected list row
    Primary,
    /// Tags, secondary metadata
    Secondary,
    /// Highlights: selection marker, spinner, status messages
    Accent,
    /// Rows in the unread list
    Unread,
    /// Rows in the read list
    Read,
    /// Box-drawing characters
    Border,
    /// Body text
    #[default]
    Text,
    /// Hints, URLs, bylines
    TextDim,
}

// ============================================================================
// Theme
// ============================================================================

/// Concrete colors for each role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: ThemeName,
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub unread: Color,
    pub read: Color,
    pub border: Color,
    pub text: Color,
    pub text_dim: Color,
}

impl Theme {
    pub fn named(name: ThemeName) -> Self {
        use Color::*;
        let (primary, secondary, accent, unread, read, border) = match name {
            ThemeName::Default => (Cyan, Green, Yellow, Yellow, Green, Cyan),
            ThemeName::Ocean => (Blue, Cyan, Magenta, Cyan, Blue, Blue),
            ThemeName::Forest => (Green, Yellow, Cyan, Yellow, Green, Green),
            ThemeName::Sunset => (Magenta, Red, Yellow, Yellow, Red, Magenta),
            ThemeName::Mono => (White, DarkGray, White, White, DarkGray, DarkGray),
        };
        Self {
            name,
            primary,
            secondary,
            accent,
            unread,
            read,
            border,
            text: White,
            text_dim: DarkGray,
        }
    }

    pub fn color(&self, role: Role) -> Color {
        match role {
            Role::Primary => self.primary,
            Role::Secondary => self.secondary,
            Role::Accent => self.accent,
            Role::Unread => self.unread,
            Role::Read => self.read,
            Role::Border => self.border,
            Role::Text => self.text,
            Role::TextDim => self.text_dim,
        }
    }

    /// Style for a role. Primary and Accent are emboldened.
    pub fn style(&self, role: Role) -> Style {
        let style = Style::default().fg(self.color(role));
        match role {
            Role::Primary | Role::Accent => style.add_modifier(Modifier::BOLD),
            _ => style,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::named(ThemeName::Default)
    }
}
