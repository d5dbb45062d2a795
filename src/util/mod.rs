//! Utility functions shared by the renderer and the network clients.
//!
//! - **Text metrics**: display width with East-Asian wide glyphs, truncation,
//!   padding and word wrapping
//! - **URL validation**: scheme and address checks before fetching or opening
//!
//! # Examples
//!
//! ```
//! use curak::util::{display_width, pad, truncate};
//!
//! assert_eq!(display_width("Hello 世界"), 10);
//! assert_eq!(truncate("Long article title", 10), "Long ar...");
//! assert_eq!(pad("ok", 4), "ok  ");
//! ```

mod text;
mod url_validator;

pub use text::{
    char_width, display_width, expand_tabs, fit, pad, strip_control_chars, truncate, wrap,
    TAB_WIDTH,
};
pub use url_validator::{validate_url, validate_url_for_open, UrlValidationError};
