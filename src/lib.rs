//! curak: a terminal dashboard for a curated reading list.
//!
//! Articles come from the curation service ([`api`]), full text from the
//! jina.ai reader ([`content`]). [`app::App`] holds the navigation state and
//! [`ui`] drives it from the terminal.

pub mod api;
pub mod app;
pub mod config;
pub mod content;
pub mod keybindings;
pub mod net;
pub mod theme;
pub mod ui;
pub mod util;
