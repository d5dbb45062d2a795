//! Terminal user interface.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Key dispatch into the controller
//! - `events` - Background task completions
//! - `helpers` - Effect execution and task spawning
//! - `render` - Screen composition into a styled character grid
//! - `frame` - Box-drawing panels and side-by-side joins
//! - `layout` - Screen geometry
//! - `viewport` - List windowing
//! - `scroll` - Reader scroll arithmetic

mod events;
pub mod frame;
mod helpers;
mod input;
pub mod layout;
mod loop_runner;
pub mod render;
pub mod scroll;
pub mod viewport;

pub use events::handle_app_event;
pub use helpers::{Services, NO_TOKEN_MESSAGE};
pub use loop_runner::{run, LoopControl};
