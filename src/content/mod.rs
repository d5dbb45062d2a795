//! Readable-text extraction for the reader overlay.

mod jina;

pub use jina::{ContentClient, ContentError, DEFAULT_READER_URL};

/// Extracted article text, ready to wrap and display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReaderContent {
    pub title: String,
    /// Author or publication line. Empty when the service did not report one.
    pub byline: String,
    /// Newline-delimited plain text.
    pub text_content: String,
}
