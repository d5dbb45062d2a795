//! Client for the remote article service.
//!
//! Exposes the two calls the dashboard needs: listing a page of articles and
//! marking one as read. Everything coming off the wire is sanitized before it
//! becomes an [`Article`].

mod client;

pub use client::{ApiClient, ApiError, DEFAULT_API_URL, PAGE_SIZE};

use crate::util::{expand_tabs, strip_control_chars};
use serde::Deserialize;

/// An article in the working set. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub url: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub reading_time_minutes: u32,
}

/// Wire shape. Every field but `id` may be missing or null.
#[derive(Debug, Deserialize)]
pub(crate) struct RawArticle {
    id: serde_json::Value,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    reading_time_minutes: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArticlesResponse {
    #[serde(default)]
    pub articles: Option<Vec<RawArticle>>,
}

fn clean(s: Option<String>) -> String {
    s.map(|s| expand_tabs(&strip_control_chars(s.trim())).into_owned())
        .unwrap_or_default()
}

impl RawArticle {
    /// `None` when the id is neither a string nor a number.
    pub(crate) fn into_article(self) -> Option<Article> {
        let id = match self.id {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let title = clean(self.title);
        Some(Article {
            title: if title.is_empty() {
                "(untitled)".to_string()
            } else {
                title
            },
            url: clean(self.url),
            summary: clean(self.summary),
            tags: self
                .tags
                .unwrap_or_default()
                .into_iter()
                .map(|t| clean(Some(t)))
                .filter(|t| !t.is_empty())
                .collect(),
            reading_time_minutes: self.reading_time_minutes.unwrap_or(0),
            id,
        })
    }
}
