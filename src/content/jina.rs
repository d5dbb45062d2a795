use super::ReaderContent;
use crate::net::{self, BaseUrlError, BodyError};
use crate::util::{expand_tabs, strip_control_chars, validate_url};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_READER_URL: &str = "https://r.jina.ai";

const MAX_CONTENT_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// CSS selectors targeting the main article body on common blog platforms.
/// More specific selectors first.
const TARGET_SELECTORS: &str =
    "article, .entry-content, .post-content, .article-content, .post-body, main .content, main";

/// Below this many bytes the selector is assumed to have missed the article
/// and the page is fetched again without it.
const MIN_CONTENT_LEN: usize = 200;

const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Request timed out after 20s")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid UTF-8 in response")]
    InvalidUtf8,
    #[error("Invalid article URL: {0}")]
    InvalidUrl(#[from] crate::util::UrlValidationError),
    #[error(transparent)]
    BaseUrl(#[from] BaseUrlError),
    #[error("No readable content found")]
    Empty,
}

impl ContentError {
    /// True for transient failures worth retrying.
    fn is_retryable(&self) -> bool {
        match self {
            ContentError::Timeout | ContentError::Network(_) => true,
            ContentError::HttpStatus(status) => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<BodyError> for ContentError {
    fn from(e: BodyError) -> Self {
        match e {
            BodyError::Network(e) => Self::Network(e),
            BodyError::TooLarge(n) => Self::ResponseTooLarge(n),
        }
    }
}

/// Client for the jina.ai reader, which turns a web page into plain text.
pub struct ContentClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<SecretString>,
    max_retries: u32,
}

impl ContentClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        api_key: Option<SecretString>,
    ) -> Result<Self, ContentError> {
        Ok(Self {
            http,
            base_url: net::parse_base_url(base_url)?,
            api_key,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Number of retries after a transient failure (backoff 1s, 2s, 4s, ...).
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// The API key is only sent to the official reader host.
    fn is_official(&self) -> bool {
        self.base_url.scheme() == "https" && self.base_url.host_str() == Some("r.jina.ai")
    }

    /// Fetches `url` through the reader service and returns its text.
    pub async fn extract(&self, url: &str) -> Result<ReaderContent, ContentError> {
        let target = validate_url(url)?;
        let reader_url = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            target.as_str()
        );

        let mut body = self.fetch_with_retry(&reader_url, true).await?;
        if body.len() < MIN_CONTENT_LEN {
            tracing::debug!(
                content_len = body.len(),
                "Target selector returned minimal content, retrying without selector"
            );
            body = self.fetch_with_retry(&reader_url, false).await?;
        }

        let content = parse_response(&body);
        if content.text_content.trim().is_empty() {
            return Err(ContentError::Empty);
        }
        tracing::debug!(url = %target, lines = content.text_content.lines().count(), "Extracted article");
        Ok(content)
    }

    async fn fetch_with_retry(&self, reader_url: &str, use_selector: bool) -> Result<String, ContentError> {
        let mut retry_count = 0;
        loop {
            match self.fetch(reader_url, use_selector).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && retry_count < self.max_retries => {
                    let delay = 1u64 << retry_count.min(5);
                    tracing::debug!(
                        error = %e,
                        retry = retry_count + 1,
                        delay_secs = delay,
                        "Retrying reader fetch after transient error"
                    );
                    tokio::time::sleep(Duration::from_secs(delay)).await;
                    retry_count += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch(&self, reader_url: &str, use_selector: bool) -> Result<String, ContentError> {
        let mut request = self.http.get(reader_url).header("X-Return-Format", "text");
        if use_selector {
            request = request.header("X-Target-Selector", TARGET_SELECTORS);
        }
        if let Some(key) = &self.api_key {
            if self.is_official() {
                request = request.bearer_auth(key.expose_secret());
            } else {
                tracing::debug!("Skipping reader API key for non-official base URL");
            }
        }

        let response = tokio::time::timeout(net::REQUEST_TIMEOUT, request.send())
            .await
            .map_err(|_| ContentError::Timeout)??;

        if !response.status().is_success() {
            return Err(ContentError::HttpStatus(response.status().as_u16()));
        }

        let bytes = net::read_limited(response, MAX_CONTENT_SIZE).await?;
        String::from_utf8(bytes).map_err(|_| ContentError::InvalidUtf8)
    }
}

/// Splits the reader's `Key: value` preamble from the body.
///
/// `Title:` becomes the title and `Published Time:` the byline. The body
/// starts after a `Markdown Content:`/`Text Content:` marker, or at the first
/// line that is not part of the preamble.
fn parse_response(body: &str) -> ReaderContent {
    let mut title = String::new();
    let mut byline = String::new();
    let mut body_start = 0;
    let mut offset = 0;

    for line in body.split_inclusive('\n') {
        let next = offset + line.len();
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with("URL Source:") {
            // skip
        } else if let Some(value) = trimmed.strip_prefix("Title:") {
            title = value.trim().to_string();
        } else if let Some(value) = trimmed.strip_prefix("Published Time:") {
            byline = format!("Published {}", value.trim());
        } else if trimmed == "Markdown Content:" || trimmed == "Text Content:" {
            body_start = next;
            break;
        } else {
            body_start = offset;
            break;
        }
        offset = next;
        body_start = next;
    }

    ReaderContent {
        title: expand_tabs(&strip_control_chars(&title)).into_owned(),
        byline: expand_tabs(&strip_control_chars(&byline)).into_owned(),
        text_content: clean_body(&body[body_start..]),
    }
}

/// Navigation and comment-form remnants the reader service leaves in.
fn is_boilerplate(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("[Skip to content]")
        || trimmed == "Loading Comments..."
        || trimmed == "Write a Comment..."
        || trimmed.starts_with("Email (Required)")
        || trimmed.contains("Proudly powered by WordPress")
        || trimmed == "Menu"
}

/// Drops boilerplate and control characters, trims trailing whitespace and
/// collapses runs of blank lines to one.
fn clean_body(body: &str) -> String {
    let stripped = strip_control_chars(body);
    let expanded = expand_tabs(&stripped);
    let mut out: Vec<&str> = Vec::new();
    for line in expanded.lines().filter(|l| !is_boilerplate(l)) {
        let line = line.trim_end();
        if line.is_empty() && out.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}
