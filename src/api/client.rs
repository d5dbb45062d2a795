use super::{Article, ArticlesResponse};
use crate::net::{self, BaseUrlError, BodyError};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://curaq.app";

/// Articles requested per refresh.
pub const PAGE_SIZE: u32 = 100;

const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out after 20s")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid or expired API token")]
    Unauthorized,
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    BaseUrl(#[from] BaseUrlError),
}

impl From<BodyError> for ApiError {
    fn from(e: BodyError) -> Self {
        match e {
            BodyError::Network(e) => Self::Network(e),
            BodyError::TooLarge(n) => Self::ResponseTooLarge(n),
        }
    }
}

/// Authenticated client for the article service.
///
/// The token is held as a `SecretString` and only exposed when building the
/// `Authorization` header.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: SecretString,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: &str, token: SecretString) -> Result<Self, ApiError> {
        Ok(Self {
            http,
            base_url: net::parse_base_url(base_url)?,
            token,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::BaseUrl(BaseUrlError::Insecure))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let request = request.bearer_auth(self.token.expose_secret());
        let response = tokio::time::timeout(net::REQUEST_TIMEOUT, request.send())
            .await
            .map_err(|_| ApiError::Timeout)??;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }
        Ok(response)
    }

    /// `GET /api/v1/articles?page=N&limit=M`
    pub async fn list_articles(&self, page: u32, page_size: u32) -> Result<Vec<Article>, ApiError> {
        let mut url = self.endpoint(&["api", "v1", "articles"])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &page_size.to_string());

        tracing::debug!(page, page_size, "Fetching article list");
        let response = self.send(self.http.get(url)).await?;
        let body = net::read_limited(response, MAX_RESPONSE_SIZE).await?;
        let parsed: ArticlesResponse = serde_json::from_slice(&body)?;

        let raw = parsed.articles.unwrap_or_default();
        let total = raw.len();
        let articles: Vec<Article> = raw.into_iter().filter_map(|a| a.into_article()).collect();
        if articles.len() != total {
            tracing::warn!(
                dropped = total - articles.len(),
                "Skipped articles with unusable ids"
            );
        }
        tracing::info!(count = articles.len(), "Loaded articles");
        Ok(articles)
    }

    /// `POST /api/v1/articles/{id}/read`
    pub async fn mark_read(&self, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "v1", "articles", id, "read"])?;
        tracing::debug!(article_id = %id, "Marking article read");
        self.send(self.http.post(url)).await?;
        Ok(())
    }
}
