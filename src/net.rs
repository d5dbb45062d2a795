//! HTTP plumbing shared by the article API and the reader service clients.
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Per-request timeout for both services.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum BaseUrlError {
    #[error("Invalid base URL: {0}")]
    Invalid(#[from] url::ParseError),
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    Insecure,
}

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Response too large (exceeds {0} bytes)")]
    TooLarge(usize),
}

/// Builds the HTTP client used by every collaborator.
pub fn build_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("curak/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(10))
        .build()
}

/// Parses a service base URL, requiring HTTPS unless it points at the local
/// machine (mock servers in tests). A trailing slash is dropped.
pub fn parse_base_url(base: &str) -> Result<Url, BaseUrlError> {
    let url = Url::parse(base.trim_end_matches('/'))?;
    match url.scheme() {
        "https" => Ok(url),
        "http" if matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]")) => {
            tracing::warn!(base_url = %url, "Using non-HTTPS base URL (localhost only)");
            Ok(url)
        }
        _ => {
            tracing::error!(base_url = %base, "Rejecting non-HTTPS base URL");
            Err(BaseUrlError::Insecure)
        }
    }
}

/// Reads a response body, refusing anything larger than `limit` bytes.
pub async fn read_limited(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, BodyError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(BodyError::TooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(BodyError::TooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_https_base_accepted() {
        let url = parse_base_url("https://curaq.app/").unwrap();
        assert_eq!(url.as_str(), "https://curaq.app/");
    }

    #[test]
    fn test_plain_http_rejected_except_localhost() {
        assert!(matches!(
            parse_base_url("http://evil.example"),
            Err(BaseUrlError::Insecure)
        ));
        assert!(parse_base_url("http://127.0.0.1:8080").is_ok());
        assert!(parse_base_url("http://localhost:3000").is_ok());
    }

    #[test]
    fn test_garbage_base_rejected() {
        assert!(matches!(
            parse_base_url("not a url"),
            Err(BaseUrlError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_read_limited_enforces_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let response = client.get(server.uri()).send().await.unwrap();
        assert!(matches!(
            read_limited(response, 16).await,
            Err(BodyError::TooLarge(16))
        ));

        let response = client.get(server.uri()).send().await.unwrap();
        assert_eq!(read_limited(response, 64).await.unwrap().len(), 64);
    }
}
