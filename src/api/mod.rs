//! HTTP surface for the metadata and session hosts.
//!
//! - [`client::ApiClient`] wraps `reqwest` and transparently re-authenticates
//!   against the session host.
//! - [`session::SessionClient`] implements [`SessionApi`] on top of it.
//! - [`models`] holds the wire records.

use async_trait::async_trait;
use regex::Regex;
use serde::de::DeserializeOwned;
use url::Url;

pub mod client;
pub mod models;
pub mod session;

use models::{FriendRecord, MatchInfo};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by the remote API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP transport failure.
    #[error("api request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Host answered with a non-success status.
    #[error("api returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized, truncated response body.
        body: String,
    },
    /// Body did not match the expected shape.
    #[error("api response parse error: {0}")]
    Parse(String),
    /// A configured or derived URL is unusable.
    #[error("invalid api url: {0}")]
    InvalidUrl(String),
}

// ---------------------------------------------------------------------------
// Session seam
// ---------------------------------------------------------------------------

/// Queries against the authenticated session host.
///
/// Implementations must be `Send + Sync`; the match handler calls them from
/// spawned tasks.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Fetch match details by match id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-success status or an
    /// unparseable body.
    async fn fetch_match(&self, match_id: &str) -> Result<MatchInfo, ApiError>;

    /// Fetch the friend list of a user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-success status or an
    /// unparseable body.
    async fn fetch_friends(&self, user_id: &str) -> Result<Vec<FriendRecord>, ApiError>;
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Check HTTP response status and return body text or a structured error.
///
/// # Errors
///
/// Returns `ApiError::Request` on transport failure, `ApiError::HttpStatus` on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

/// Check the status and decode the body as JSON.
///
/// # Errors
///
/// Everything [`check_http_response`] returns, plus `ApiError::Parse` when
/// the body does not deserialize into `T`.
pub async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let body = check_http_response(response).await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Parse a configured base URL.
///
/// # Errors
///
/// Returns `ApiError::InvalidUrl` if the string is not an absolute URL that
/// can carry a path.
pub fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl(format!("{raw}: not a base url")));
    }
    Ok(url)
}

/// Append percent-encoded path segments to a base URL.
///
/// # Errors
///
/// Returns `ApiError::InvalidUrl` if `base` cannot carry a path.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidUrl(format!("{base}: not a base url")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn sanitize_http_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    // Session cookies are echoed back by some error pages.
    let mut sanitized = collapsed;
    if let Ok(regex) = Regex::new(r"bhvrSession=[^;\s]+") {
        sanitized = regex
            .replace_all(&sanitized, "bhvrSession=[REDACTED]")
            .into_owned();
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}
