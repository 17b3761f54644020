//! HTTP transport with transparent guest re-authentication.
//!
//! Every request goes through [`ApiClient::execute`]. When the session host
//! answers `403 Forbidden`, the client logs in as a guest and re-sends the
//! original request, for at most [`MAX_ATTEMPTS`] sends in total. Requests
//! to any other host, and any other status, pass through untouched.

use reqwest::{Method, Request, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use super::{endpoint, ApiError};

/// Upper bound on sends of one request, including the first.
pub const MAX_ATTEMPTS: u32 = 3;

/// Guest login path on the session host.
const GUEST_LOGIN_PATH: [&str; 5] = ["api", "v1", "auth", "login", "guest"];

/// Consent id the guest login endpoint expects.
const GUEST_CONSENT_ID: &str = "2";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GuestLogin<'a> {
    client_data: ClientData<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientData<'a> {
    consent_id: &'a str,
}

/// `reqwest` wrapper that keeps a guest session alive on the session host.
///
/// The session is carried in a cookie, so the underlying client keeps a
/// cookie store and a successful guest login is picked up by the retried
/// request automatically.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    session_base: Url,
}

impl ApiClient {
    /// Create a client whose re-authentication applies to `session_base`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Request` if the HTTP client cannot be built.
    pub fn new(session_base: Url) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, session_base })
    }

    /// Base URL of the authenticated session host.
    pub fn session_base(&self) -> &Url {
        &self.session_base
    }

    /// Send `GET url` through the re-authenticating transport.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Request` on transport failure.
    pub async fn get(&self, url: Url) -> Result<Response, ApiError> {
        self.execute(Request::new(Method::GET, url)).await
    }

    /// Send a request, re-authenticating and re-sending on `403` from the
    /// session host.
    ///
    /// The response is returned as-is once it is not a session-host `403`,
    /// once [`MAX_ATTEMPTS`] sends have been made, or once a guest login
    /// fails. Callers must check the status.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Request` on transport failure of any send.
    pub async fn execute(&self, request: Request) -> Result<Response, ApiError> {
        let targets_session = self.targets_session_host(request.url());
        let mut request = request;
        let mut attempt: u32 = 1;

        loop {
            // Bodies that cannot be cloned are sent once.
            let retry = if targets_session && attempt < MAX_ATTEMPTS {
                request.try_clone()
            } else {
                None
            };

            let response = self.http.execute(request).await?;
            if !targets_session || response.status() != StatusCode::FORBIDDEN {
                return Ok(response);
            }

            let Some(next) = retry else {
                debug!(attempt, url = %response.url(), "session still forbidden, giving up");
                return Ok(response);
            };

            if !self.refresh_auth().await {
                return Ok(response);
            }

            debug!(attempt, url = %next.url(), "re-sending after guest login");
            request = next;
            attempt = attempt.saturating_add(1);
        }
    }

    /// Obtain a fresh guest session from the session host.
    ///
    /// Returns `true` when the host answered `200 OK`. Transport failures are
    /// logged and reported as `false`.
    pub async fn refresh_auth(&self) -> bool {
        let url = match endpoint(&self.session_base, &GUEST_LOGIN_PATH) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "cannot build guest login url");
                return false;
            }
        };

        let body = GuestLogin {
            client_data: ClientData {
                consent_id: GUEST_CONSENT_ID,
            },
        };

        match self.http.post(url).json(&body).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                debug!("guest login succeeded");
                true
            }
            Ok(response) => {
                warn!(status = response.status().as_u16(), "guest login rejected");
                false
            }
            Err(e) => {
                warn!(error = %e, "guest login failed");
                false
            }
        }
    }

    fn targets_session_host(&self, url: &Url) -> bool {
        url.host_str() == self.session_base.host_str()
            && url.port_or_known_default() == self.session_base.port_or_known_default()
    }
}
