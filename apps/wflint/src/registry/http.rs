//! Blocking HTTPS transport for the registry.

use super::{Transport, TransportError};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde_json::Value as Json;
use std::time::Duration;

const USER_AGENT: &str = concat!("wflint/", env!("CARGO_PKG_VERSION"));

pub struct HttpTransport {
    client: Client,
    token: Option<String>,
}

impl HttpTransport {
    /// Build a transport with a per-request timeout. A blank token is ignored.
    pub fn new(timeout: Duration, token: Option<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            client,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, url: &str) -> Result<Json, TransportError> {
        let mut req = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<Json>()
                .map_err(|e| TransportError::Decode(e.to_string()));
        }
        let remaining = resp
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok());
        Err(classify_status(status.as_u16(), remaining))
    }
}

/// Map a non-success status to its outcome.
///
/// GitHub answers an exhausted quota with 403 and `x-ratelimit-remaining: 0`
/// (secondary limits use 429); any other 403 is a permission problem.
pub fn classify_status(status: u16, ratelimit_remaining: Option<&str>) -> TransportError {
    match status {
        404 => TransportError::NotFound,
        401 => TransportError::Unauthorized,
        429 => TransportError::RateLimited,
        403 if ratelimit_remaining.map(str::trim) == Some("0") => TransportError::RateLimited,
        403 => TransportError::Unauthorized,
        other => TransportError::Status(other),
    }
}
