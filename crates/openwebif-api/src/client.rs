// OpenWebif HTTP client
//
// Wraps `reqwest::Client` with box-specific URL construction and JSON
// parsing. All endpoint groups (status, services, control) are
// implemented as inherent methods via separate files to keep this
// module focused on transport mechanics.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::endpoint::DeviceEndpoint;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for a single OpenWebif box.
///
/// Every call is a fresh GET round trip -- no caching, no retries.
/// Failures come back as [`Error`] for the caller to interpret.
pub struct OpenWebifClient {
    http: reqwest::Client,
    base_url: Url,
}

impl OpenWebifClient {
    /// Create a client for the given endpoint.
    pub fn new(endpoint: &DeviceEndpoint, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = endpoint.base_url()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Used by tests to point the client at a mock server.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The device base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Url {
        self.base_url
            .join(&format!("api/{path}"))
            .expect("invalid API URL")
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and parse the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url.path());

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
