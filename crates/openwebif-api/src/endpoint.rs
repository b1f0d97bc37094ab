// Device endpoint description and base-URL derivation.

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::Error;

/// Where a box lives on the network and how to authenticate with it.
///
/// Immutable after construction. When `use_auth` is set the credentials
/// are embedded in the URL userinfo section, which reqwest translates
/// into a basic-auth header -- the same scheme the OpenWebif web
/// interface itself uses.
#[derive(Debug, Clone)]
pub struct DeviceEndpoint {
    pub host: String,
    pub port: u16,
    pub use_auth: bool,
    pub username: String,
    pub password: SecretString,
}

impl DeviceEndpoint {
    /// An unauthenticated endpoint.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            use_auth: false,
            username: String::new(),
            password: SecretString::from(String::new()),
        }
    }

    /// An endpoint with URL-embedded credentials.
    pub fn with_auth(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            use_auth: true,
            username: username.into(),
            password,
        }
    }

    /// Derive the base URL for this endpoint.
    pub fn base_url(&self) -> Result<Url, Error> {
        let raw = if self.use_auth {
            format!(
                "http://{}:{}@{}:{}/",
                self.username,
                self.password.expose_secret(),
                self.host,
                self.port
            )
        } else {
            format!("http://{}:{}/", self.host, self.port)
        };
        Ok(Url::parse(&raw)?)
    }
}
