// Shared transport configuration for building reqwest::Client instances.
//
// OpenWebif speaks plaintext HTTP on the local network, so there is no
// TLS story here -- just timeout and identification.

use std::time::Duration;

/// Transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent("zapbridge/0.1.0")
            .build()?;
        Ok(client)
    }
}
