// ── Core error types ──
//
// User-facing errors from openwebif-core. Consumers never see reqwest
// errors or JSON parse failures directly -- the `From<openwebif_api::Error>`
// impl translates transport-layer errors into domain-appropriate variants.

use thiserror::Error;

use crate::persist::PersistError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach device at {host}: {reason}")]
    ConnectionFailed { host: String, reason: String },

    #[error("Device request timed out")]
    Timeout,

    #[error("Session closed")]
    SessionClosed,

    // ── Contract errors ──────────────────────────────────────────────
    /// A channel identifier outside the configured range. This is a
    /// caller bug, not a runtime condition -- identifiers handed to the
    /// framework are always derived from the registry.
    #[error("Channel identifier {identifier} out of range (configured channels: {count})")]
    ChannelOutOfRange { identifier: usize, count: usize },

    #[error("Operation not supported: {operation}")]
    Unsupported { operation: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Device API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Persistence errors ───────────────────────────────────────────
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistError),

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<openwebif_api::Error> for CoreError {
    fn from(err: openwebif_api::Error) -> Self {
        match err {
            openwebif_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        host: e
                            .url()
                            .and_then(|u| u.host_str().map(ToOwned::to_owned))
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            openwebif_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            openwebif_api::Error::Http { status } => CoreError::Api {
                message: format!("device returned HTTP {status}"),
                status: Some(status),
            },
            openwebif_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
