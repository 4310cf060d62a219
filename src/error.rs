use thiserror::Error;

/// Error taxonomy for the aggregation layer.
///
/// No variant is ever retried automatically; every failure propagates to the
/// caller as a single descriptive value.
#[derive(Debug, Error)]
pub enum BetfairError {
    /// Invalid per-request configuration. Raised before any network call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Login rejected by the identity endpoint.
    #[error("Betfair login failed ({status}): {body}")]
    Authentication { status: u16, body: String },

    /// Non-success response from a data call, including an application error
    /// embedded in an otherwise-200 JSON-RPC response.
    #[error("Betfair API error ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// Network-level failure from the HTTP client.
    #[error("Transport error: {message}")]
    Transport { message: String },
}

impl From<reqwest::Error> for BetfairError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("{} (timed out waiting for Betfair; check your internet connection)", err)
        } else {
            err.to_string()
        };
        BetfairError::Transport { message }
    }
}

pub type Result<T> = std::result::Result<T, BetfairError>;
