use thiserror::Error;

/// Error taxonomy for gateway operations.
///
/// Gateway error bodies pass through unmodified in [`GatewayError::Rejected`];
/// this client performs no retry loops of its own (the single exception is
/// the one key-refresh-and-retry on an encryption rejection). Retry policy
/// belongs to the caller.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("integration not configured: {0}")]
    ConfigNotFound(String),

    #[error("gateway access token exchange failed: {0}")]
    AuthFailed(String),

    #[error("payload encryption failed: {0}")]
    Encryption(String),

    #[error("gateway rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("gateway request timed out: {0}")]
    Timeout(String),

    #[error("unexpected gateway response: {0}")]
    InvalidResponse(String),

    #[error("invalid parameters: {0}")]
    Validation(String),

    #[error("network error calling gateway: {0}")]
    Network(String),
}

impl GatewayError {
    /// Map a transport failure, keeping timeouts as their own kind so callers
    /// can choose to retry at a higher level.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout(err.to_string())
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for GatewayError {
    fn from(err: validator::ValidationErrors) -> Self {
        GatewayError::Validation(err.to_string())
    }
}
