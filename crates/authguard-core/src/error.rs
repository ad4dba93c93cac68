use thiserror::Error;

/// Errors surfaced by the guarded request wrapper.
#[derive(Error, Debug)]
pub enum GuardError {
    /// No usable access token and the refresh attempt failed.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The server rejected the access token and it could not be refreshed.
    #[error("Session expired")]
    SessionExpired,

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Failed to encode request body: {0}")]
    Json(#[from] serde_json::Error),
}

impl GuardError {
    /// True when the error was produced by the authentication flow rather
    /// than by the transport.
    pub fn is_auth(&self) -> bool {
        matches!(self, GuardError::NotAuthenticated | GuardError::SessionExpired)
    }
}

/// Errors from a token storage backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt token file: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),
}
