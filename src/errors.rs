use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend answered with a non-success status.
    #[error("{message}")]
    Api { status: StatusCode, message: String },
    /// No response was obtained.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// The refresh this caller was waiting on failed; the stored session is gone.
    #[error("session expired, please log in again")]
    SessionExpired,
    /// The caller leading a refresh was dropped before it could resolve.
    #[error("token refresh was interrupted")]
    RefreshInterrupted,
    #[error("expected a response body but the server returned no content")]
    EmptyResponse,
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status carried by an API error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}
