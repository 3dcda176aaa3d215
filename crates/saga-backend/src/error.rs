use thiserror::Error;

/// Failure modes of the backend transport.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Network-level failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend rejected the request ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// The event stream failed after being established.
    #[error("stream error: {0}")]
    Stream(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        BackendError::Transport(e.to_string())
    }
}
