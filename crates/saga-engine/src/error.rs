use saga_backend::BackendError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
