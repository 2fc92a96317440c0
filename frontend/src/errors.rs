use thiserror::Error;

/// Everything that can go wrong on the client side. None of these are fatal:
/// each one ends up as a failed bubble or a transient notice.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("Message cannot be empty")]
    InvalidRequest,

    #[error("{0}")]
    Upstream(String),

    #[error("Speech input failed: {0}")]
    Capture(String),

    #[error("Speech output failed: {0}")]
    Playback(String),

    #[error("Copy failed: {0}")]
    Clipboard(String),
}
