use thiserror::Error;

/// Top-level relay error.
/// All variants carry a human-readable message for display/logging.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Invalid request ──────────────────────────────────────────────────────
    #[error("Field '{field_name}' cannot be empty")]
    EmptyField { field_name: String },

    #[error("Field '{field_name}' exceeds max length of {max_length} characters (actual: {actual_length})")]
    FieldTooLong { field_name: String, max_length: usize, actual_length: usize },

    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },

    // ── Upstream generation API ──────────────────────────────────────────────
    #[error("Generation API unreachable at {host}: {message}")]
    UpstreamUnavailable { host: String, message: String },

    #[error("Generation API returned status {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("Generation API returned an unexpected response: {message}")]
    MalformedUpstreamResponse { message: String },

    // ── System errors ────────────────────────────────────────────────────────
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn empty_field(field_name: impl Into<String>) -> Self {
        AppError::EmptyField { field_name: field_name.into() }
    }

    pub fn malformed_upstream(message: impl Into<String>) -> Self {
        AppError::MalformedUpstreamResponse { message: message.into() }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::EmptyField { .. }
                | AppError::FieldTooLong { .. }
                | AppError::MalformedRequest { .. }
        )
    }

    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AppError::UpstreamUnavailable { .. }
                | AppError::UpstreamStatus { .. }
                | AppError::MalformedUpstreamResponse { .. }
        )
    }

    pub fn is_upstream_unavailable(&self) -> bool {
        matches!(self, AppError::UpstreamUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_request_and_upstream_errors() {
        let empty = AppError::empty_field("message");
        assert!(empty.is_validation());
        assert!(!empty.is_upstream());

        let down = AppError::UpstreamUnavailable {
            host: "http://localhost:1".into(),
            message: "connection refused".into(),
        };
        assert!(down.is_upstream());
        assert!(down.is_upstream_unavailable());

        let bad = AppError::malformed_upstream("no candidates");
        assert!(bad.is_upstream());
        assert!(!bad.is_upstream_unavailable());
        assert!(!bad.is_validation());
    }

    #[test]
    fn messages_are_human_readable() {
        let err = AppError::FieldTooLong {
            field_name: "message".into(),
            max_length: 500,
            actual_length: 612,
        };
        assert_eq!(
            err.to_string(),
            "Field 'message' exceeds max length of 500 characters (actual: 612)"
        );
    }
}
