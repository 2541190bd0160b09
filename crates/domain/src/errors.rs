use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Content type not supported: {0}")]
    UnsupportedContentType(String),

    #[error("Question name invalid: {0}")]
    InvalidQuestionName(String),

    #[error("Question type invalid: {0}")]
    InvalidQuestionType(String),

    #[error("Question subnet invalid: {0}")]
    InvalidClientSubnet(String),

    #[error("Upstream server {server} unreachable: {reason}")]
    UpstreamUnreachable { server: String, reason: String },

    #[error("Relay to upstream failed: {0}")]
    RelayFailed(String),

    #[error("Failed to pack DNS answer: {0}")]
    PackingFailure(String),
}

impl DomainError {
    /// Errors caused by the request itself; retrying the same request cannot succeed.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedContentType(_)
                | Self::InvalidQuestionName(_)
                | Self::InvalidQuestionType(_)
                | Self::InvalidClientSubnet(_)
        )
    }
}
