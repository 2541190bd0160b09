use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use ferrous_doh_domain::DomainError;
use tracing::error;

/// Failure of a `/resolve` request, by the stage that failed.
#[derive(Debug)]
pub enum DohError {
    /// The `Accept` header names a media type other than the DoH one.
    UnsupportedContentType(String),
    /// The query string itself could not be decoded.
    MalformedParameters(String),
    /// The query parameters could not be turned into a DNS query.
    BadRequest(DomainError),
    /// Relaying upstream or packing the answer failed.
    Upstream(DomainError),
}

impl From<DomainError> for DohError {
    fn from(err: DomainError) -> Self {
        if err.is_request_error() {
            Self::BadRequest(err)
        } else {
            Self::Upstream(err)
        }
    }
}

impl DohError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedContentType(_) => StatusCode::FORBIDDEN,
            Self::MalformedParameters(_) | Self::BadRequest(_) => StatusCode::BAD_GATEWAY,
            Self::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            Self::UnsupportedContentType(_) => "request content type not supported.",
            Self::MalformedParameters(_) | Self::BadRequest(_) => {
                "get message from request failed."
            }
            Self::Upstream(_) => "error when querying upstream.",
        }
    }
}

impl IntoResponse for DohError {
    fn into_response(self) -> Response {
        match &self {
            Self::UnsupportedContentType(accept) => {
                error!(accept = %accept, "request content type not supported")
            }
            Self::MalformedParameters(reason) => {
                error!(reason = %reason, "get message from request failed")
            }
            Self::BadRequest(e) => error!(error = %e, "get message from request failed"),
            Self::Upstream(e) => error!(error = %e, "error when querying upstream"),
        }

        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.body(),
        )
            .into_response()
    }
}
