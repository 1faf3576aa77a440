use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;

/// Errors that can occur during external service communication
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// Credentials or endpoint missing from configuration
    #[error("{0}")]
    NotConfigured(String),
    /// Upstream answered with a non-success status
    #[error("{service} API error ({status}): {body}")]
    HttpError {
        service: &'static str,
        status: u16,
        body: String,
    },
    /// Service unreachable or timeout
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Invalid response format from external service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// Authentication error (401/403)
    #[error("{0}")]
    Unauthorized(String),
    /// Not found (404)
    #[error("{0}")]
    NotFound(String),
    /// Rate limited or exceeded quota
    #[error("Rate limited: {0}")]
    RateLimited(String),
    /// The caller handed us something we cannot use
    #[error("{0}")]
    InvalidInput(String),
    /// Internal error in connector
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConnectorError {
    /// Classify a non-success upstream response.
    pub fn from_status(service: &'static str, status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized(format!("{} rejected the credentials: {}", service, body)),
            404 => Self::NotFound(format!("{} resource not found: {}", service, body)),
            429 => Self::RateLimited(format!("{}: {}", service, body)),
            status => Self::HttpError {
                service,
                status,
                body,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "not_configured",
            Self::HttpError { .. } => "upstream",
            Self::ServiceUnavailable(_) => "unavailable",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::RateLimited(_) => "rate_limited",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

impl ResponseError for ConnectorError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::HttpError { .. } => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            Self::Unauthorized(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::ServiceUnavailable(format!("Request timeout: {}", err))
        } else if err.is_connect() {
            Self::ServiceUnavailable(format!("Connection failed: {}", err))
        } else {
            Self::Internal(err.to_string())
        }
    }
}
