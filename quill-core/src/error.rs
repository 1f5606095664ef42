use serde::Serialize;

use crate::http::response::{IntoResponse, Response};
use crate::http::{Json, StatusCode};

/// Transport-level failure, answered with a non-2xx status and an
/// `{"error": message}` body.
pub enum HttpError {
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Internal(String),
    /// Explicit status with a caller-supplied JSON body.
    Custom {
        status: StatusCode,
        body: serde_json::Value,
    },
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HttpError::Forbidden(_) => StatusCode::FORBIDDEN,
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::Custom { status, .. } => *status,
        }
    }

    fn message(&self) -> Option<&str> {
        match self {
            HttpError::NotFound(msg)
            | HttpError::Unauthorized(msg)
            | HttpError::Forbidden(msg)
            | HttpError::BadRequest(msg)
            | HttpError::Internal(msg) => Some(msg),
            HttpError::Custom { .. } => None,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        }
        let body = match self {
            HttpError::Custom { body, .. } => body,
            other => serde_json::json!({ "error": other.message().unwrap_or_default() }),
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.status();
        match (self, self.message()) {
            (_, Some(msg)) => write!(f, "{status}: {msg}"),
            (HttpError::Custom { body, .. }, None) => write!(f, "{status}: {body}"),
            _ => write!(f, "{status}"),
        }
    }
}

impl std::fmt::Debug for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for HttpError {}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        HttpError::Internal(err.to_string())
    }
}

/// Domain-level API failure, returned to clients as a `200` JSON payload
/// `{"error": code, "data": field, "message": text}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub error: String,
    pub data: String,
    pub message: String,
}

impl ApiError {
    pub fn new(
        error: impl Into<String>,
        data: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            data: data.into(),
            message: message.into(),
        }
    }

    /// `value:invalid` for the named input field.
    pub fn value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new("value:invalid", field, message)
    }

    /// `value:notfound` for the named resource.
    pub fn not_found(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new("value:notfound", resource, message)
    }

    /// `permission:forbidden`.
    pub fn permission(message: impl Into<String>) -> Self {
        Self::new("permission:forbidden", "permission", message)
    }

    pub fn payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.error,
            "data": self.data,
            "message": self.message,
        })
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.error, self.data, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        crate::reply::Reply::Json(self.payload()).into_response()
    }
}

/// Error type returned by bound handlers.
#[derive(Debug)]
pub enum HandlerError {
    /// Converted into an `{error, data, message}` payload.
    Api(ApiError),
    /// Rendered as a non-2xx JSON response.
    Http(HttpError),
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerError::Api(e) => write!(f, "{e}"),
            HandlerError::Http(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for HandlerError {}

impl From<ApiError> for HandlerError {
    fn from(err: ApiError) -> Self {
        HandlerError::Api(err)
    }
}

impl From<HttpError> for HandlerError {
    fn from(err: HttpError) -> Self {
        HandlerError::Http(err)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::Http(err.into())
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::Api(e) => e.into_response(),
            HandlerError::Http(e) => e.into_response(),
        }
    }
}
