use quill_core::http::response::{IntoResponse, Response};
use quill_core::http::StatusCode;

/// Reasons a session cookie is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The cookie does not have exactly three `-` separated parts.
    Malformed,

    /// The expiry part is not a number.
    InvalidExpiry(String),

    /// The expiry lies in the past.
    Expired,

    /// No user exists for the cookie's uid.
    UnknownUser(String),

    /// The signature does not match the user's stored password.
    DigestMismatch,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Malformed => write!(f, "Malformed session cookie"),
            SessionError::InvalidExpiry(raw) => write!(f, "Invalid session expiry: {raw}"),
            SessionError::Expired => write!(f, "Session expired"),
            SessionError::UnknownUser(uid) => write!(f, "Unknown session user: {uid}"),
            SessionError::DigestMismatch => write!(f, "Invalid session signature"),
        }
    }
}

impl std::error::Error for SessionError {}

impl SessionError {
    pub fn public_message(&self) -> &'static str {
        "Unauthorized"
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.public_message() });
        (StatusCode::UNAUTHORIZED, quill_core::http::Json(body)).into_response()
    }
}

impl From<SessionError> for quill_core::HttpError {
    fn from(err: SessionError) -> Self {
        quill_core::HttpError::Unauthorized(err.public_message().to_string())
    }
}
