pub use axum::http::header::{
    HeaderName, HeaderValue, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE,
};
pub use axum::http::request::Parts;
pub use axum::http::{HeaderMap, Method, StatusCode, Uri};

/// Content types emitted by reply normalization.
pub const TEXT_HTML_UTF8: &str = "text/html;charset=utf-8";
pub const TEXT_PLAIN_UTF8: &str = "text/plain;charset=utf-8";
pub const APPLICATION_JSON_UTF8: &str = "application/json;charset=utf-8";
pub const OCTET_STREAM: &str = "application/octet-stream";
