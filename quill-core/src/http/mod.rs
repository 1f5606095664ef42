//! The HTTP vocabulary used across Quill, re-exported from axum so handler
//! crates do not need a direct axum dependency.

pub mod header;

pub use axum::body::Body;
pub use axum::{serve, Extension, Json, Router};
pub use bytes::Bytes;

pub use self::header::{
    HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, CONTENT_TYPE, COOKIE, LOCATION,
    SET_COOKIE,
};

pub mod extract {
    pub use axum::extract::{
        FromRequest, FromRequestParts, Multipart, Path, Query, RawPathParams, Request, State,
    };
}

pub mod response {
    pub use axum::response::{Html, IntoResponse, Response};
}

pub mod middleware {
    pub use axum::middleware::{from_fn, from_fn_with_state, Next};
}
