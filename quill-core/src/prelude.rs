//! Quill prelude: import the handler-facing API with a single `use`.
//!
//! ```ignore
//! use quill_core::prelude::*;
//!
//! pub fn routes() -> Result<Routes<AppState>, SignatureError> {
//!     Ok(Routes::new()
//!         .get("/api/blogs/{id}", Signature::builder().positional("id").build()?, api_get_blog))
//! }
//! ```

pub use crate::binder::{Args, RequestContext, Routes, Signature, SignatureError};
pub use crate::builder::AppBuilder;
pub use crate::config::{ConfigError, ConfigProperties, QuillConfig, ServerConfig};
pub use crate::error::{ApiError, HandlerError, HttpError};
pub use crate::reply::Reply;
pub use crate::session::{CurrentUser, Identity, SessionResolver};
pub use crate::template::{FileTemplates, TemplateRenderer};
pub use crate::types::{ApiResult, ReplyResult};

pub use crate::http::header::{HeaderValue, SET_COOKIE};
pub use crate::http::response::{IntoResponse, Response};
pub use crate::http::{Json, Router, StatusCode};
