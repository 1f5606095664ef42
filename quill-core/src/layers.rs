//! Tower layers wrapped around every Quill router, and the tracing setup.

use std::any::Any;

use tower_http::catch_panic::CatchPanicLayer;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::error::HttpError;
use crate::http::response::{IntoResponse, Response};

const DEFAULT_FILTER: &str = "info,tower_http=debug";

type PanicHandler = fn(Box<dyn Any + Send>) -> Response;

/// Install the `fmt` subscriber, filtered by `RUST_LOG` or `info,tower_http=debug`.
/// A subscriber installed earlier (by a test harness, say) is left in place.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub fn default_trace() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

/// A panicking handler answers `500 {"error": "Internal server error"}`.
pub fn catch_panic_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(on_panic as PanicHandler)
}

fn on_panic(payload: Box<dyn Any + Send>) -> Response {
    let detail = match payload.downcast::<String>() {
        Ok(text) => *text,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "non-string panic payload".to_string()),
    };
    tracing::error!(panic = %detail, "handler panicked");
    HttpError::Internal("Internal server error".into()).into_response()
}
