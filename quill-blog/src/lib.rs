//! A small blog CMS: users, blogs and comments served over Quill.
//!
//! [`application`] wires the route table, the `awesession` cookie resolver
//! and the file template renderer into an [`AppBuilder`]; `main.rs` only adds
//! configuration and the listener. Templates get a `datetime` filter showing
//! a Unix timestamp as a relative age.

pub mod handlers;
pub mod models;
pub mod render;
pub mod session;
pub mod state;

use std::path::PathBuf;

use quill_core::{AppBuilder, FileTemplates, SignatureError};

use crate::models::now;
use crate::render::datetime_filter;

pub use session::BlogSessions;
pub use state::AppState;

/// Assemble the blog application over `state`, reading page templates from
/// `templates`.
pub fn application(
    state: AppState,
    templates: impl Into<PathBuf>,
) -> Result<AppBuilder<AppState, BlogSessions>, SignatureError> {
    let sessions = state.session_resolver();
    let templates = FileTemplates::new(templates.into()).configure(|env| {
        env.add_filter("datetime", |t: f64| datetime_filter(t, now()));
    });
    Ok(AppBuilder::new(state)
        .routes(handlers::routes()?)
        .with_sessions(sessions)
        .admin_area("/manage/", "/signin")
        .with_renderer(templates))
}
