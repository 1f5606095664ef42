use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{info, warn};

use crate::http::Router;
use crate::layers::{catch_panic_layer, default_trace};
use crate::middleware::{apply_chain, AuthSettings, SharedRenderer};
use crate::session::{NoSessions, SessionResolver};
use crate::state::QuillState;
use crate::template::TemplateRenderer;

/// A shutdown hook that runs after the server stops accepting requests.
pub type ShutdownHook = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// Builder for assembling a Quill application.
///
/// Collects state, route tables, the session resolver and the template
/// renderer, then produces an `axum::Router` with the middleware chain,
/// request tracing and panic recovery wired around it.
///
/// ```ignore
/// AppBuilder::new(state)
///     .routes(handlers::routes()?)
///     .with_sessions(resolver)
///     .with_renderer(FileTemplates::new("templates"))
///     .on_stop(move || async move { db.close().await })
///     .serve("127.0.0.1:9000")
///     .await?;
/// ```
pub struct AppBuilder<S: QuillState, R: SessionResolver = NoSessions> {
    state: S,
    routes: Vec<Router<S>>,
    auth: AuthSettings<R>,
    renderer: SharedRenderer,
    shutdown_hooks: Vec<ShutdownHook>,
}

impl<S: QuillState> AppBuilder<S, NoSessions> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            routes: Vec::new(),
            auth: AuthSettings::new(NoSessions),
            renderer: None,
            shutdown_hooks: Vec::new(),
        }
    }
}

impl<S: QuillState, R: SessionResolver> AppBuilder<S, R> {
    /// Merge a route table into the application.
    pub fn routes(mut self, router: impl Into<Router<S>>) -> Self {
        self.routes.push(router.into());
        self
    }

    /// Resolve session cookies with `resolver`.
    pub fn with_sessions<R2: SessionResolver>(self, resolver: R2) -> AppBuilder<S, R2> {
        AppBuilder {
            state: self.state,
            routes: self.routes,
            auth: AuthSettings {
                resolver,
                admin_prefix: self.auth.admin_prefix,
                signin_path: self.auth.signin_path,
            },
            renderer: self.renderer,
            shutdown_hooks: self.shutdown_hooks,
        }
    }

    /// Paths under `prefix` require an admin user; others are redirected to `signin_path`.
    pub fn admin_area(mut self, prefix: impl Into<String>, signin_path: impl Into<String>) -> Self {
        self.auth.admin_prefix = prefix.into();
        self.auth.signin_path = signin_path.into();
        self
    }

    pub fn with_renderer(mut self, renderer: impl TemplateRenderer) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Register a hook to run after graceful shutdown completes.
    pub fn on_stop<F, Fut>(mut self, hook: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.shutdown_hooks.push(Box::new(move || Box::pin(hook())));
        self
    }

    /// Assemble the final `axum::Router`.
    pub fn build(self) -> Router {
        self.split().0
    }

    fn split(self) -> (Router, Vec<ShutdownHook>) {
        let routes = self
            .routes
            .into_iter()
            .fold(Router::new(), |merged, table| merged.merge(table));
        let app = apply_chain(routes.with_state(self.state), Arc::new(self.auth), self.renderer)
            .layer(default_trace())
            .layer(catch_panic_layer());
        (app, self.shutdown_hooks)
    }

    /// Bind `addr` and serve until Ctrl-C or SIGTERM, then run the
    /// `on_stop` hooks in registration order.
    pub async fn serve(self, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
        let (app, hooks) = self.split();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "listening");

        crate::http::serve(listener, app)
            .with_graceful_shutdown(stop_requested())
            .await?;

        info!(hooks = hooks.len(), "draining");
        for hook in hooks {
            hook().await;
        }
        Ok(())
    }
}

async fn stop_requested() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable, waiting for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("stop requested");
}
