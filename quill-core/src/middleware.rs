//! The request middleware chain, outermost first:
//!
//! 1. [`log_request`]: method and path.
//! 2. [`parse_body`]: JSON or urlencoded POST bodies parsed once into [`ParsedBody`].
//! 3. [`authenticate`]: session cookie to [`CurrentUser`], admin-area gate.
//! 4. [`render_response`]: template replies rendered with `__user__` injected.

use std::sync::Arc;

use tracing::{debug, info};

use crate::binder::{parse_pairs, MAX_BODY_BYTES};
use crate::error::HttpError;
use crate::http::extract::{Request, State};
use crate::http::header::{HeaderValue, Method, CONTENT_TYPE, COOKIE, TEXT_HTML_UTF8};
use crate::http::middleware::{from_fn, from_fn_with_state, Next};
use crate::http::response::{IntoResponse, Response};
use crate::http::{Body, Router, StatusCode};
use crate::reply::{PendingTemplate, Reply, USER_KEY};
use crate::session::{find_cookie, CurrentUser, Identity, SessionResolver, UserView};
use crate::template::TemplateRenderer;

/// A POST body already parsed by [`parse_body`].
#[derive(Debug, Clone)]
pub struct ParsedBody(pub serde_json::Map<String, serde_json::Value>);

/// Settings for [`authenticate`].
pub struct AuthSettings<R> {
    pub resolver: R,
    /// Paths under this prefix need an admin user.
    pub admin_prefix: String,
    /// Where rejected admin-area requests are sent.
    pub signin_path: String,
}

impl<R> AuthSettings<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            admin_prefix: "/manage/".into(),
            signin_path: "/signin".into(),
        }
    }
}

pub type SharedRenderer = Option<Arc<dyn TemplateRenderer>>;

pub async fn log_request(req: Request, next: Next) -> Response {
    info!("Request: {} {}", req.method(), req.uri().path());
    next.run(req).await
}

pub async fn parse_body(req: Request, next: Next) -> Response {
    if req.method() != Method::POST {
        return next.run(req).await;
    }
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_lowercase)
        .unwrap_or_default();
    let is_json = content_type.starts_with("application/json");
    let is_form = content_type.starts_with("application/x-www-form-urlencoded");
    if !is_json && !is_form {
        return next.run(req).await;
    }

    let (mut parts, body) = req.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => return HttpError::BadRequest(e.to_string()).into_response(),
    };
    let parsed = if is_json {
        match serde_json::from_slice(&bytes) {
            Ok(serde_json::Value::Object(map)) => Some(map),
            // left for the binder to reject
            _ => None,
        }
    } else {
        Some(parse_pairs(&bytes))
    };
    if let Some(map) = parsed {
        debug!(fields = ?map.keys().collect::<Vec<_>>(), "request body parsed");
        parts.extensions.insert(ParsedBody(map));
    }
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

pub async fn authenticate<R: SessionResolver>(
    State(settings): State<Arc<AuthSettings<R>>>,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie_name = settings.resolver.cookie_name();
    let cookie = if cookie_name.is_empty() {
        None
    } else {
        req.headers()
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|header| find_cookie(header, cookie_name))
            .map(str::to_string)
    };

    let mut admin = false;
    if let Some(cookie) = cookie {
        if let Some(user) = settings.resolver.resolve(&cookie).await {
            info!("set current user: {}", user.sub());
            admin = user.is_admin();
            req.extensions_mut().insert(UserView(user.to_json()));
            req.extensions_mut().insert(CurrentUser(user));
        }
    }

    if req.uri().path().starts_with(&settings.admin_prefix) && !admin {
        return Reply::redirect(&settings.signin_path).into_response();
    }
    next.run(req).await
}

pub async fn render_response(
    State(renderer): State<SharedRenderer>,
    req: Request,
    next: Next,
) -> Response {
    let user = req
        .extensions()
        .get::<UserView>()
        .map(|u| u.0.clone())
        .unwrap_or_default();
    let mut response = next.run(req).await;
    let Some(PendingTemplate { name, mut context }) =
        response.extensions_mut().remove::<PendingTemplate>()
    else {
        return response;
    };
    let Some(renderer) = renderer else {
        return HttpError::Internal(format!("No template renderer for {name}")).into_response();
    };
    context.insert(USER_KEY.into(), user);
    match renderer.render(&name, &serde_json::Value::Object(context)) {
        Ok(html) => {
            let mut response = Response::new(Body::from(html));
            *response.status_mut() = StatusCode::OK;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_HTML_UTF8));
            response
        }
        Err(e) => e.into_response(),
    }
}

/// Wrap `router` in the full chain. Layers added later run first, so the
/// order below is innermost to outermost.
pub fn apply_chain<R: SessionResolver>(
    router: Router,
    auth: Arc<AuthSettings<R>>,
    renderer: SharedRenderer,
) -> Router {
    router
        .layer(from_fn_with_state(renderer, render_response))
        .layer(from_fn_with_state(auth, authenticate::<R>))
        .layer(from_fn(parse_body))
        .layer(from_fn(log_request))
}
