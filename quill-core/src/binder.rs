//! Declarative handler signatures and request-to-argument binding.
//!
//! A handler is registered together with a [`Signature`] describing the
//! parameters it consumes. At request time the binder assembles an [`Args`]
//! map from the body, query string and path captures according to that
//! signature, checks required parameters and calls the handler.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use axum::routing::{on, MethodFilter};
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::error::{HandlerError, HttpError};
use crate::http::extract::{FromRequest, FromRequestParts, Multipart, RawPathParams, Request, State};
use crate::http::header::{HeaderMap, Method, Uri, CONTENT_TYPE, COOKIE};
use crate::http::response::{IntoResponse, Response};
use crate::http::Router;
use crate::middleware::ParsedBody;
use crate::reply::Reply;
use crate::session::{find_cookie, CurrentUser};

/// Request bodies larger than this are rejected.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

type Kw = serde_json::Map<String, serde_json::Value>;

/// One declared handler parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Bound by name from the final argument map; must be present.
    Positional(String),
    /// The request context.
    Request,
    /// Keyword parameter; required when it has no default.
    Keyword {
        name: String,
        default: Option<serde_json::Value>,
    },
    /// Catch-all: keeps every body/query key instead of filtering to named keywords.
    VarKeyword,
}

/// Registration-time failures of a handler signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// A positional parameter was declared after the request parameter.
    ParamAfterRequest(String),
    DuplicateParam(String),
    DuplicateVarKeyword,
}

impl std::fmt::Display for SignatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignatureError::ParamAfterRequest(name) => write!(
                f,
                "request parameter must be the last named parameter, found `{name}` after it"
            ),
            SignatureError::DuplicateParam(name) => write!(f, "duplicate parameter `{name}`"),
            SignatureError::DuplicateVarKeyword => {
                write!(f, "catch-all keyword parameter declared twice")
            }
        }
    }
}

impl std::error::Error for SignatureError {}

/// The parameters a handler consumes, classified once at registration.
///
/// ```ignore
/// // fn api_create_comment(id, request, *, content)
/// Signature::builder().positional("id").request().kw("content").build()?
/// // fn index(*, page='1')
/// Signature::builder().kw_or("page", "1").build()?
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    params: Vec<Param>,
}

#[derive(Debug, Default)]
pub struct SignatureBuilder {
    params: Vec<Param>,
}

impl SignatureBuilder {
    pub fn positional(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::Positional(name.into()));
        self
    }

    pub fn request(mut self) -> Self {
        self.params.push(Param::Request);
        self
    }

    /// Required keyword parameter.
    pub fn kw(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::Keyword {
            name: name.into(),
            default: None,
        });
        self
    }

    /// Optional keyword parameter with a default.
    pub fn kw_or(mut self, name: impl Into<String>, default: impl Into<serde_json::Value>) -> Self {
        self.params.push(Param::Keyword {
            name: name.into(),
            default: Some(default.into()),
        });
        self
    }

    pub fn var_kw(mut self) -> Self {
        self.params.push(Param::VarKeyword);
        self
    }

    pub fn build(self) -> Result<Signature, SignatureError> {
        let mut seen = HashSet::new();
        let mut after_request = false;
        let mut var_kw = false;
        for param in &self.params {
            let name = match param {
                Param::Request => "request",
                Param::Positional(name) | Param::Keyword { name, .. } => name.as_str(),
                Param::VarKeyword => {
                    if var_kw {
                        return Err(SignatureError::DuplicateVarKeyword);
                    }
                    var_kw = true;
                    continue;
                }
            };
            if !seen.insert(name) {
                return Err(SignatureError::DuplicateParam(name.to_string()));
            }
            match param {
                Param::Request => after_request = true,
                Param::Positional(name) if after_request => {
                    return Err(SignatureError::ParamAfterRequest(name.clone()))
                }
                _ => {}
            }
        }
        Ok(Signature {
            params: self.params,
        })
    }
}

impl Signature {
    pub fn builder() -> SignatureBuilder {
        SignatureBuilder::default()
    }

    /// A handler that takes no arguments.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn has_request(&self) -> bool {
        self.params.iter().any(|p| matches!(p, Param::Request))
    }

    pub fn has_var_kw(&self) -> bool {
        self.params.iter().any(|p| matches!(p, Param::VarKeyword))
    }

    pub fn has_named_kw(&self) -> bool {
        self.named_kw().next().is_some()
    }

    /// All keyword parameter names, required and optional.
    pub fn named_kw(&self) -> impl Iterator<Item = &str> {
        self.params.iter().filter_map(|p| match p {
            Param::Keyword { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }

    /// Keyword parameters without a default.
    pub fn required_kw(&self) -> impl Iterator<Item = &str> {
        self.params.iter().filter_map(|p| match p {
            Param::Keyword {
                name,
                default: None,
            } => Some(name.as_str()),
            _ => None,
        })
    }

    fn positional(&self) -> impl Iterator<Item = &str> {
        self.params.iter().filter_map(|p| match p {
            Param::Positional(name) => Some(name.as_str()),
            _ => None,
        })
    }

    fn defaults(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.params.iter().filter_map(|p| match p {
            Param::Keyword {
                name,
                default: Some(value),
            } => Some((name.as_str(), value)),
            _ => None,
        })
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut star = false;
        let parts: Vec<String> = self
            .params
            .iter()
            .map(|p| {
                let prefix = match p {
                    Param::Keyword { .. } if !star => {
                        star = true;
                        "*, "
                    }
                    _ => "",
                };
                match p {
                    Param::Positional(name) => name.clone(),
                    Param::Request => "request".into(),
                    Param::Keyword {
                        name,
                        default: None,
                    } => format!("{prefix}{name}"),
                    Param::Keyword {
                        name,
                        default: Some(d),
                    } => format!("{prefix}{name}={d}"),
                    Param::VarKeyword => "**kw".into(),
                }
            })
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Snapshot of the request handed to handlers that declare a request parameter.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub extensions: axum::http::Extensions,
}

impl RequestContext {
    /// The user the session middleware attached, if any.
    pub fn user<U: Clone + Send + Sync + 'static>(&self) -> Option<&U> {
        self.extensions.get::<CurrentUser<U>>().map(|c| &c.0)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|header| find_cookie(header, name))
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }
}

/// Arguments assembled for one handler call.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: Kw,
    request: Option<RequestContext>,
}

impl Args {
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The argument when it is a JSON string.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.as_str())
    }

    /// The argument rendered as text: strings as-is, other scalars in their
    /// JSON form, null as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        match self.values.get(name)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Like [`Args::text`] but a missing argument is a client error.
    pub fn require(&self, name: &str) -> Result<String, HandlerError> {
        self.text(name)
            .ok_or_else(|| HttpError::BadRequest(format!("Missing argument: {name}")).into())
    }

    pub fn request(&self) -> Option<&RequestContext> {
        self.request.as_ref()
    }

    pub fn values(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.values
    }

    /// Deserialize the whole argument map.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_json::from_value(serde_json::Value::Object(self.values.clone()))
            .map_err(|e| HttpError::BadRequest(e.to_string()).into())
    }
}

/// Anything callable as `handler(state, args)`.
pub trait Handler<S>: Send + Sync + 'static {
    fn call(&self, state: S, args: Args) -> BoxFuture<'static, Result<Reply, HandlerError>>;
}

impl<S, F, Fut> Handler<S> for F
where
    F: Fn(S, Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, HandlerError>> + Send + 'static,
{
    fn call(&self, state: S, args: Args) -> BoxFuture<'static, Result<Reply, HandlerError>> {
        Box::pin(self(state, args))
    }
}

/// Route table of bound handlers over application state `S`.
pub struct Routes<S> {
    router: Router<S>,
}

impl<S: Clone + Send + Sync + 'static> Default for Routes<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone + Send + Sync + 'static> Routes<S> {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    pub fn get<H: Handler<S>>(self, path: &str, signature: Signature, handler: H) -> Self {
        self.route(MethodFilter::GET, "GET", path, signature, handler)
    }

    pub fn post<H: Handler<S>>(self, path: &str, signature: Signature, handler: H) -> Self {
        self.route(MethodFilter::POST, "POST", path, signature, handler)
    }

    fn route<H: Handler<S>>(
        mut self,
        filter: MethodFilter,
        method: &str,
        path: &str,
        signature: Signature,
        handler: H,
    ) -> Self {
        info!(
            "add route {} {} => {}({})",
            method,
            path,
            std::any::type_name::<H>(),
            signature
        );
        let signature = Arc::new(signature);
        let handler = Arc::new(handler);
        let endpoint = move |State(state): State<S>, req: Request| {
            let signature = signature.clone();
            let handler = handler.clone();
            async move { dispatch(state, &signature, handler.as_ref(), req).await }
        };
        self.router = self.router.route(path, on(filter, endpoint));
        self
    }

    pub fn into_router(self) -> Router<S> {
        self.router
    }
}

impl<S> From<Routes<S>> for Router<S> {
    fn from(routes: Routes<S>) -> Self {
        routes.router
    }
}

async fn dispatch<S, H>(state: S, signature: &Signature, handler: &H, req: Request) -> Response
where
    S: Send + Sync + 'static,
    H: Handler<S>,
{
    let (mut parts, body) = req.into_parts();
    let path_params: Vec<(String, String)> =
        match RawPathParams::from_request_parts(&mut parts, &state).await {
            Ok(params) => params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            Err(_) => Vec::new(),
        };
    let req = Request::from_parts(parts, body);
    let args = match bind(signature, req, path_params).await {
        Ok(args) => args,
        Err(e) => return e.into_response(),
    };
    match handler.call(state, args).await {
        Ok(reply) => reply.into_response(),
        Err(HandlerError::Api(e)) => {
            info!(error = %e, "api error");
            Reply::Json(e.payload()).into_response()
        }
        Err(HandlerError::Http(e)) => e.into_response(),
    }
}

/// Assemble the arguments for `signature` from a request and its path captures.
pub async fn bind(
    signature: &Signature,
    req: Request,
    path_params: Vec<(String, String)>,
) -> Result<Args, HttpError> {
    let context = signature.has_request().then(|| RequestContext {
        method: req.method().clone(),
        uri: req.uri().clone(),
        headers: req.headers().clone(),
        extensions: req.extensions().clone(),
    });

    let mut kw: Option<Kw> = None;
    if signature.has_var_kw() || signature.has_named_kw() {
        if req.method() == Method::POST {
            kw = Some(read_body(req).await?);
        } else if req.method() == Method::GET {
            kw = req
                .uri()
                .query()
                .filter(|qs| !qs.is_empty())
                .map(|qs| parse_pairs(qs.as_bytes()));
        }
    }

    let mut values = match kw {
        None => path_params
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect(),
        Some(mut kw) => {
            if !signature.has_var_kw() && signature.has_named_kw() {
                let named: HashSet<&str> = signature.named_kw().collect();
                kw.retain(|k, _| named.contains(k.as_str()));
            }
            for (k, v) in path_params {
                if kw.contains_key(&k) {
                    warn!(arg = %k, "path parameter overrides a keyword argument of the same name");
                }
                kw.insert(k, serde_json::Value::String(v));
            }
            kw
        }
    };

    for (name, default) in signature.defaults() {
        if !values.contains_key(name) {
            values.insert(name.to_string(), default.clone());
        }
    }

    for name in signature.required_kw().chain(signature.positional()) {
        if !values.contains_key(name) {
            return Err(HttpError::BadRequest(format!("Missing argument: {name}")));
        }
    }

    Ok(Args {
        values,
        request: context,
    })
}

async fn read_body(req: Request) -> Result<Kw, HttpError> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_lowercase)
        .filter(|ct| !ct.is_empty())
        .ok_or_else(|| HttpError::BadRequest("Missing Content-Type.".into()))?;

    if content_type.starts_with("application/json") {
        if let Some(ParsedBody(map)) = req.extensions().get::<ParsedBody>() {
            return Ok(map.clone());
        }
        let bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|e| HttpError::BadRequest(e.to_string()))?;
        return match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(_) => Err(HttpError::BadRequest("JSON body must be object.".into())),
            Err(e) => Err(HttpError::BadRequest(format!("Invalid JSON body: {e}"))),
        };
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        if let Some(ParsedBody(map)) = req.extensions().get::<ParsedBody>() {
            return Ok(map.clone());
        }
        let bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|e| HttpError::BadRequest(e.to_string()))?;
        return Ok(parse_pairs(&bytes));
    }

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| HttpError::BadRequest(e.body_text()))?;
        let mut map = Kw::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| HttpError::BadRequest(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            let value = match file_name {
                Some(file_name) => file_name,
                None => field
                    .text()
                    .await
                    .map_err(|e| HttpError::BadRequest(e.body_text()))?,
            };
            map.entry(name).or_insert(serde_json::Value::String(value));
        }
        return Ok(map);
    }

    Err(HttpError::BadRequest(format!(
        "Unsupported Content-Type: {content_type}"
    )))
}

/// Parse `a=1&b=2` pairs. The first value of a repeated key wins and blank
/// values are kept.
pub fn parse_pairs(input: &[u8]) -> Kw {
    let mut map = Kw::new();
    for (k, v) in form_urlencoded::parse(input) {
        map.entry(k.into_owned())
            .or_insert_with(|| serde_json::Value::String(v.into_owned()));
    }
    map
}
