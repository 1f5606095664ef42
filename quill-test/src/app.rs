use bytes::Bytes;
use http::header::{HeaderMap, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use http::request::Builder;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use quill_core::http::{Body, Router};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tower::util::ServiceExt;

/// Drives a built Quill `Router` in process.
///
/// Every request runs through `tower::ServiceExt::oneshot`, middleware chain
/// included, without a listener.
///
/// ```ignore
/// let app = TestApp::new(application(state, "templates")?.build());
/// let cookie = app
///     .post("/api/authenticate")
///     .json(&json!({"email": "a@b.com", "passwd": digest}))
///     .send()
///     .await
///     .assert_ok()
///     .cookie("awesession");
/// ```
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    pub fn get(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::GET, uri)
    }

    pub fn post(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::POST, uri)
    }

    pub fn request(&self, method: Method, uri: &str) -> TestRequest<'_> {
        TestRequest {
            app: self,
            builder: Request::builder().method(method).uri(uri),
            cookies: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Send a fully built request and read the whole response.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .expect("response body readable")
            .to_bytes();
        TestResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }
}

/// One request under construction. Invalid header names or values surface
/// as a panic in [`TestRequest::send`].
pub struct TestRequest<'a> {
    app: &'a TestApp,
    builder: Builder,
    cookies: Vec<String>,
    body: Vec<u8>,
}

impl TestRequest<'_> {
    pub fn header(mut self, name: &str, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value.as_ref());
        self
    }

    /// Repeated calls are joined into a single `Cookie` header.
    pub fn cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.push(format!("{name}={value}"));
        self
    }

    pub fn json(self, payload: &impl Serialize) -> Self {
        let body = serde_json::to_vec(payload).expect("payload serializes");
        self.header(CONTENT_TYPE.as_str(), "application/json").body(body)
    }

    pub fn form(self, pairs: &[(&str, &str)]) -> Self {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.header(CONTENT_TYPE.as_str(), "application/x-www-form-urlencoded")
            .body(encoded)
    }

    /// Raw body. Pair with [`TestRequest::header`] for the content type.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub async fn send(self) -> TestResponse {
        let mut builder = self.builder;
        if !self.cookies.is_empty() {
            builder = builder.header(COOKIE, self.cookies.join("; "));
        }
        let request = builder
            .body(Body::from(self.body))
            .expect("request parts are valid");
        self.app.send(request).await
    }
}

/// Value at a dotted path such as `page.item_count` or `blogs.0.name`.
/// Numeric segments index arrays; anything unresolvable is `null`.
pub fn resolve_path(root: &Value, path: &str) -> Value {
    let mut node = root;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        let next = match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(next) => node = next,
            None => return Value::Null,
        }
    }
    node.clone()
}

/// A response read to the end. Assertions consume and return it so they chain.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn assert_status(self, expected: StatusCode) -> Self {
        if self.status != expected {
            panic!(
                "status {} where {expected} was expected\nbody: {}",
                self.status,
                self.text()
            );
        }
        self
    }

    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn assert_bad_request(self) -> Self {
        self.assert_status(StatusCode::BAD_REQUEST)
    }

    pub fn assert_not_found(self) -> Self {
        self.assert_status(StatusCode::NOT_FOUND)
    }

    /// `302 Found` pointing at `location`.
    pub fn assert_redirect(self, location: &str) -> Self {
        let this = self.assert_status(StatusCode::FOUND);
        assert_eq!(this.header(LOCATION.as_str()), Some(location), "redirect target");
        this
    }

    /// An `{error, data, message}` payload carrying `code`, sent with `200`.
    pub fn assert_api_error(self, code: &str) -> Self {
        self.assert_ok().assert_json_path("error", code)
    }

    pub fn assert_json_path(self, path: &str, expected: impl Into<Value>) -> Self {
        let body: Value = self.json();
        let expected = expected.into();
        let actual = resolve_path(&body, path);
        if actual != expected {
            panic!("`{path}` is {actual}, expected {expected}\nbody: {body}");
        }
        self
    }

    /// Deserialize the value at `path`.
    pub fn json_path<T: DeserializeOwned>(&self, path: &str) -> T {
        let value = resolve_path(&self.json(), path);
        serde_json::from_value(value)
            .unwrap_or_else(|e| panic!("`{path}` does not deserialize: {e}\nbody: {}", self.text()))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Value given to cookie `name` by a `Set-Cookie` header of this response.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .filter_map(|h| h.split(';').next()?.split_once('='))
            .find(|(key, _)| key.trim() == name)
            .map(|(_, value)| value.trim().to_string())
    }

    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("body is not the expected JSON: {e}\nbody: {}", self.text()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
