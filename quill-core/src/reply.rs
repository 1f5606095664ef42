//! Handler return values and their normalization into HTTP responses.

use crate::error::HttpError;
use crate::http::header::{
    HeaderValue, APPLICATION_JSON_UTF8, CONTENT_TYPE, LOCATION, OCTET_STREAM, TEXT_HTML_UTF8,
    TEXT_PLAIN_UTF8,
};
use crate::http::response::{IntoResponse, Response};
use crate::http::{Body, Bytes, StatusCode};

/// Key marking a JSON reply as a template render request.
pub const TEMPLATE_KEY: &str = "__template__";
/// Key under which the current user is exposed to templates.
pub const USER_KEY: &str = "__user__";

const REDIRECT_PREFIX: &str = "redirect:";

/// What a handler hands back. Converted into a response by [`IntoResponse`]:
///
/// | Variant | Response |
/// |---------|----------|
/// | `Response` | passed through untouched |
/// | `Bytes` | `application/octet-stream` |
/// | `Html` | `text/html;charset=utf-8`, or `302` when it reads `redirect:<location>` |
/// | `Json` | `application/json;charset=utf-8`, or a template render when it carries `__template__` |
/// | `Status` | bare status when within 100..=599 |
/// | `StatusReason` | status with a custom reason phrase when within 100..=599 |
/// | `Plain` | `text/plain;charset=utf-8` |
///
/// Out-of-range statuses fall back to their text form.
pub enum Reply {
    Response(Response),
    Bytes(Bytes),
    Html(String),
    Json(serde_json::Value),
    Status(i64),
    StatusReason(i64, String),
    Plain(String),
}

/// A template render left on the response for the response-normalization
/// middleware, which owns the renderer and knows the current user.
#[derive(Debug, Clone)]
pub struct PendingTemplate {
    pub name: String,
    pub context: serde_json::Map<String, serde_json::Value>,
}

impl Reply {
    pub fn redirect(location: impl AsRef<str>) -> Self {
        Reply::Html(format!("{REDIRECT_PREFIX}{}", location.as_ref()))
    }

    /// Render `name` with `context`. A non-object context renders with an empty one.
    pub fn template(name: impl Into<String>, context: serde_json::Value) -> Self {
        let mut map = match context {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        map.insert(TEMPLATE_KEY.into(), serde_json::Value::String(name.into()));
        Reply::Json(serde_json::Value::Object(map))
    }

    /// Serialize any value as a JSON reply.
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Reply::Json(serde_json::to_value(value)?))
    }
}

fn with_content_type(status: StatusCode, content_type: &'static str, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn status_in_range(code: i64) -> Option<StatusCode> {
    if (100..600).contains(&code) {
        u16::try_from(code)
            .ok()
            .and_then(|c| StatusCode::from_u16(c).ok())
    } else {
        None
    }
}

fn plain(text: String) -> Response {
    with_content_type(StatusCode::OK, TEXT_PLAIN_UTF8, Body::from(text))
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Response(response) => response,
            Reply::Bytes(bytes) => with_content_type(StatusCode::OK, OCTET_STREAM, Body::from(bytes)),
            Reply::Html(text) => match text.strip_prefix(REDIRECT_PREFIX) {
                Some(location) => match HeaderValue::from_str(location) {
                    Ok(location) => {
                        let mut response = Response::new(Body::empty());
                        *response.status_mut() = StatusCode::FOUND;
                        response.headers_mut().insert(LOCATION, location);
                        response
                    }
                    Err(_) => {
                        HttpError::Internal(format!("Invalid redirect location: {location}"))
                            .into_response()
                    }
                },
                None => with_content_type(StatusCode::OK, TEXT_HTML_UTF8, Body::from(text)),
            },
            Reply::Json(serde_json::Value::Object(mut map))
                if map.get(TEMPLATE_KEY).is_some_and(|t| t.is_string()) =>
            {
                let name = match map.remove(TEMPLATE_KEY) {
                    Some(serde_json::Value::String(name)) => name,
                    _ => String::new(),
                };
                let mut response = Response::new(Body::empty());
                response
                    .extensions_mut()
                    .insert(PendingTemplate { name, context: map });
                response
            }
            Reply::Json(value) => match serde_json::to_vec(&value) {
                Ok(body) => with_content_type(StatusCode::OK, APPLICATION_JSON_UTF8, Body::from(body)),
                Err(e) => HttpError::from(e).into_response(),
            },
            Reply::Status(code) => match status_in_range(code) {
                Some(status) => status.into_response(),
                None => plain(code.to_string()),
            },
            Reply::StatusReason(code, reason) => match status_in_range(code) {
                Some(status) => {
                    let mut response = status.into_response();
                    match hyper::ext::ReasonPhrase::try_from(reason.clone()) {
                        Ok(phrase) => {
                            response.extensions_mut().insert(phrase);
                        }
                        Err(_) => tracing::warn!(%reason, "invalid reason phrase dropped"),
                    }
                    response
                }
                None => plain(format!("({code}, {reason})")),
            },
            Reply::Plain(text) => plain(text),
        }
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply::Response(response)
    }
}

impl From<Bytes> for Reply {
    fn from(bytes: Bytes) -> Self {
        Reply::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Reply {
    fn from(bytes: Vec<u8>) -> Self {
        Reply::Bytes(Bytes::from(bytes))
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Html(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Html(text.to_string())
    }
}

impl From<serde_json::Value> for Reply {
    fn from(value: serde_json::Value) -> Self {
        Reply::Json(value)
    }
}

impl From<i64> for Reply {
    fn from(code: i64) -> Self {
        Reply::Status(code)
    }
}

impl From<(i64, String)> for Reply {
    fn from((code, reason): (i64, String)) -> Self {
        Reply::StatusReason(code, reason)
    }
}

impl From<(i64, &str)> for Reply {
    fn from((code, reason): (i64, &str)) -> Self {
        Reply::StatusReason(code, reason.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_type(response: &Response) -> &str {
        response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    #[test]
    fn redirect_string_becomes_found() {
        let response = Reply::from("redirect:/signin").into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/signin");
    }

    #[test]
    fn plain_string_is_html() {
        let response = Reply::from("<h1>hi</h1>").into_response();
        assert_eq!(content_type(&response), TEXT_HTML_UTF8);
    }

    #[test]
    fn mapping_is_json_unless_templated() {
        let response = Reply::Json(serde_json::json!({"a": 1})).into_response();
        assert_eq!(content_type(&response), APPLICATION_JSON_UTF8);
        assert!(response.extensions().get::<PendingTemplate>().is_none());

        let response = Reply::template("blogs.html", serde_json::json!({"page": 1})).into_response();
        let pending = response.extensions().get::<PendingTemplate>().unwrap();
        assert_eq!(pending.name, "blogs.html");
        assert_eq!(pending.context["page"], 1);
        assert!(!pending.context.contains_key(TEMPLATE_KEY));
    }

    #[test]
    fn integers_in_range_are_statuses() {
        assert_eq!(Reply::Status(404).into_response().status(), StatusCode::NOT_FOUND);
        let response = Reply::Status(42).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), TEXT_PLAIN_UTF8);
    }

    #[test]
    fn status_with_reason_keeps_phrase() {
        let response = Reply::from((418, "Short and stout")).into_response();
        assert_eq!(response.status().as_u16(), 418);
        let phrase = response
            .extensions()
            .get::<hyper::ext::ReasonPhrase>()
            .unwrap();
        assert_eq!(phrase.as_bytes(), b"Short and stout");
    }

    #[test]
    fn bytes_are_octet_stream() {
        let response = Reply::from(vec![1u8, 2, 3]).into_response();
        assert_eq!(content_type(&response), OCTET_STREAM);
    }
}
