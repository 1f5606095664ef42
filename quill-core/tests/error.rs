use http_body_util::BodyExt;
use quill_core::http::response::IntoResponse;
use quill_core::http::StatusCode;
use quill_core::{ApiError, HandlerError, HttpError, Reply};
use serde_json::{json, Value};

async fn body_json(resp: quill_core::http::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn http_errors_map_to_status_and_message() {
    let cases = [
        (HttpError::NotFound("no blog".into()), StatusCode::NOT_FOUND),
        (HttpError::Unauthorized("who".into()), StatusCode::UNAUTHORIZED),
        (HttpError::Forbidden("no".into()), StatusCode::FORBIDDEN),
        (HttpError::BadRequest("bad".into()), StatusCode::BAD_REQUEST),
        (HttpError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, status) in cases {
        let message = err.to_string();
        let resp = err.into_response();
        assert_eq!(resp.status(), status, "{message}");
        let body = body_json(resp).await;
        assert!(message.ends_with(body["error"].as_str().unwrap()));
    }
}

#[tokio::test]
async fn custom_error_keeps_body() {
    let resp = HttpError::Custom {
        status: StatusCode::CONFLICT,
        body: json!({ "code": 7 }),
    }
    .into_response();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await, json!({ "code": 7 }));
}

#[tokio::test]
async fn api_errors_are_ok_payloads() {
    let resp = ApiError::not_found("Blog", "Blog not found.").into_response();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "application/json;charset=utf-8");
    assert_eq!(
        body_json(resp).await,
        json!({ "error": "value:notfound", "data": "Blog", "message": "Blog not found." })
    );

    let err = ApiError::permission("Please signin first.");
    assert_eq!(err.error, "permission:forbidden");
    assert_eq!(err.data, "permission");
}

#[tokio::test]
async fn handler_error_dispatches_by_kind() {
    let api: HandlerError = ApiError::value("email", "Invalid email.").into();
    let resp = api.into_response();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"], "email");

    let http: HandlerError = HttpError::BadRequest("nope".into()).into();
    assert_eq!(http.into_response().status(), StatusCode::BAD_REQUEST);

    let parse: HandlerError = serde_json::from_str::<Value>("{").unwrap_err().into();
    assert_eq!(parse.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn status_replies() {
    assert_eq!(Reply::Status(204).into_response().status(), StatusCode::NO_CONTENT);

    let resp = Reply::Status(42).into_response();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"42");

    let resp = Reply::StatusReason(418, "Short and stout".into()).into_response();
    assert_eq!(resp.status().as_u16(), 418);
}
