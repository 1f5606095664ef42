use quill_core::prelude::*;
use quill_test::{resolve_path, TestApp};
use serde_json::{json, Value};

async fn echo(_: (), args: Args) -> ReplyResult {
    let session = args
        .request()
        .and_then(|r| r.cookie("awesession"))
        .map(str::to_string);
    let mut values = args.values().clone();
    values.insert("session".into(), json!(session));
    Ok(Reply::Json(Value::Object(values)))
}

async fn login(_: (), _: Args) -> ReplyResult {
    let mut resp = Reply::Json(json!({ "ok": true })).into_response();
    resp.headers_mut().append(
        SET_COOKIE,
        HeaderValue::from_static("awesession=abc-1-ff; Max-Age=86400; Path=/; HttpOnly"),
    );
    Ok(Reply::Response(resp))
}

async fn fail(_: (), _: Args) -> ReplyResult {
    Err(ApiError::value("name", "name cannot be empty.").into())
}

async fn away(_: (), _: Args) -> ReplyResult {
    Ok(Reply::redirect("/signin"))
}

fn app() -> TestApp {
    let routes = Routes::new()
        .post("/echo", Signature::builder().request().var_kw().build().unwrap(), echo)
        .get("/echo", Signature::builder().request().var_kw().build().unwrap(), echo)
        .post("/login", Signature::none(), login)
        .post("/fail", Signature::none(), fail)
        .get("/away", Signature::none(), away);
    TestApp::new(AppBuilder::new(()).routes(routes).build())
}

#[test]
fn resolve_nested_paths() {
    let v = json!({"page": {"item_count": 3}, "blogs": [{"name": "a"}, {"name": "b"}]});
    assert_eq!(resolve_path(&v, "page.item_count"), json!(3));
    assert_eq!(resolve_path(&v, "blogs.1.name"), json!("b"));
    assert_eq!(resolve_path(&v, "blogs.9.name"), Value::Null);
    assert_eq!(resolve_path(&v, "missing"), Value::Null);
}

#[tokio::test]
async fn json_body() {
    app()
        .post("/echo")
        .json(&json!({"a": 1}))
        .send()
        .await
        .assert_ok()
        .assert_json_path("a", 1)
        .assert_json_path("session", Value::Null);
}

#[tokio::test]
async fn form_body_and_cookies() {
    app()
        .post("/echo")
        .form(&[("name", "Ann Lee"), ("email", "a@b.com")])
        .cookie("theme", "dark")
        .cookie("awesession", "s1")
        .send()
        .await
        .assert_ok()
        .assert_json_path("name", "Ann Lee")
        .assert_json_path("email", "a@b.com")
        .assert_json_path("session", "s1");
}

#[tokio::test]
async fn query_string() {
    let resp = app().get("/echo?page=2").send().await.assert_ok();
    let page: String = resp.json_path("page");
    assert_eq!(page, "2");
}

#[tokio::test]
async fn set_cookie_is_readable() {
    let resp = app().post("/login").send().await.assert_ok();
    assert_eq!(resp.cookie("awesession").as_deref(), Some("abc-1-ff"));
    assert_eq!(resp.cookie("other"), None);
}

#[tokio::test]
async fn api_error_and_redirect_assertions() {
    app()
        .post("/fail")
        .send()
        .await
        .assert_api_error("value:invalid")
        .assert_json_path("data", "name");
    app().get("/away").send().await.assert_redirect("/signin");
}

#[tokio::test]
async fn raw_body_with_header() {
    app()
        .post("/echo")
        .header("content-type", "text/xml")
        .body("<a/>")
        .send()
        .await
        .assert_bad_request();
}
