use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use quill_core::prelude::*;
use serde_json::{json, Value};
use tower::ServiceExt;

#[derive(Clone)]
struct TestUser {
    name: String,
    admin: bool,
}

impl Identity for TestUser {
    fn sub(&self) -> &str {
        &self.name
    }

    fn is_admin(&self) -> bool {
        self.admin
    }

    fn to_json(&self) -> Value {
        json!({ "name": self.name, "admin": self.admin })
    }
}

struct NameCookies;

impl SessionResolver for NameCookies {
    type User = TestUser;

    fn cookie_name(&self) -> &str {
        "awesession"
    }

    async fn resolve(&self, cookie: &str) -> Option<TestUser> {
        match cookie {
            "root" => Some(TestUser { name: "root".into(), admin: true }),
            "bob" => Some(TestUser { name: "bob".into(), admin: false }),
            _ => None,
        }
    }
}

/// Renders the template name followed by the JSON context.
struct JsonRenderer;

impl TemplateRenderer for JsonRenderer {
    fn render(&self, name: &str, context: &Value) -> Result<String, HttpError> {
        Ok(format!("{name}|{context}"))
    }
}

async fn page(_: (), _: Args) -> ReplyResult {
    Ok(Reply::template("page.html", json!({ "title": "t" })))
}

async fn whoami(_: (), args: Args) -> ReplyResult {
    let name = args
        .request()
        .and_then(|r| r.user::<TestUser>())
        .map(|u| u.name.clone());
    Ok(Reply::Json(json!({ "user": name })))
}

async fn manage(_: (), _: Args) -> ReplyResult {
    Ok(Reply::from("<h1>admin</h1>"))
}

async fn go_home(_: (), _: Args) -> ReplyResult {
    Ok(Reply::redirect("/"))
}

fn routes() -> Routes<()> {
    Routes::new()
        .get("/page", Signature::none(), page)
        .get("/whoami", Signature::builder().request().build().unwrap(), whoami)
        .get("/manage/blogs", Signature::none(), manage)
        .get("/away", Signature::none(), go_home)
}

fn app() -> Router {
    AppBuilder::new(())
        .routes(routes())
        .with_sessions(NameCookies)
        .with_renderer(JsonRenderer)
        .build()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(c) = cookie {
        builder = builder.header("cookie", format!("theme=dark; awesession={c}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn text(resp: axum::response::Response) -> String {
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&body).to_string()
}

#[tokio::test]
async fn admin_area_redirects_anonymous_and_non_admin_users() {
    for cookie in [None, Some("bob"), Some("forged")] {
        let resp = app().oneshot(get("/manage/blogs", cookie)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()["location"], "/signin");
    }
}

#[tokio::test]
async fn admin_area_admits_admin() {
    let resp = app().oneshot(get("/manage/blogs", Some("root"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "text/html;charset=utf-8");
    assert_eq!(text(resp).await, "<h1>admin</h1>");
}

#[tokio::test]
async fn current_user_reaches_request_context() {
    let resp = app().oneshot(get("/whoami", Some("bob"))).await.unwrap();
    let body: Value = serde_json::from_str(&text(resp).await).unwrap();
    assert_eq!(body, json!({ "user": "bob" }));

    let resp = app().oneshot(get("/whoami", None)).await.unwrap();
    let body: Value = serde_json::from_str(&text(resp).await).unwrap();
    assert_eq!(body, json!({ "user": null }));
}

#[tokio::test]
async fn templates_receive_user() {
    let resp = app().oneshot(get("/page", Some("root"))).await.unwrap();
    assert_eq!(resp.headers()["content-type"], "text/html;charset=utf-8");
    let out = text(resp).await;
    let (name, ctx) = out.split_once('|').unwrap();
    assert_eq!(name, "page.html");
    let ctx: Value = serde_json::from_str(ctx).unwrap();
    assert_eq!(ctx["title"], "t");
    assert_eq!(ctx["__user__"], json!({ "name": "root", "admin": true }));

    let resp = app().oneshot(get("/page", None)).await.unwrap();
    let out = text(resp).await;
    let ctx: Value = serde_json::from_str(out.split_once('|').unwrap().1).unwrap();
    assert_eq!(ctx["__user__"], Value::Null);
}

#[tokio::test]
async fn template_without_renderer_is_server_error() {
    let app = AppBuilder::new(()).routes(routes()).build();
    let resp = app.oneshot(get("/page", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn redirect_reply() {
    let resp = app().oneshot(get("/away", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers()["location"], "/");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let resp = app().oneshot(get("/nope", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn custom_admin_area() {
    let app = AppBuilder::new(())
        .routes(routes())
        .with_sessions(NameCookies)
        .admin_area("/page", "/login")
        .with_renderer(JsonRenderer)
        .build();
    let resp = app.oneshot(get("/page", None)).await.unwrap();
    assert_eq!(resp.headers()["location"], "/login");
}
