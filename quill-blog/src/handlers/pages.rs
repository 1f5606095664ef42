use quill_core::http::header::LOCATION;
use quill_core::prelude::*;
use quill_data::{FindAll, Page};
use serde_json::json;

use super::page_index;
use crate::render::{markdown, text2html};
use crate::state::AppState;

pub async fn index(state: AppState, args: Args) -> ReplyResult {
    let count = state.blogs.count(None, &[]).await?;
    let page = Page::new(count, page_index(&args));
    let blogs = if page.limit == 0 {
        Vec::new()
    } else {
        state
            .blogs
            .find_all(
                &FindAll::new()
                    .order_by("created_at desc")
                    .limit((page.offset, page.limit)),
            )
            .await?
    };
    Ok(Reply::template(
        "blogs.html",
        json!({ "page": page, "blogs": blogs }),
    ))
}

pub async fn blog(state: AppState, args: Args) -> ReplyResult {
    let id = args.require("id")?;
    let Some(blog) = state.blogs.find(id.as_str()).await? else {
        return Err(ApiError::not_found("Blog", "Blog not found.").into());
    };
    let comments = state
        .comments
        .find_all(
            &FindAll::new()
                .filter("blog_id=?", [id.as_str()])
                .order_by("created_at desc"),
        )
        .await?;

    let mut blog_view = serde_json::to_value(&blog)?;
    blog_view["html_content"] = markdown(&blog.content).into();
    let comments = comments
        .iter()
        .map(|c| {
            let mut view = serde_json::to_value(c)?;
            view["html_content"] = text2html(&c.content).into();
            Ok(view)
        })
        .collect::<Result<Vec<_>, HandlerError>>()?;

    Ok(Reply::template(
        "blog.html",
        json!({ "blog": blog_view, "comments": comments }),
    ))
}

pub async fn register(_state: AppState, _args: Args) -> ReplyResult {
    Ok(Reply::template("register.html", json!({})))
}

pub async fn signin(_state: AppState, _args: Args) -> ReplyResult {
    Ok(Reply::template("signin.html", json!({})))
}

pub async fn signout(state: AppState, args: Args) -> ReplyResult {
    let referer = args
        .request()
        .and_then(|r| r.headers.get("referer"))
        .and_then(|v| v.to_str().ok())
        .filter(|r| !r.is_empty())
        .unwrap_or("/");
    let location = HeaderValue::from_str(referer).unwrap_or(HeaderValue::from_static("/"));
    let cookie = HeaderValue::from_str(&state.sessions.clear_cookie())
        .map_err(|e| HttpError::Internal(e.to_string()))?;

    let mut response = StatusCode::FOUND.into_response();
    response.headers_mut().insert(LOCATION, location);
    response.headers_mut().append(SET_COOKIE, cookie);
    tracing::info!("user signed out.");
    Ok(Reply::Response(response))
}

pub async fn manage(_state: AppState, _args: Args) -> ReplyResult {
    Ok(Reply::redirect("/manage/comments"))
}

pub async fn manage_comments(_state: AppState, args: Args) -> ReplyResult {
    Ok(Reply::template(
        "manage_comments.html",
        json!({ "page_index": page_index(&args) }),
    ))
}

pub async fn manage_blogs(_state: AppState, args: Args) -> ReplyResult {
    Ok(Reply::template(
        "manage_blogs.html",
        json!({ "page_index": page_index(&args) }),
    ))
}

pub async fn manage_users(_state: AppState, args: Args) -> ReplyResult {
    Ok(Reply::template(
        "manage_users.html",
        json!({ "page_index": page_index(&args) }),
    ))
}

pub async fn manage_create_blog(_state: AppState, _args: Args) -> ReplyResult {
    Ok(Reply::template(
        "manage_blog_edit.html",
        json!({ "id": "", "action": "/api/blogs" }),
    ))
}

pub async fn manage_edit_blog(_state: AppState, args: Args) -> ReplyResult {
    let id = args.require("id")?;
    Ok(Reply::template(
        "manage_blog_edit.html",
        json!({ "action": format!("/api/blogs/{id}"), "id": id }),
    ))
}

