//! JSON API. Domain failures come back as `{error, data, message}` payloads.

use std::sync::LazyLock;

use quill_core::prelude::*;
use quill_data::{FindAll, Model, Page};
use quill_data_sqlx::Repository;
use quill_security::digest::digest_eq;
use quill_security::{hash_password, md5_hex};
use regex::Regex;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use super::{check_admin, current_user, page_index};
use crate::models::{next_id, Blog, Comment, User};
use crate::state::AppState;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9.\-_]+@[a-z0-9\-_]+(\.[a-z0-9\-_]+){1,4}$").expect("email pattern compiles")
});

/// Clients send `sha1(email:password)` as 40 lowercase hex digits.
static CLIENT_DIGEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{40}$").expect("digest pattern compiles"));

/// One page of `repo`, newest first. An empty window skips the row query.
async fn page_of<M: Model>(repo: &Repository<M>, index: u64) -> Result<(Page, Vec<M>), HandlerError> {
    let count = repo.count(None, &[]).await?;
    let page = Page::new(count, index);
    if page.limit == 0 {
        return Ok((page, Vec::new()));
    }
    let items = repo
        .find_all(
            &FindAll::new()
                .order_by("created_at desc")
                .limit((page.offset, page.limit)),
        )
        .await?;
    Ok((page, items))
}

/// Trimmed value of a required text field.
fn non_blank(args: &Args, field: &str) -> Result<String, ApiError> {
    args.text(field)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::value(field, format!("{field} cannot be empty.")))
}

/// A JSON reply for the masked user that also signs them in.
fn signed_in(state: &AppState, user: &User) -> ReplyResult {
    let cookie = HeaderValue::from_str(&state.sessions.set_cookie(&user.id, &user.passwd))
        .map_err(|e| HttpError::Internal(e.to_string()))?;
    let mut response = Json(user.masked()).into_response();
    response.headers_mut().append(SET_COOKIE, cookie);
    Ok(Reply::Response(response))
}

fn deleted<T: Serialize>(id: T) -> ReplyResult {
    Ok(Reply::Json(json!({ "id": id })))
}

pub async fn list_blogs(state: AppState, args: Args) -> ReplyResult {
    let (page, blogs) = page_of(&state.blogs, page_index(&args)).await?;
    Ok(Reply::Json(json!({ "page": page, "blogs": blogs })))
}

pub async fn get_blog(state: AppState, args: Args) -> ReplyResult {
    let id = args.require("id")?;
    match state.blogs.find(id.as_str()).await? {
        Some(blog) => Ok(Reply::json(&blog)?),
        None => Err(ApiError::not_found("Blog", "Blog not found.").into()),
    }
}

pub async fn create_blog(state: AppState, args: Args) -> ReplyResult {
    let user = check_admin(&args)?;
    let mut blog = Blog {
        user_id: user.id.clone(),
        user_name: user.name.clone(),
        user_image: user.image.clone(),
        name: non_blank(&args, "name")?,
        summary: non_blank(&args, "summary")?,
        content: non_blank(&args, "content")?,
        ..Blog::default()
    };
    state.blogs.save(&mut blog).await?;
    info!(id = %blog.id, "blog created");
    Ok(Reply::json(&blog)?)
}

pub async fn update_blog(state: AppState, args: Args) -> ReplyResult {
    check_admin(&args)?;
    let id = args.require("id")?;
    let Some(mut blog) = state.blogs.find(id.as_str()).await? else {
        return Err(ApiError::not_found("Blog", "Blog not found.").into());
    };
    blog.name = non_blank(&args, "name")?;
    blog.summary = non_blank(&args, "summary")?;
    blog.content = non_blank(&args, "content")?;
    state.blogs.update(&blog).await?;
    Ok(Reply::json(&blog)?)
}

pub async fn delete_blog(state: AppState, args: Args) -> ReplyResult {
    check_admin(&args)?;
    let id = args.require("id")?;
    let Some(blog) = state.blogs.find(id.as_str()).await? else {
        return Err(ApiError::not_found("Blog", "Blog not found.").into());
    };
    state.blogs.remove(&blog).await?;
    deleted(id)
}

pub async fn list_comments(state: AppState, args: Args) -> ReplyResult {
    let (page, comments) = page_of(&state.comments, page_index(&args)).await?;
    Ok(Reply::Json(json!({ "page": page, "comments": comments })))
}

pub async fn create_comment(state: AppState, args: Args) -> ReplyResult {
    let Some(user) = current_user(&args) else {
        return Err(ApiError::permission("Please signin first.").into());
    };
    let content = non_blank(&args, "content")?;
    let id = args.require("id")?;
    let Some(blog) = state.blogs.find(id.as_str()).await? else {
        return Err(ApiError::not_found("Blog", "Blog not found.").into());
    };
    let mut comment = Comment {
        blog_id: blog.id,
        user_id: user.id.clone(),
        user_name: user.name.clone(),
        user_image: user.image.clone(),
        content,
        ..Comment::default()
    };
    state.comments.save(&mut comment).await?;
    Ok(Reply::json(&comment)?)
}

pub async fn delete_comment(state: AppState, args: Args) -> ReplyResult {
    check_admin(&args)?;
    let id = args.require("id")?;
    let Some(comment) = state.comments.find(id.as_str()).await? else {
        return Err(ApiError::not_found("Comment", "Comment not found.").into());
    };
    state.comments.remove(&comment).await?;
    deleted(id)
}

pub async fn list_users(state: AppState, args: Args) -> ReplyResult {
    let (page, users) = page_of(&state.users, page_index(&args)).await?;
    let users: Vec<User> = users.iter().map(User::masked).collect();
    Ok(Reply::Json(json!({ "page": page, "users": users })))
}

pub async fn register_user(state: AppState, args: Args) -> ReplyResult {
    let name = non_blank(&args, "name")?;
    let email = args
        .text("email")
        .filter(|e| EMAIL.is_match(e))
        .ok_or_else(|| ApiError::value("email", "Invalid email."))?;
    let passwd = args
        .text("passwd")
        .filter(|p| CLIENT_DIGEST.is_match(p))
        .ok_or_else(|| ApiError::value("passwd", "Invalid password."))?;

    let existing = state
        .users
        .find_all(&FindAll::new().filter("email=?", [email.as_str()]))
        .await?;
    if !existing.is_empty() {
        return Err(ApiError::new("register:failed", "email", "Email is already in use.").into());
    }

    let id = next_id();
    let mut user = User {
        passwd: hash_password(&id, &passwd),
        image: format!(
            "http://www.gravatar.com/avatar/{}?d=mm&s=120",
            md5_hex(&email)
        ),
        id,
        email,
        name,
        ..User::default()
    };
    state.users.save(&mut user).await?;
    info!(email = %user.email, "user registered");
    signed_in(&state, &user)
}

pub async fn authenticate(state: AppState, args: Args) -> ReplyResult {
    let email = args
        .text("email")
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::value("email", "Invalid email."))?;
    let passwd = args
        .text("passwd")
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::value("passwd", "Invalid password."))?;

    let users = state
        .users
        .find_all(&FindAll::new().filter("email=?", [email.as_str()]))
        .await?;
    let Some(user) = users.into_iter().next() else {
        return Err(ApiError::value("email", "Email not exist.").into());
    };
    if !digest_eq(&hash_password(&user.id, &passwd), &user.passwd) {
        return Err(ApiError::value("password", "Invalid password.").into());
    }
    info!(email = %user.email, "user signed in");
    signed_in(&state, &user)
}
