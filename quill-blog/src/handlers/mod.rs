//! Route table for the blog: browsing pages, management pages and the JSON API.

pub mod api;
pub mod pages;

use quill_core::prelude::*;
use quill_data::Page;

use crate::models::User;
use crate::state::AppState;

pub fn routes() -> Result<Routes<AppState>, SignatureError> {
    let page = || Signature::builder().kw_or("page", "1").build();

    Ok(Routes::new()
        // browsing
        .get("/", page()?, pages::index)
        .get("/blog/{id}", Signature::builder().positional("id").build()?, pages::blog)
        .get("/register", Signature::none(), pages::register)
        .get("/signin", Signature::none(), pages::signin)
        .get("/signout", Signature::builder().request().build()?, pages::signout)
        // management
        .get("/manage/", Signature::none(), pages::manage)
        .get("/manage/comments", page()?, pages::manage_comments)
        .get("/manage/blogs", page()?, pages::manage_blogs)
        .get("/manage/blogs/create", Signature::none(), pages::manage_create_blog)
        .get("/manage/blogs/edit", Signature::builder().kw("id").build()?, pages::manage_edit_blog)
        .get("/manage/users", page()?, pages::manage_users)
        // api
        .get("/api/blogs", page()?, api::list_blogs)
        .get("/api/blogs/{id}", Signature::builder().kw("id").build()?, api::get_blog)
        .post(
            "/api/blogs",
            Signature::builder()
                .request()
                .kw("name")
                .kw("summary")
                .kw("content")
                .build()?,
            api::create_blog,
        )
        .post(
            "/api/blogs/{id}",
            Signature::builder()
                .positional("id")
                .request()
                .kw("name")
                .kw("summary")
                .kw("content")
                .build()?,
            api::update_blog,
        )
        .post(
            "/api/blogs/{id}/delete",
            Signature::builder().positional("id").request().build()?,
            api::delete_blog,
        )
        .get("/api/comments", page()?, api::list_comments)
        .post(
            "/api/blogs/{id}/comments",
            Signature::builder()
                .positional("id")
                .request()
                .kw("content")
                .build()?,
            api::create_comment,
        )
        .post(
            "/api/comments/{id}/delete",
            Signature::builder().positional("id").request().build()?,
            api::delete_comment,
        )
        .get("/api/users", page()?, api::list_users)
        .post(
            "/api/users",
            Signature::builder().kw("email").kw("name").kw("passwd").build()?,
            api::register_user,
        )
        .post(
            "/api/authenticate",
            Signature::builder().kw("email").kw("passwd").build()?,
            api::authenticate,
        ))
}

/// The signed-in user, if the request carried a valid session.
fn current_user(args: &Args) -> Option<&User> {
    args.request().and_then(|r| r.user::<User>())
}

fn check_admin(args: &Args) -> Result<&User, ApiError> {
    match current_user(args) {
        Some(user) if user.admin => Ok(user),
        _ => Err(ApiError::permission("")),
    }
}

fn page_index(args: &Args) -> u64 {
    Page::parse_index(args.str("page"))
}
