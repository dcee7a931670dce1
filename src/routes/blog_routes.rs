// src/routes/blog_routes.rs

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{ApiOk, AppState, BlogPostRow},
    store::blog_posts::{self, BlogPostChanges, NewBlogPost},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blog_posts", get(list_posts).post(create_post))
        .route(
            "/blog_posts/{post_id}",
            get(get_post).patch(update_post).delete(delete_post),
        )
        // Public site feed: published posts only, no auth
        .route("/site/blog", get(published_posts))
}

#[derive(Debug, Serialize)]
pub struct BlogPostMutation {
    pub data: BlogPostRow,
    pub blog_posts: Vec<BlogPostRow>,
}

fn ensure_known_status(status: Option<&str>) -> Result<(), ApiError> {
    match status {
        None | Some("draft") | Some("published") => Ok(()),
        Some(other) => Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            format!("unknown blog post status: {other}"),
        )),
    }
}

pub async fn list_posts(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<ApiOk<Vec<BlogPostRow>>>, ApiError> {
    let posts = blog_posts::list(&state.db).await?;
    Ok(Json(ApiOk { data: posts }))
}

pub async fn published_posts(
    State(state): State<AppState>,
) -> Result<Json<ApiOk<Vec<BlogPostRow>>>, ApiError> {
    let posts = blog_posts::list_published(&state.db).await?;
    Ok(Json(ApiOk { data: posts }))
}

pub async fn get_post(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(post_id): Path<Uuid>,
) -> Result<Json<ApiOk<BlogPostRow>>, ApiError> {
    let posts = blog_posts::list(&state.db).await?;
    posts
        .into_iter()
        .find(|p| p.id == post_id)
        .map(|p| Json(ApiOk { data: p }))
        .ok_or_else(|| ApiError::NotFound("NOT_FOUND", "blog post not found".into()))
}

pub async fn create_post(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(req): Json<NewBlogPost>,
) -> Result<Json<BlogPostMutation>, ApiError> {
    if req.title.trim().is_empty() || req.slug.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "title and slug are required".into(),
        ));
    }
    ensure_known_status(req.status.as_deref())?;

    let post = blog_posts::create(&state.db, req).await?;
    let posts = blog_posts::list(&state.db).await?;
    Ok(Json(BlogPostMutation {
        data: post,
        blog_posts: posts,
    }))
}

pub async fn update_post(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(post_id): Path<Uuid>,
    Json(req): Json<BlogPostChanges>,
) -> Result<Json<BlogPostMutation>, ApiError> {
    ensure_known_status(req.status.as_deref())?;

    let post = blog_posts::update(&state.db, post_id, req).await?;
    let posts = blog_posts::list(&state.db).await?;
    Ok(Json(BlogPostMutation {
        data: post,
        blog_posts: posts,
    }))
}

pub async fn delete_post(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(post_id): Path<Uuid>,
) -> Result<Json<ApiOk<Vec<BlogPostRow>>>, ApiError> {
    blog_posts::delete(&state.db, post_id).await?;
    let posts = blog_posts::list(&state.db).await?;
    Ok(Json(ApiOk { data: posts }))
}
