// src/routes/gallery_routes.rs

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{ApiOk, AppState, GalleryImageRow},
    store::gallery_images::{self, GalleryImageChanges, NewGalleryImage},
};

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/gallery_images", get(list_images).post(create_image))
        .route("/gallery_images/upload", post(upload_image))
        .route(
            "/gallery_images/{image_id}",
            get(get_image).patch(update_image).delete(delete_image),
        )
        // Public site gallery, no auth
        .route("/site/gallery", get(public_gallery))
}

#[derive(Debug, Serialize)]
pub struct GalleryMutation {
    pub data: GalleryImageRow,
    pub gallery_images: Vec<GalleryImageRow>,
}

pub async fn list_images(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<ApiOk<Vec<GalleryImageRow>>>, ApiError> {
    let images = gallery_images::list(&state.db).await?;
    Ok(Json(ApiOk { data: images }))
}

pub async fn public_gallery(
    State(state): State<AppState>,
) -> Result<Json<ApiOk<Vec<GalleryImageRow>>>, ApiError> {
    let images = gallery_images::list(&state.db).await?;
    Ok(Json(ApiOk { data: images }))
}

pub async fn get_image(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(image_id): Path<Uuid>,
) -> Result<Json<ApiOk<GalleryImageRow>>, ApiError> {
    let image = gallery_images::get(&state.db, image_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("NOT_FOUND", "gallery image not found".into()))?;
    Ok(Json(ApiOk { data: image }))
}

/* ============================================================
   POST /gallery_images/upload (raw image bytes)
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub ext: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub url: String,
    pub name: String,
}

pub async fn upload_image(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(q): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<ApiOk<UploadResult>>, ApiError> {
    let ext = q.ext.to_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            format!("unsupported image extension: {ext}"),
        ));
    }
    if body.is_empty() {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "empty upload body".into(),
        ));
    }

    let name = format!("{}.{ext}", Uuid::new_v4());
    let url = state
        .storage
        .upload(&body, &name)
        .await
        .map_err(|e| ApiError::Internal(format!("upload failed: {e}")))?;

    Ok(Json(ApiOk {
        data: UploadResult { url, name },
    }))
}

pub async fn create_image(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(req): Json<NewGalleryImage>,
) -> Result<Json<GalleryMutation>, ApiError> {
    if req.image_url.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "image_url is required".into(),
        ));
    }

    let image = gallery_images::create(&state.db, req).await?;
    let images = gallery_images::list(&state.db).await?;
    Ok(Json(GalleryMutation {
        data: image,
        gallery_images: images,
    }))
}

pub async fn update_image(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(image_id): Path<Uuid>,
    Json(req): Json<GalleryImageChanges>,
) -> Result<Json<GalleryMutation>, ApiError> {
    let image = gallery_images::update(&state.db, image_id, req).await?;
    let images = gallery_images::list(&state.db).await?;
    Ok(Json(GalleryMutation {
        data: image,
        gallery_images: images,
    }))
}

pub async fn delete_image(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(image_id): Path<Uuid>,
) -> Result<Json<ApiOk<Vec<GalleryImageRow>>>, ApiError> {
    let image = gallery_images::get(&state.db, image_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("NOT_FOUND", "gallery image not found".into()))?;

    // Best-effort: the row is the source of truth, a missing file is fine.
    if let Some(name) = image.image_url.rsplit('/').next() {
        if let Err(e) = state.storage.remove(name).await {
            tracing::warn!("could not remove stored object {name}: {e}");
        }
    }

    gallery_images::delete(&state.db, image_id).await?;
    let images = gallery_images::list(&state.db).await?;
    Ok(Json(ApiOk { data: images }))
}
