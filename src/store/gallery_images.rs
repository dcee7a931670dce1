use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreError;
use crate::models::GalleryImageRow;

const GALLERY_COLUMNS: &str = r#"
    id, title, image_url, category, before_after, display_order, created_at
"#;

#[derive(Debug, Deserialize)]
pub struct NewGalleryImage {
    pub title: Option<String>,
    pub image_url: String,
    pub category: Option<String>,
    #[serde(default)]
    pub before_after: bool,
    pub display_order: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GalleryImageChanges {
    pub title: Option<String>,
    pub category: Option<String>,
    pub before_after: Option<bool>,
    pub display_order: Option<i32>,
}

pub async fn list(pool: &PgPool) -> Result<Vec<GalleryImageRow>, StoreError> {
    let rows = sqlx::query_as::<_, GalleryImageRow>(&format!(
        r#"
        SELECT {GALLERY_COLUMNS}
        FROM gallery_images
        ORDER BY display_order ASC NULLS LAST, created_at DESC
        "#
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<GalleryImageRow>, StoreError> {
    let row = sqlx::query_as::<_, GalleryImageRow>(&format!(
        r#"
        SELECT {GALLERY_COLUMNS}
        FROM gallery_images
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn create(pool: &PgPool, new: NewGalleryImage) -> Result<GalleryImageRow, StoreError> {
    let row = sqlx::query_as::<_, GalleryImageRow>(&format!(
        r#"
        INSERT INTO gallery_images (title, image_url, category, before_after, display_order)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {GALLERY_COLUMNS}
        "#
    ))
    .bind(&new.title)
    .bind(&new.image_url)
    .bind(&new.category)
    .bind(new.before_after)
    .bind(new.display_order)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: GalleryImageChanges,
) -> Result<GalleryImageRow, StoreError> {
    let row = sqlx::query_as::<_, GalleryImageRow>(&format!(
        r#"
        UPDATE gallery_images
        SET title = COALESCE($2, title),
            category = COALESCE($3, category),
            before_after = COALESCE($4, before_after),
            display_order = COALESCE($5, display_order)
        WHERE id = $1
        RETURNING {GALLERY_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&changes.title)
    .bind(&changes.category)
    .bind(changes.before_after)
    .bind(changes.display_order)
    .fetch_optional(pool)
    .await?;

    row.ok_or(StoreError::NotFound)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), StoreError> {
    let result = sqlx::query(r#"DELETE FROM gallery_images WHERE id = $1"#)
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}
