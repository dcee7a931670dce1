use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreError;
use crate::models::BlogPostRow;

const BLOG_COLUMNS: &str = r#"
    id, title, slug, excerpt, content, image_url,
    status, published_at, created_at, updated_at
"#;

#[derive(Debug, Deserialize)]
pub struct NewBlogPost {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BlogPostChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<String>,
}

pub async fn list(pool: &PgPool) -> Result<Vec<BlogPostRow>, StoreError> {
    let rows = sqlx::query_as::<_, BlogPostRow>(&format!(
        r#"
        SELECT {BLOG_COLUMNS}
        FROM blog_posts
        ORDER BY created_at DESC
        "#
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_published(pool: &PgPool) -> Result<Vec<BlogPostRow>, StoreError> {
    let rows = sqlx::query_as::<_, BlogPostRow>(&format!(
        r#"
        SELECT {BLOG_COLUMNS}
        FROM blog_posts
        WHERE status = 'published'
        ORDER BY published_at DESC NULLS LAST, created_at DESC
        "#
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create(pool: &PgPool, new: NewBlogPost) -> Result<BlogPostRow, StoreError> {
    let status = new.status.unwrap_or_else(|| "draft".to_string());
    let row = sqlx::query_as::<_, BlogPostRow>(&format!(
        r#"
        INSERT INTO blog_posts (title, slug, excerpt, content, image_url, status, published_at)
        VALUES ($1, $2, $3, $4, $5, $6,
                CASE WHEN $6 = 'published' THEN now() ELSE NULL END)
        RETURNING {BLOG_COLUMNS}
        "#
    ))
    .bind(&new.title)
    .bind(&new.slug)
    .bind(&new.excerpt)
    .bind(&new.content)
    .bind(&new.image_url)
    .bind(&status)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: BlogPostChanges,
) -> Result<BlogPostRow, StoreError> {
    let row = sqlx::query_as::<_, BlogPostRow>(&format!(
        r#"
        UPDATE blog_posts
        SET title = COALESCE($2, title),
            slug = COALESCE($3, slug),
            excerpt = COALESCE($4, excerpt),
            content = COALESCE($5, content),
            image_url = COALESCE($6, image_url),
            status = COALESCE($7, status),
            published_at = CASE
                WHEN COALESCE($7, status) = 'published' AND published_at IS NULL THEN now()
                ELSE published_at
            END,
            updated_at = now()
        WHERE id = $1
        RETURNING {BLOG_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&changes.title)
    .bind(&changes.slug)
    .bind(&changes.excerpt)
    .bind(&changes.content)
    .bind(&changes.image_url)
    .bind(&changes.status)
    .fetch_optional(pool)
    .await?;

    row.ok_or(StoreError::NotFound)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), StoreError> {
    let result = sqlx::query(r#"DELETE FROM blog_posts WHERE id = $1"#)
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}
