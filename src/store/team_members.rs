use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreError;
use crate::models::TeamMemberRow;

const TEAM_COLUMNS: &str = r#"
    id, name, role, bio, image_url, specialties, order_index, created_at, updated_at
"#;

#[derive(Debug, Deserialize)]
pub struct NewTeamMember {
    pub name: String,
    pub role: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TeamMemberChanges {
    pub name: Option<String>,
    pub role: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub order_index: Option<i32>,
}

pub async fn list(pool: &PgPool) -> Result<Vec<TeamMemberRow>, StoreError> {
    let rows = sqlx::query_as::<_, TeamMemberRow>(&format!(
        r#"
        SELECT {TEAM_COLUMNS}
        FROM team_members
        ORDER BY order_index ASC, created_at ASC
        "#
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create(pool: &PgPool, new: NewTeamMember) -> Result<TeamMemberRow, StoreError> {
    // New members append to the end of the roster.
    let row = sqlx::query_as::<_, TeamMemberRow>(&format!(
        r#"
        INSERT INTO team_members (name, role, bio, image_url, specialties, order_index)
        VALUES ($1, $2, $3, $4, $5, (SELECT COUNT(*) FROM team_members))
        RETURNING {TEAM_COLUMNS}
        "#
    ))
    .bind(&new.name)
    .bind(&new.role)
    .bind(&new.bio)
    .bind(&new.image_url)
    .bind(&new.specialties)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: TeamMemberChanges,
) -> Result<TeamMemberRow, StoreError> {
    let row = sqlx::query_as::<_, TeamMemberRow>(&format!(
        r#"
        UPDATE team_members
        SET name = COALESCE($2, name),
            role = COALESCE($3, role),
            bio = COALESCE($4, bio),
            image_url = COALESCE($5, image_url),
            specialties = COALESCE($6, specialties),
            order_index = COALESCE($7, order_index),
            updated_at = now()
        WHERE id = $1
        RETURNING {TEAM_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&changes.name)
    .bind(&changes.role)
    .bind(&changes.bio)
    .bind(&changes.image_url)
    .bind(&changes.specialties)
    .bind(changes.order_index)
    .fetch_optional(pool)
    .await?;

    row.ok_or(StoreError::NotFound)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), StoreError> {
    let result = sqlx::query(r#"DELETE FROM team_members WHERE id = $1"#)
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}
