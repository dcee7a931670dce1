pub mod appointments;
pub mod blog_posts;
pub mod gallery_images;
pub mod team_members;

/// Failure surfaced by a store accessor. Callers keep their current
/// in-memory list when one of these comes back; no partial mutation is
/// ever applied locally.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("db error: {0}")]
    Database(String),
    #[error("record not found")]
    NotFound,
    #[error("illegal status transition: {} -> {}", .from.as_str(), .to.as_str())]
    IllegalTransition {
        from: crate::models::AppointmentStatus,
        to: crate::models::AppointmentStatus,
    },
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}
