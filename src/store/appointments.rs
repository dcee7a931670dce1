//! Appointment store accessor.
//!
//! The trait exposes plain mutations and `_refreshed` variants that
//! re-fetch the full list after the write, so callers can choose between
//! read-your-writes consistency and an optimistic local patch.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::StoreError;
use crate::models::{AppointmentRow, AppointmentStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct NewAppointment {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub procedure: String,
    pub preferred_date: Option<NaiveDate>,
    pub message: Option<String>,
}

/// Partial update applied by an operator: an optional status transition
/// and optional notes appended to the message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentChanges {
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

/// Resolve the post-update (status, message) pair, enforcing the
/// transition table. Shared by every store implementation so the rules
/// cannot drift.
fn apply_changes(
    current: &AppointmentRow,
    changes: &AppointmentChanges,
) -> Result<(AppointmentStatus, Option<String>), StoreError> {
    let next_status = changes.status.unwrap_or(current.status);
    if !current.status.can_transition_to(next_status) {
        return Err(StoreError::IllegalTransition {
            from: current.status,
            to: next_status,
        });
    }

    let message = match changes.notes.as_deref().map(str::trim) {
        Some(notes) if !notes.is_empty() => Some(format!(
            "{}\n\nAdmin Notes: {}",
            current.message.as_deref().unwrap_or(""),
            notes
        )),
        _ => current.message.clone(),
    };

    Ok((next_status, message))
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// All appointments, newest first.
    async fn list(&self) -> Result<Vec<AppointmentRow>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<AppointmentRow>, StoreError>;

    /// Insert with server-assigned id/timestamps; status starts pending.
    async fn create(&self, new: NewAppointment) -> Result<AppointmentRow, StoreError>;

    async fn update(
        &self,
        id: Uuid,
        changes: AppointmentChanges,
    ) -> Result<AppointmentRow, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    async fn create_refreshed(
        &self,
        new: NewAppointment,
    ) -> Result<(AppointmentRow, Vec<AppointmentRow>), StoreError> {
        let row = self.create(new).await?;
        let list = self.list().await?;
        Ok((row, list))
    }

    async fn update_refreshed(
        &self,
        id: Uuid,
        changes: AppointmentChanges,
    ) -> Result<(AppointmentRow, Vec<AppointmentRow>), StoreError> {
        let row = self.update(id, changes).await?;
        let list = self.list().await?;
        Ok((row, list))
    }

    async fn delete_refreshed(&self, id: Uuid) -> Result<Vec<AppointmentRow>, StoreError> {
        self.delete(id).await?;
        self.list().await
    }
}

/* ============================================================
   Postgres implementation
   ============================================================ */

pub struct PgAppointmentStore {
    pool: sqlx::PgPool,
}

impl PgAppointmentStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

const APPOINTMENT_COLUMNS: &str = r#"
    id, name, email, phone, procedure, preferred_date,
    message, status, created_at, updated_at
"#;

#[async_trait]
impl AppointmentStore for PgAppointmentStore {
    async fn list(&self) -> Result<Vec<AppointmentRow>, StoreError> {
        let rows = sqlx::query_as::<_, AppointmentRow>(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments
            ORDER BY created_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<AppointmentRow>, StoreError> {
        let row = sqlx::query_as::<_, AppointmentRow>(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create(&self, new: NewAppointment) -> Result<AppointmentRow, StoreError> {
        let row = sqlx::query_as::<_, AppointmentRow>(&format!(
            r#"
            INSERT INTO appointments (name, email, phone, procedure, preferred_date, message)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.procedure)
        .bind(new.preferred_date)
        .bind(&new.message)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: AppointmentChanges,
    ) -> Result<AppointmentRow, StoreError> {
        let current = self.get(id).await?.ok_or(StoreError::NotFound)?;
        let (status, message) = apply_changes(&current, &changes)?;

        let row = sqlx::query_as::<_, AppointmentRow>(&format!(
            r#"
            UPDATE appointments
            SET status = $2,
                message = $3,
                updated_at = now()
            WHERE id = $1
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(&message)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(r#"DELETE FROM appointments WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

/* ============================================================
   In-memory implementation (single-instance / test use)
   ============================================================ */

#[derive(Default)]
pub struct MemoryAppointmentStore {
    rows: std::sync::Mutex<Vec<AppointmentRow>>,
}

impl MemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn list(&self) -> Result<Vec<AppointmentRow>, StoreError> {
        let mut rows = self
            .rows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<AppointmentRow>, StoreError> {
        let rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        Ok(rows.iter().find(|r| r.id == id).cloned())
    }

    async fn create(&self, new: NewAppointment) -> Result<AppointmentRow, StoreError> {
        let now = Utc::now();
        let row = AppointmentRow {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            phone: new.phone,
            procedure: new.procedure,
            preferred_date: new.preferred_date,
            message: new.message,
            status: AppointmentStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.rows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: AppointmentChanges,
    ) -> Result<AppointmentRow, StoreError> {
        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound)?;

        let (status, message) = apply_changes(row, &changes)?;
        row.status = status;
        row.message = message;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        let before = rows.len();
        rows.retain(|r| r.id != id);
        if rows.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_appt(name: &str) -> NewAppointment {
        NewAppointment {
            name: name.into(),
            email: format!("{}@x.com", name.to_lowercase()),
            phone: "+255700000000".into(),
            procedure: "Rhinoplasty".into(),
            preferred_date: None,
            message: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_to_pending_and_lists_newest_first() {
        let store = MemoryAppointmentStore::new();
        let first = store.create(new_appt("First")).await.unwrap();
        assert_eq!(first.status, AppointmentStatus::Pending);

        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        store.create(new_appt("Second")).await.unwrap();

        let list = store.list().await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "Second");
        assert_eq!(list[1].name, "First");
    }

    #[tokio::test]
    async fn update_appends_notes_and_bumps_updated_at() {
        let store = MemoryAppointmentStore::new();
        let row = store.create(new_appt("Jane")).await.unwrap();
        let before = row.updated_at;

        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let updated = store
            .update(
                row.id,
                AppointmentChanges {
                    status: Some(AppointmentStatus::Confirmed),
                    notes: Some("Called patient".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, AppointmentStatus::Confirmed);
        assert!(updated
            .message
            .as_deref()
            .unwrap()
            .ends_with("\n\nAdmin Notes: Called patient"));
        assert!(updated.updated_at > before);
    }

    #[tokio::test]
    async fn notes_append_preserves_the_original_message() {
        let store = MemoryAppointmentStore::new();
        let mut new = new_appt("Jane");
        new.message = Some("I would like a consultation".into());
        let row = store.create(new).await.unwrap();

        let updated = store
            .update(
                row.id,
                AppointmentChanges {
                    status: None,
                    notes: Some("Needs interpreter".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(
            updated.message.as_deref(),
            Some("I would like a consultation\n\nAdmin Notes: Needs interpreter")
        );
    }

    #[tokio::test]
    async fn illegal_transition_is_rejected_and_nothing_changes() {
        let store = MemoryAppointmentStore::new();
        let row = store.create(new_appt("Jane")).await.unwrap();
        store
            .update(
                row.id,
                AppointmentChanges {
                    status: Some(AppointmentStatus::Cancelled),
                    notes: None,
                },
            )
            .await
            .unwrap();

        let err = store
            .update(
                row.id,
                AppointmentChanges {
                    status: Some(AppointmentStatus::Pending),
                    notes: Some("reopen".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::IllegalTransition { .. }));

        let current = store.get(row.id).await.unwrap().unwrap();
        assert_eq!(current.status, AppointmentStatus::Cancelled);
        assert_eq!(current.message, None);
    }

    #[tokio::test]
    async fn refreshed_variants_return_the_new_list() {
        let store = MemoryAppointmentStore::new();
        let (row, list) = store.create_refreshed(new_appt("Jane")).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, row.id);

        let list = store.delete_refreshed(row.id).await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn missing_records_surface_not_found() {
        let store = MemoryAppointmentStore::new();
        assert!(matches!(
            store.delete(Uuid::new_v4()).await.unwrap_err(),
            StoreError::NotFound
        ));
        assert!(matches!(
            store
                .update(Uuid::new_v4(), AppointmentChanges::default())
                .await
                .unwrap_err(),
            StoreError::NotFound
        ));
    }
}
