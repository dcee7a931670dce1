// src/routes/appointment_routes.rs

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    export,
    middleware::auth_context::AuthContext,
    models::{ApiOk, AppState, AppointmentRow, AppointmentStatus},
    sanitize,
    store::appointments::{AppointmentChanges, NewAppointment},
    validation::{validate, AppointmentDraft},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/appointments",
            get(list_appointments).post(create_appointment),
        )
        .route("/appointments/export", get(export_appointments))
        .route(
            "/appointments/{appointment_id}",
            get(get_appointment)
                .patch(update_appointment)
                .delete(delete_appointment),
        )
}

/* ============================================================
   Response DTOs
   ============================================================ */

/// Mutation responses carry the changed row plus the re-fetched list so
/// the dashboard has read-your-writes consistency in one round trip.
#[derive(Debug, Serialize)]
pub struct AppointmentMutation {
    pub data: AppointmentRow,
    pub appointments: Vec<AppointmentRow>,
}

/* ============================================================
   GET /appointments
   ============================================================ */

pub async fn list_appointments(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<ApiOk<Vec<AppointmentRow>>>, ApiError> {
    let appointments = state.appointments.list().await?;
    Ok(Json(ApiOk { data: appointments }))
}

/* ============================================================
   GET /appointments/{id}
   ============================================================ */

pub async fn get_appointment(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<ApiOk<AppointmentRow>>, ApiError> {
    let appointment = state
        .appointments
        .get(appointment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("NOT_FOUND", "appointment not found".into()))?;
    Ok(Json(ApiOk { data: appointment }))
}

/* ============================================================
   POST /appointments (manual entry by an operator)
   ============================================================ */

pub async fn create_appointment(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(draft): Json<AppointmentDraft>,
) -> Result<Json<AppointmentMutation>, ApiError> {
    let valid = validate(&draft).map_err(|errors| {
        let detail: Vec<String> = errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        ApiError::BadRequest("VALIDATION_ERROR", detail.join("; "))
    })?;

    let new = NewAppointment {
        name: sanitize::clean(&valid.name),
        email: sanitize::clean(&valid.email),
        phone: sanitize::clean(&valid.phone),
        procedure: sanitize::clean(&valid.procedure),
        preferred_date: valid.preferred_date,
        message: if valid.message.is_empty() {
            None
        } else {
            Some(sanitize::clean(&valid.message))
        },
    };

    let (appointment, appointments) = state.appointments.create_refreshed(new).await?;
    Ok(Json(AppointmentMutation {
        data: appointment,
        appointments,
    }))
}

/* ============================================================
   PATCH /appointments/{id} (status transition + admin notes)
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

pub async fn update_appointment(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
    Json(req): Json<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentMutation>, ApiError> {
    let changes = AppointmentChanges {
        status: req.status,
        notes: req.notes.map(|n| sanitize::clean(&n)),
    };

    let (appointment, appointments) = state
        .appointments
        .update_refreshed(appointment_id, changes)
        .await?;
    Ok(Json(AppointmentMutation {
        data: appointment,
        appointments,
    }))
}

/* ============================================================
   DELETE /appointments/{id}
   ============================================================ */

pub async fn delete_appointment(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<ApiOk<Vec<AppointmentRow>>>, ApiError> {
    let appointments = state.appointments.delete_refreshed(appointment_id).await?;
    Ok(Json(ApiOk { data: appointments }))
}

/* ============================================================
   GET /appointments/export
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

pub async fn export_appointments(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(q): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let status = match q.status.as_deref() {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(AppointmentStatus::try_from(raw.to_string()).map_err(|e| {
            ApiError::BadRequest("VALIDATION_ERROR", e.to_string())
        })?),
    };

    let appointments = state.appointments.list().await?;
    let filtered =
        export::filter_appointments(&appointments, q.search.as_deref().unwrap_or(""), status);
    let csv = export::appointments_to_csv(&filtered);

    let filename = export::export_filename(Utc::now());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response())
}
