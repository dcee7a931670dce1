use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;

use crate::{
    analytics::{self, AnalyticsSnapshot},
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{ApiOk, AppState},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/analytics", get(get_analytics))
}

/// Recomputed from the full appointment collection on every fetch.
pub async fn get_analytics(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<ApiOk<AnalyticsSnapshot>>, ApiError> {
    let appointments = state.appointments.list().await?;
    let snapshot = analytics::analytics_snapshot(&appointments, Utc::now());
    Ok(Json(ApiOk { data: snapshot }))
}
