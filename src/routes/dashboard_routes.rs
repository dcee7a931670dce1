use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::{
    analytics::{self, ActivityItem, DashboardStats},
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{ApiOk, AppState},
    store::{blog_posts, gallery_images},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub stats: DashboardStats,
    pub recent_activity: Vec<ActivityItem>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<ApiOk<DashboardData>>, ApiError> {
    let appointments = state.appointments.list().await?;
    let posts = blog_posts::list(&state.db).await?;
    let images = gallery_images::list(&state.db).await?;

    let stats = analytics::dashboard_stats(&appointments, &posts, &images, Utc::now());
    let recent_activity = analytics::recent_activity(&appointments, &posts, &images);

    Ok(Json(ApiOk {
        data: DashboardData {
            stats,
            recent_activity,
        },
    }))
}
