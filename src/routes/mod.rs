use crate::models::AppState;
use axum::http::header;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub mod analytics_routes;
pub mod appointment_routes;
pub mod auth_routes;
pub mod blog_routes;
pub mod dashboard_routes;
pub mod gallery_routes;
pub mod notify_routes;
pub mod procedure_routes;
pub mod site_routes;
pub mod team_routes;

pub fn router(state: AppState, notify_state: notify_routes::NotifyState) -> Router {
    // Admin/site API CORS: permissive so the dashboard SPA can call it.
    // The notification endpoint enforces its own strict allow-list and is
    // mounted outside this layer.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]);

    let api = Router::new()
        .nest("/api/v1/auth", auth_routes::router())
        .nest("/api/v1", appointment_routes::router())
        .nest("/api/v1", blog_routes::router())
        .nest("/api/v1", gallery_routes::router())
        .nest("/api/v1", team_routes::router())
        .nest("/api/v1", dashboard_routes::router())
        .nest("/api/v1", analytics_routes::router())
        .nest("/api/v1", procedure_routes::router())
        .nest("/api/v1", site_routes::router())
        .with_state(state)
        .layer(cors);

    api.merge(notify_routes::router(notify_state))
}
