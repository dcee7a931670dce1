use std::sync::Arc;

use refine_server::{
    config::Config,
    db,
    mailer::HttpMailer,
    models::AppState,
    rate_limit::FixedWindowLimiter,
    routes,
    routes::notify_routes::NotifyState,
    storage::LocalDiskStorage,
    store::appointments::PgAppointmentStore,
    tracking,
};

use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cfg = Config::from_env()?;
    let pool = db::connect_pg(&cfg.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let appointments = Arc::new(PgAppointmentStore::new(pool.clone()));
    let storage = Arc::new(LocalDiskStorage::new(
        cfg.upload_dir.clone(),
        cfg.upload_base_url.clone(),
    ));
    let reporter = tracking::from_dsn(cfg.error_tracking_dsn.clone());
    let mailer = Arc::new(HttpMailer::new(
        cfg.mail.api_url.clone(),
        cfg.mail.api_key.clone(),
    ));
    let limiter = Arc::new(FixedWindowLimiter::per_minute(cfg.rate_limit_per_minute));

    let state = AppState {
        db: pool,
        session_ttl_hours: cfg.session_ttl_hours,
        appointments: appointments.clone(),
        storage,
        reporter: reporter.clone(),
        contact: cfg.contact.clone(),
    };

    let notify_state = NotifyState {
        appointments,
        mailer,
        limiter,
        reporter: reporter.clone(),
        allowed_origins: cfg.allowed_origins.clone(),
        mail: cfg.mail.clone(),
        contact: cfg.contact.clone(),
    };

    // Top-level catch-all: an unhandled panic becomes a static error body
    // and goes to the tracking sink instead of tearing down the connection.
    let panic_reporter = reporter.clone();
    let catch_panic = CatchPanicLayer::custom(move |err: Box<dyn std::any::Any + Send>| {
        let detail = if let Some(s) = err.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = err.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        tracing::error!("handler panicked: {detail}");
        panic_reporter.report(&format!("handler panic: {detail}"));
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(serde_json::json!({
                "error": { "code": "INTERNAL", "message": "Something went wrong" }
            })),
        )
            .into_response()
    });

    let app = routes::router(state, notify_state)
        .nest_service("/uploads", ServeDir::new(&cfg.upload_dir))
        .layer(catch_panic)
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on http://{}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
