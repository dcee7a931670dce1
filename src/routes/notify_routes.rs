// src/routes/notify_routes.rs
//
// The server boundary behind the public appointment form: origin
// allow-list, rate limit, defense-in-depth re-validation, persistence,
// then the two notification emails. The envelope is
// {success, data | error}, distinct from the admin API envelope.

use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::Response,
    routing::any,
    Router,
};
use chrono::{Datelike, NaiveDate, Utc};
use std::sync::Arc;

use crate::{
    config::{MailConfig, SiteContact},
    mailer::{Mailer, OutboundEmail},
    notify::{self, AppointmentPayload},
    rate_limit::RateLimiter,
    sanitize,
    store::appointments::{AppointmentStore, NewAppointment},
    tracking::ErrorReporter,
    validation,
};

const BODY_LIMIT: usize = 64 * 1024;

#[derive(Clone)]
pub struct NotifyState {
    pub appointments: Arc<dyn AppointmentStore>,
    pub mailer: Arc<dyn Mailer>,
    pub limiter: Arc<dyn RateLimiter>,
    pub reporter: Arc<dyn ErrorReporter>,
    pub allowed_origins: Vec<String>,
    pub mail: MailConfig,
    pub contact: SiteContact,
}

pub fn router(state: NotifyState) -> Router {
    Router::new()
        .route(
            "/functions/send-appointment-email",
            any(send_appointment_email),
        )
        .with_state(state)
}

/* ============================================================
   Response helpers
   ============================================================ */

fn apply_cors(builder: axum::http::response::Builder, origin: Option<&str>) -> axum::http::response::Builder {
    let builder = builder
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization");
    match origin {
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => builder.header("Access-Control-Allow-Origin", value),
            Err(_) => builder,
        },
        None => builder,
    }
}

/// JSON envelope with the CORS headers; `origin` is the validated origin
/// to echo, or None to omit the allow-origin header.
fn envelope(status: StatusCode, origin: Option<&str>, body: serde_json::Value) -> Response {
    apply_cors(Response::builder().status(status), origin)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap_or_else(|_| Response::new(axum::body::Body::empty()))
}

fn failure(status: StatusCode, origin: Option<&str>, message: &str) -> Response {
    envelope(
        status,
        origin,
        serde_json::json!({ "success": false, "error": message }),
    )
}

/* ============================================================
   POST /functions/send-appointment-email
   ============================================================ */

pub async fn send_appointment_email(State(state): State<NotifyState>, req: Request) -> Response {
    let origin_header = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let origin_allowed = origin_header
        .as_deref()
        .map(|o| state.allowed_origins.iter().any(|allowed| allowed == o))
        .unwrap_or(false);
    let echo_origin = if origin_allowed {
        origin_header.as_deref()
    } else {
        None
    };

    // CORS preflight
    if req.method() == Method::OPTIONS {
        return apply_cors(Response::builder().status(StatusCode::OK), echo_origin)
            .body(axum::body::Body::from("ok"))
            .unwrap_or_else(|_| Response::new(axum::body::Body::empty()));
    }

    if req.method() != Method::POST {
        return failure(StatusCode::METHOD_NOT_ALLOWED, echo_origin, "Method not allowed");
    }

    if !origin_allowed {
        tracing::warn!(
            "rejected appointment request from unauthorized origin: {:?}",
            origin_header
        );
        return failure(StatusCode::FORBIDDEN, None, "Origin not allowed");
    }

    if state.limiter.try_acquire().is_err() {
        tracing::warn!("appointment notification rate limit exceeded");
        return failure(
            StatusCode::TOO_MANY_REQUESTS,
            echo_origin,
            "Too many requests. Please try again later.",
        );
    }

    let payload = match to_bytes(req.into_body(), BODY_LIMIT).await {
        Ok(bytes) => match serde_json::from_slice::<AppointmentPayload>(&bytes) {
            Ok(payload) => payload,
            Err(_) => return failure(StatusCode::BAD_REQUEST, echo_origin, "Invalid request body"),
        },
        Err(_) => return failure(StatusCode::BAD_REQUEST, echo_origin, "Invalid request body"),
    };

    // The client already validated; the server must not trust the client.
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.phone.trim().is_empty()
    {
        return failure(
            StatusCode::BAD_REQUEST,
            echo_origin,
            "Missing required fields: name, email, and phone",
        );
    }

    let email = payload.email.trim().to_lowercase();
    if !validation::is_valid_email(&email) {
        return failure(StatusCode::BAD_REQUEST, echo_origin, "Invalid email format");
    }

    let payload = AppointmentPayload {
        name: sanitize::clean(payload.name.trim()),
        email: sanitize::clean(&email),
        phone: sanitize::clean(payload.phone.trim()),
        procedure: sanitize::clean(payload.procedure.trim()),
        date: payload.date.trim().to_string(),
        message: sanitize::clean(payload.message.trim()),
    };

    tracing::info!(
        "received appointment request: {} <{}> ({})",
        payload.name,
        payload.email,
        payload.procedure
    );

    // Persist the intake so the admin dashboard sees it as pending.
    let new = NewAppointment {
        name: payload.name.clone(),
        email: payload.email.clone(),
        phone: payload.phone.clone(),
        procedure: payload.procedure.clone(),
        preferred_date: NaiveDate::parse_from_str(&payload.date, "%Y-%m-%d").ok(),
        message: if payload.message.is_empty() {
            None
        } else {
            Some(payload.message.clone())
        },
    };
    if let Err(e) = state.appointments.create(new).await {
        tracing::error!("failed to store appointment request: {e}");
        state
            .reporter
            .report(&format!("appointment intake store failure: {e}"));
        return failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            echo_origin,
            "Failed to store appointment request",
        );
    }

    let year = Utc::now().year();

    let operator_email = OutboundEmail {
        from: state.mail.from.clone(),
        to: vec![state.mail.operator_email.clone()],
        subject: notify::operator_subject(&payload.name),
        html: notify::operator_email_html(&payload, &state.contact.clinic_name, year),
        reply_to: Some(payload.email.clone()),
    };

    let receipt = match state.mailer.send(&operator_email).await {
        Ok(receipt) => receipt,
        Err(e) => {
            tracing::error!("operator notification failed: {e}");
            state
                .reporter
                .report(&format!("operator notification failure: {e}"));
            return failure(StatusCode::INTERNAL_SERVER_ERROR, echo_origin, &e.to_string());
        }
    };

    let patient_email = OutboundEmail {
        from: state.mail.from.clone(),
        to: vec![payload.email.clone()],
        subject: notify::PATIENT_SUBJECT.to_string(),
        html: notify::patient_email_html(&payload.name, &state.contact, year),
        reply_to: None,
    };

    if let Err(e) = state.mailer.send(&patient_email).await {
        tracing::error!("patient acknowledgment failed: {e}");
        state
            .reporter
            .report(&format!("patient acknowledgment failure: {e}"));
        return failure(StatusCode::INTERNAL_SERVER_ERROR, echo_origin, &e.to_string());
    }

    envelope(
        StatusCode::OK,
        echo_origin,
        serde_json::json!({ "success": true, "data": receipt }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::{MailError, MailReceipt};
    use crate::models::AppointmentStatus;
    use crate::rate_limit::FixedWindowLimiter;
    use crate::store::appointments::MemoryAppointmentStore;
    use crate::tracking::NoopReporter;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use http_body_util::BodyExt;
    use std::sync::Mutex;
    use tower::ServiceExt;

    const ALLOWED_ORIGIN: &str = "https://refineplasticsurgerytz.com";
    const ENDPOINT: &str = "/functions/send-appointment-email";

    struct RecordingMailer {
        sent: Mutex<Vec<OutboundEmail>>,
        fail: bool,
    }

    impl RecordingMailer {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                fail,
            })
        }

        fn sent(&self) -> Vec<OutboundEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutboundEmail) -> Result<MailReceipt, MailError> {
            if self.fail {
                return Err(MailError::Provider {
                    status: 503,
                    body: "provider unavailable".into(),
                });
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push(email.clone());
            Ok(MailReceipt {
                id: Some(format!("m_{}", sent.len())),
            })
        }
    }

    fn test_router(
        mailer: Arc<RecordingMailer>,
        cap: u32,
    ) -> (Router, Arc<MemoryAppointmentStore>) {
        let appointments = Arc::new(MemoryAppointmentStore::new());
        let state = NotifyState {
            appointments: appointments.clone(),
            mailer,
            limiter: Arc::new(FixedWindowLimiter::per_minute(cap)),
            reporter: Arc::new(NoopReporter),
            allowed_origins: vec![ALLOWED_ORIGIN.to_string()],
            mail: MailConfig {
                api_url: "http://localhost:0".into(),
                api_key: "test-key".into(),
                from: "Refine Appointments <appointments@example.com>".into(),
                operator_email: "info@example.com".into(),
            },
            contact: SiteContact {
                clinic_name: "Refine Plastic & Aesthetic Surgery Centre".into(),
                phone: "(+255) 793 145 167".into(),
                whatsapp_number: "+255793145167".into(),
                email: "info@example.com".into(),
            },
        };
        (router(state), appointments)
    }

    fn jane() -> serde_json::Value {
        serde_json::json!({
            "name": "Jane Doe",
            "email": "jane@x.com",
            "phone": "+255700000000",
            "procedure": "Rhinoplasty",
            "date": "",
            "message": ""
        })
    }

    fn post(origin: Option<&str>, body: serde_json::Value) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder()
            .method("POST")
            .uri(ENDPOINT)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(origin) = origin {
            builder = builder.header(header::ORIGIN, origin);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn allowed_origin_sends_both_emails_and_stores_the_intake() {
        let mailer = RecordingMailer::new(false);
        let (app, store) = test_router(mailer.clone(), 30);

        let response = app.oneshot(post(Some(ALLOWED_ORIGIN), jane())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("Access-Control-Allow-Origin")
                .and_then(|v| v.to_str().ok()),
            Some(ALLOWED_ORIGIN)
        );

        let body = body_json(response).await;
        assert_eq!(body["success"], serde_json::json!(true));
        assert_eq!(body["data"]["id"], serde_json::json!("m_1"));

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, vec!["info@example.com".to_string()]);
        assert_eq!(sent[0].reply_to.as_deref(), Some("jane@x.com"));
        assert!(sent[0].subject.contains("Jane Doe"));
        assert_eq!(sent[1].to, vec!["jane@x.com".to_string()]);
        assert!(sent[1].reply_to.is_none());

        let stored = store.list().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, AppointmentStatus::Pending);
        assert_eq!(stored[0].email, "jane@x.com");
    }

    #[tokio::test]
    async fn disallowed_origin_is_rejected_before_any_side_effect() {
        let mailer = RecordingMailer::new(false);
        let (app, store) = test_router(mailer.clone(), 30);

        let response = app
            .clone()
            .oneshot(post(Some("https://evil.example"), jane()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["success"], serde_json::json!(false));

        // missing origin is rejected the same way
        let response = app.oneshot(post(None, jane())).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        assert!(mailer.sent().is_empty());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_post_and_options_are_accepted() {
        let mailer = RecordingMailer::new(false);
        let (app, _store) = test_router(mailer.clone(), 30);

        let request = HttpRequest::builder()
            .method("GET")
            .uri(ENDPOINT)
            .header(header::ORIGIN, ALLOWED_ORIGIN)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = body_json(response).await;
        assert_eq!(body["error"], serde_json::json!("Method not allowed"));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn preflight_echoes_the_validated_origin() {
        let mailer = RecordingMailer::new(false);
        let (app, _store) = test_router(mailer, 30);

        let request = HttpRequest::builder()
            .method("OPTIONS")
            .uri(ENDPOINT)
            .header(header::ORIGIN, ALLOWED_ORIGIN)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("Access-Control-Allow-Origin")
                .and_then(|v| v.to_str().ok()),
            Some(ALLOWED_ORIGIN)
        );
        assert_eq!(
            response
                .headers()
                .get("Access-Control-Allow-Methods")
                .and_then(|v| v.to_str().ok()),
            Some("POST, OPTIONS")
        );
    }

    #[tokio::test]
    async fn the_31st_request_in_a_minute_is_rate_limited() {
        let mailer = RecordingMailer::new(false);
        let (app, _store) = test_router(mailer.clone(), 30);

        for _ in 0..30 {
            let response = app
                .clone()
                .oneshot(post(Some(ALLOWED_ORIGIN), jane()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.oneshot(post(Some(ALLOWED_ORIGIN), jane())).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = body_json(response).await;
        assert_eq!(body["success"], serde_json::json!(false));
        assert_eq!(mailer.sent().len(), 60);
    }

    #[tokio::test]
    async fn missing_required_fields_are_rejected() {
        let mailer = RecordingMailer::new(false);
        let (app, _store) = test_router(mailer.clone(), 30);

        let mut payload = jane();
        payload["phone"] = serde_json::json!("  ");
        let response = app.oneshot(post(Some(ALLOWED_ORIGIN), payload)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(
            body["error"],
            serde_json::json!("Missing required fields: name, email, and phone")
        );
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn malformed_email_is_rejected() {
        let mailer = RecordingMailer::new(false);
        let (app, store) = test_router(mailer.clone(), 30);

        let mut payload = jane();
        payload["email"] = serde_json::json!("not-an-email");
        let response = app.oneshot(post(Some(ALLOWED_ORIGIN), payload)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], serde_json::json!("Invalid email format"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_maps_to_500_envelope() {
        let mailer = RecordingMailer::new(true);
        let (app, store) = test_router(mailer, 30);

        let response = app.oneshot(post(Some(ALLOWED_ORIGIN), jane())).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["success"], serde_json::json!(false));
        assert!(body["error"].as_str().unwrap().contains("503"));

        // the intake row is persisted before dispatch; failure is visible
        // to the operator even when the provider is down
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn markup_is_stripped_and_escaped_before_rendering() {
        let mailer = RecordingMailer::new(false);
        let (app, store) = test_router(mailer.clone(), 30);

        let mut payload = jane();
        payload["name"] = serde_json::json!("Jane <script>alert(1)</script>");
        payload["message"] = serde_json::json!("hello <b>there</b> & goodbye");
        let response = app.oneshot(post(Some(ALLOWED_ORIGIN), payload)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let sent = mailer.sent();
        assert!(!sent[0].html.contains("<script"));
        assert!(sent[0].html.contains("hello there &amp; goodbye"));

        let stored = store.list().await.unwrap();
        assert_eq!(stored[0].name, "Jane alert(1)");
    }
}
