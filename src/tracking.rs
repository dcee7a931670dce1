//! Optional error-tracking sink.
//!
//! The reporter is a no-op unless ERROR_TRACKING_DSN is configured, so
//! the rest of the code can report unconditionally.

use std::sync::Arc;

pub trait ErrorReporter: Send + Sync {
    /// Fire-and-forget; must never fail the caller.
    fn report(&self, message: &str);
}

pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn report(&self, _message: &str) {}
}

/// Posts a minimal JSON event to the configured DSN.
pub struct HttpReporter {
    client: reqwest::Client,
    dsn: String,
}

impl HttpReporter {
    pub fn new(dsn: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            dsn,
        }
    }
}

impl ErrorReporter for HttpReporter {
    fn report(&self, message: &str) {
        let client = self.client.clone();
        let dsn = self.dsn.clone();
        let event = serde_json::json!({
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        // Reporting must not block or fail request handling.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = client.post(&dsn).json(&event).send().await {
                    tracing::warn!("error tracking delivery failed: {e}");
                }
            });
        }
    }
}

pub fn from_dsn(dsn: Option<String>) -> Arc<dyn ErrorReporter> {
    match dsn {
        Some(dsn) => Arc::new(HttpReporter::new(dsn)),
        None => Arc::new(NoopReporter),
    }
}
