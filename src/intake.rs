//! Appointment submission flow for a single form instance.
//!
//! Drives validate -> sanitize -> dispatch for the public form: at most
//! one submission in flight, the dispatcher invoked exactly once per
//! accepted submit (retry is the user re-submitting), the draft preserved
//! on failure and cleared on success. After three consecutive failures the
//! outcome carries the clinic phone as an alternate contact channel.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::classify::{classify, SubmissionError};
use crate::notify::AppointmentPayload;
use crate::sanitize;
use crate::validation::{validate, AppointmentDraft, FieldErrors, ValidAppointment};

pub const SUCCESS_MESSAGE: &str =
    "We've received your appointment request. We'll contact you within 24 hours to confirm.";

const ALTERNATE_CONTACT_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DispatchReceipt {
    pub id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct DispatchError {
    pub message: String,
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, payload: &AppointmentPayload)
        -> Result<DispatchReceipt, DispatchError>;
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// A submission was already in flight; this one was dropped silently.
    Rejected,
    /// Per-field validation errors; nothing was sent.
    Invalid(FieldErrors),
    Accepted {
        receipt: DispatchReceipt,
    },
    Failed {
        error: SubmissionError,
        alternate_contact: Option<String>,
    },
}

pub struct SubmissionFlow<D> {
    dispatcher: D,
    fallback_phone: String,
    draft: Mutex<AppointmentDraft>,
    in_flight: AtomicBool,
    consecutive_failures: AtomicU32,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn sanitized_payload(valid: &ValidAppointment) -> AppointmentPayload {
    AppointmentPayload {
        name: sanitize::clean(&valid.name),
        email: sanitize::clean(&valid.email),
        phone: sanitize::clean(&valid.phone),
        procedure: sanitize::clean(&valid.procedure),
        date: valid
            .preferred_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        message: sanitize::clean(&valid.message),
    }
}

impl<D: NotificationDispatcher> SubmissionFlow<D> {
    pub fn new(dispatcher: D, fallback_phone: impl Into<String>) -> Self {
        Self {
            dispatcher,
            fallback_phone: fallback_phone.into(),
            draft: Mutex::new(AppointmentDraft::default()),
            in_flight: AtomicBool::new(false),
            consecutive_failures: AtomicU32::new(0),
        }
    }

    pub fn set_draft(&self, draft: AppointmentDraft) {
        *self.draft.lock().unwrap_or_else(|e| e.into_inner()) = draft;
    }

    pub fn draft(&self) -> AppointmentDraft {
        self.draft.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::SeqCst)
    }

    pub async fn submit(&self) -> SubmitOutcome {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return SubmitOutcome::Rejected;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let draft = self.draft();
        let valid = match validate(&draft) {
            Ok(valid) => valid,
            Err(errors) => return SubmitOutcome::Invalid(errors),
        };

        let payload = sanitized_payload(&valid);
        match self.dispatcher.dispatch(&payload).await {
            Ok(receipt) => {
                *self.draft.lock().unwrap_or_else(|e| e.into_inner()) =
                    AppointmentDraft::default();
                self.consecutive_failures.store(0, Ordering::SeqCst);
                SubmitOutcome::Accepted { receipt }
            }
            Err(err) => {
                let error = classify(&err.to_string());
                let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
                let alternate_contact = (failures >= ALTERNATE_CONTACT_THRESHOLD)
                    .then(|| self.fallback_phone.clone());
                SubmitOutcome::Failed {
                    error,
                    alternate_contact,
                }
            }
        }
    }
}

/* ============================================================
   HTTP dispatcher client
   ============================================================ */

pub struct HttpNotificationDispatcher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNotificationDispatcher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DispatchEnvelope {
    #[serde(default)]
    success: bool,
    data: Option<DispatchReceipt>,
    error: Option<String>,
}

#[async_trait]
impl NotificationDispatcher for HttpNotificationDispatcher {
    async fn dispatch(
        &self,
        payload: &AppointmentPayload,
    ) -> Result<DispatchReceipt, DispatchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| DispatchError {
                message: format!("network error: {e}"),
            })?;

        let status = response.status();
        let envelope: DispatchEnvelope =
            response.json().await.map_err(|e| DispatchError {
                message: format!("malformed response from server: {e}"),
            })?;

        if status.is_success() && envelope.success {
            Ok(envelope.data.unwrap_or_default())
        } else {
            Err(DispatchError {
                message: format!(
                    "{}: {}",
                    status.as_u16(),
                    envelope.error.unwrap_or_else(|| "request failed".to_string())
                ),
            })
        }
    }
}
