//! Declarative checks for the public appointment form.
//!
//! Pure and synchronous: the same draft always produces the same result.
//! Field messages are written for end users and surfaced inline next to
//! the offending input.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::procedures;

// Permissive international phone shape: optional +, grouping with spaces,
// dashes, dots, parentheses.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+]?[(]?[0-9]{1,4}[)]?[-\s.]?[(]?[0-9]{1,4}[)]?[-\s.]?[0-9]{1,9}$")
        .expect("phone pattern")
});

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

/// Shape check shared with the dispatcher's defense-in-depth pass.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Raw form fields exactly as the visitor typed them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppointmentDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub procedure: String,
    pub date: String,
    pub message: String,
}

/// A draft that passed every rule, trimmed and normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidAppointment {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub procedure: String,
    pub preferred_date: Option<NaiveDate>,
    pub message: String,
}

/// Field name -> human-readable message. BTreeMap keeps reporting order
/// stable across runs.
pub type FieldErrors = BTreeMap<&'static str, String>;

pub fn validate(draft: &AppointmentDraft) -> Result<ValidAppointment, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = draft.name.trim();
    match name.chars().count() {
        0..=1 => {
            errors.insert("name", "Name must be at least 2 characters".into());
        }
        2..=100 => {}
        _ => {
            errors.insert("name", "Name must be less than 100 characters".into());
        }
    }

    let email = draft.email.trim().to_lowercase();
    if email.chars().count() > 255 {
        errors.insert("email", "Email must be less than 255 characters".into());
    } else if !EMAIL_RE.is_match(&email) {
        errors.insert("email", "Please enter a valid email address".into());
    }

    let phone = draft.phone.trim();
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < 7 {
        errors.insert("phone", "Phone number must be at least 7 digits".into());
    } else if phone.chars().count() > 20 {
        errors.insert("phone", "Phone number must be less than 20 characters".into());
    } else if !PHONE_RE.is_match(phone) {
        errors.insert(
            "phone",
            "Please enter a valid phone number (e.g., +255 793 145 167)".into(),
        );
    }

    let procedure = draft.procedure.trim();
    if procedure.is_empty() {
        errors.insert("procedure", "Please select a procedure of interest".into());
    } else if procedure.chars().count() > 100 {
        errors.insert(
            "procedure",
            "Procedure name must be less than 100 characters".into(),
        );
    } else if !procedures::is_known_procedure(procedure) {
        errors.insert("procedure", "Please select a procedure from the list".into());
    }

    let date = draft.date.trim();
    let preferred_date = if date.is_empty() {
        None
    } else {
        match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => {
                errors.insert("date", "Preferred date must be YYYY-MM-DD".into());
                None
            }
        }
    };

    let message = draft.message.trim();
    if message.chars().count() > 1000 {
        errors.insert("message", "Message must be less than 1000 characters".into());
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidAppointment {
        name: name.to_string(),
        email,
        phone: phone.to_string(),
        procedure: procedure.to_string(),
        preferred_date,
        message: message.to_string(),
    })
}
