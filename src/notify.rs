//! HTML rendering for the two appointment notification emails.
//!
//! Every interpolated field goes through `escape_html`, on top of the
//! markup stripping already applied to the payload. The operator email
//! carries all submitted fields; the patient acknowledgment is a
//! personalized static body with the clinic phone as a fallback channel.

use serde::{Deserialize, Serialize};

use crate::config::SiteContact;

/// Wire shape of the dispatcher request body. All fields are strings;
/// `date` is an ISO date or empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub procedure: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub message: String,
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn operator_subject(name: &str) -> String {
    format!("New Appointment Request from {}", escape_html(name))
}

pub const PATIENT_SUBJECT: &str = "Appointment Request Received - Refine Plastic Surgery";

fn field_block(label: &str, value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    format!(
        r#"<div class="field"><div class="label">{label}:</div><div class="value">{}</div></div>"#,
        escape_html(value)
    )
}

/// Operator-facing notification listing every submitted field.
pub fn operator_email_html(payload: &AppointmentPayload, clinic_name: &str, year: i32) -> String {
    let fields = [
        field_block("Patient Name", &payload.name),
        field_block("Email Address", &payload.email),
        field_block("Phone Number", &payload.phone),
        field_block("Procedure of Interest", &payload.procedure),
        field_block("Preferred Date", &payload.date),
        field_block("Additional Message", &payload.message),
    ]
    .join("\n            ");

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <style>
      body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
      .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
      .header {{ background: linear-gradient(135deg, #C41E7D 0%, #E91E8C 100%); color: white; padding: 20px; text-align: center; border-radius: 8px 8px 0 0; }}
      .content {{ background: #f9f9f9; padding: 20px; border: 1px solid #ddd; border-top: none; border-radius: 0 0 8px 8px; }}
      .field {{ margin-bottom: 15px; }}
      .label {{ font-weight: bold; color: #C41E7D; }}
      .value {{ margin-top: 5px; word-break: break-word; }}
      .footer {{ text-align: center; margin-top: 20px; font-size: 12px; color: #666; }}
    </style>
  </head>
  <body>
    <div class="container">
      <div class="header">
        <h1>New Appointment Request</h1>
        <p>{clinic}</p>
      </div>
      <div class="content">
            {fields}
      </div>
      <div class="footer">
        <p>This email was sent from the website appointment form.</p>
        <p>&copy; {year} {clinic}</p>
      </div>
    </div>
  </body>
</html>"#,
        clinic = escape_html(clinic_name),
    )
}

/// Patient-facing acknowledgment with the phone fallback.
pub fn patient_email_html(name: &str, contact: &SiteContact, year: i32) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <style>
      body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
      .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
      .header {{ background: linear-gradient(135deg, #C41E7D 0%, #E91E8C 100%); color: white; padding: 20px; text-align: center; border-radius: 8px 8px 0 0; }}
      .content {{ background: #f9f9f9; padding: 20px; border: 1px solid #ddd; border-top: none; border-radius: 0 0 8px 8px; }}
      .footer {{ text-align: center; margin-top: 20px; font-size: 12px; color: #666; }}
    </style>
  </head>
  <body>
    <div class="container">
      <div class="header">
        <h1>Thank You for Your Request</h1>
        <p>{clinic}</p>
      </div>
      <div class="content">
        <p>Dear {name},</p>
        <p>Thank you for your interest in {clinic}. We have received your appointment request and our team will contact you within 24 hours to confirm your consultation.</p>
        <p>If you have any urgent questions, please don't hesitate to call us at <strong>{phone}</strong>.</p>
        <p>Best regards,<br>The Refine Team</p>
      </div>
      <div class="footer">
        <p>&copy; {year} {clinic}</p>
        <p>{email} | refineplasticsurgerytz.com</p>
      </div>
    </div>
  </body>
</html>"#,
        clinic = escape_html(&contact.clinic_name),
        name = escape_html(name),
        phone = escape_html(&contact.phone),
        email = escape_html(&contact.email),
    )
}
