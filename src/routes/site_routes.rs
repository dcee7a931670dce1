// src/routes/site_routes.rs

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::models::{ApiOk, AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/site/contact", get(site_contact))
}

#[derive(Debug, Serialize)]
pub struct SiteContactData {
    pub clinic_name: String,
    pub phone: String,
    pub whatsapp_number: String,
    pub email: String,
}

/// Public: contact details for the site header/footer and the WhatsApp
/// button.
pub async fn site_contact(State(state): State<AppState>) -> Json<ApiOk<SiteContactData>> {
    Json(ApiOk {
        data: SiteContactData {
            clinic_name: state.contact.clinic_name.clone(),
            phone: state.contact.phone.clone(),
            whatsapp_number: state.contact.whatsapp_number.clone(),
            email: state.contact.email.clone(),
        },
    })
}
