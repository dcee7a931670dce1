// src/routes/procedure_routes.rs

use axum::{routing::get, Json, Router};

use crate::{
    models::{ApiOk, AppState},
    procedures::{ProcedureCategory, PROCEDURE_CATALOG},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/procedures", get(list_procedures))
}

/// Public: the fixed catalog the appointment form selects from.
pub async fn list_procedures() -> Json<ApiOk<&'static [ProcedureCategory]>> {
    Json(ApiOk {
        data: PROCEDURE_CATALOG,
    })
}
