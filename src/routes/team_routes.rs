// src/routes/team_routes.rs

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{ApiOk, AppState, TeamMemberRow},
    store::team_members::{self, NewTeamMember, TeamMemberChanges},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/team_members", get(list_members).post(create_member))
        .route(
            "/team_members/{member_id}",
            get(get_member).patch(update_member).delete(delete_member),
        )
        // Public roster, no auth
        .route("/site/team", get(public_team))
}

#[derive(Debug, Serialize)]
pub struct TeamMutation {
    pub data: TeamMemberRow,
    pub team_members: Vec<TeamMemberRow>,
}

pub async fn list_members(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<ApiOk<Vec<TeamMemberRow>>>, ApiError> {
    let members = team_members::list(&state.db).await?;
    Ok(Json(ApiOk { data: members }))
}

pub async fn public_team(
    State(state): State<AppState>,
) -> Result<Json<ApiOk<Vec<TeamMemberRow>>>, ApiError> {
    let members = team_members::list(&state.db).await?;
    Ok(Json(ApiOk { data: members }))
}

pub async fn get_member(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(member_id): Path<Uuid>,
) -> Result<Json<ApiOk<TeamMemberRow>>, ApiError> {
    let members = team_members::list(&state.db).await?;
    members
        .into_iter()
        .find(|m| m.id == member_id)
        .map(|m| Json(ApiOk { data: m }))
        .ok_or_else(|| ApiError::NotFound("NOT_FOUND", "team member not found".into()))
}

pub async fn create_member(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(req): Json<NewTeamMember>,
) -> Result<Json<TeamMutation>, ApiError> {
    if req.name.trim().is_empty() || req.role.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "name and role are required".into(),
        ));
    }

    let member = team_members::create(&state.db, req).await?;
    let members = team_members::list(&state.db).await?;
    Ok(Json(TeamMutation {
        data: member,
        team_members: members,
    }))
}

pub async fn update_member(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(member_id): Path<Uuid>,
    Json(req): Json<TeamMemberChanges>,
) -> Result<Json<TeamMutation>, ApiError> {
    let member = team_members::update(&state.db, member_id, req).await?;
    let members = team_members::list(&state.db).await?;
    Ok(Json(TeamMutation {
        data: member,
        team_members: members,
    }))
}

pub async fn delete_member(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(member_id): Path<Uuid>,
) -> Result<Json<ApiOk<Vec<TeamMemberRow>>>, ApiError> {
    team_members::delete(&state.db, member_id).await?;
    let members = team_members::list(&state.db).await?;
    Ok(Json(ApiOk { data: members }))
}
