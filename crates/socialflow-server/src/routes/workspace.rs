use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use socialflow_core::{MemberView, WorkspaceView};
use socialflow_org::{
    Invite, Membership, SettingsPatch, Tenant, TenantSettings, TenantSummary, WorkspaceRole,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::{CurrentActor, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub email: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: String,
}

fn parse_role(role: &str) -> ApiResult<WorkspaceRole> {
    WorkspaceRole::parse(role).ok_or_else(|| ApiError::bad_request(format!("unknown role: {role}")))
}

pub async fn current(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<WorkspaceView>> {
    Ok(Json(state.app.workspaces.workspace(&actor, Utc::now()).await?))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateWorkspaceRequest>,
) -> ApiResult<(StatusCode, Json<Tenant>)> {
    let tenant = state
        .app
        .workspaces
        .create_tenant(&user, &req.name, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(tenant)))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<TenantSummary>>> {
    Ok(Json(state.app.workspaces.list_workspaces(user.id, Utc::now()).await?))
}

pub async fn switch(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(tenant_id): Path<Uuid>,
) -> ApiResult<Json<TenantSummary>> {
    let summary = state
        .app
        .workspaces
        .switch_workspace(user.id, tenant_id, Utc::now())
        .await?;
    Ok(Json(summary))
}

pub async fn update_settings(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(patch): Json<SettingsPatch>,
) -> ApiResult<Json<TenantSettings>> {
    let settings = state
        .app
        .workspaces
        .update_settings(&actor, patch, Utc::now())
        .await?;
    Ok(Json(settings))
}

pub async fn invite(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<InviteRequest>,
) -> ApiResult<(StatusCode, Json<Invite>)> {
    let role = parse_role(&req.role)?;
    let invite = state
        .app
        .workspaces
        .invite(&actor, &req.email, role, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(invite)))
}

pub async fn invites(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<Invite>>> {
    Ok(Json(state.app.workspaces.list_invites(&actor, Utc::now()).await?))
}

pub async fn accept_invite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Membership>> {
    let membership = state
        .app
        .workspaces
        .accept_invite(user.id, id, Utc::now())
        .await?;
    Ok(Json(membership))
}

pub async fn decline_invite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Invite>> {
    let invite = state
        .app
        .workspaces
        .decline_invite(user.id, id, Utc::now())
        .await?;
    Ok(Json(invite))
}

pub async fn members(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<MemberView>>> {
    Ok(Json(state.app.workspaces.list_members(&actor, Utc::now()).await?))
}

pub async fn update_role(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(user_id): Path<Uuid>,
    Query(query): Query<RoleQuery>,
) -> ApiResult<Json<Membership>> {
    let role = parse_role(&query.role)?;
    let membership = state
        .app
        .workspaces
        .update_role(&actor, user_id, role, Utc::now())
        .await?;
    Ok(Json(membership))
}

pub async fn remove_member(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(user_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .app
        .workspaces
        .remove_member(&actor, user_id, Utc::now())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
