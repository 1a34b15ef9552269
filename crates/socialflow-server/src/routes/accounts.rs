use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use socialflow_connectors::Platform;
use socialflow_core::{OauthConnection, SocialAccount, TestPostResult};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentActor;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub platform: String,
    pub account_name: String,
}

#[derive(Debug, Deserialize)]
pub struct OauthRequest {
    pub platform: String,
    #[serde(default)]
    pub account_name: String,
    pub page_id: String,
    pub access_token: String,
}

fn parse_platform(platform: &str) -> ApiResult<Platform> {
    Platform::parse(platform).ok_or_else(|| ApiError::bad_request(format!("unknown platform: {platform}")))
}

pub async fn connect(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<ConnectRequest>,
) -> ApiResult<(StatusCode, Json<SocialAccount>)> {
    let platform = parse_platform(&req.platform)?;
    let account = state
        .app
        .accounts
        .connect_mock(&actor, platform, &req.account_name, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn connect_oauth(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<OauthRequest>,
) -> ApiResult<(StatusCode, Json<SocialAccount>)> {
    let connection = OauthConnection {
        platform: parse_platform(&req.platform)?,
        account_name: req.account_name,
        external_page_id: req.page_id,
        access_token: req.access_token,
    };
    let account = state
        .app
        .accounts
        .connect_oauth(&actor, connection, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<SocialAccount>>> {
    Ok(Json(state.app.accounts.list(&actor, Utc::now()).await?))
}

pub async fn sync(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SocialAccount>> {
    Ok(Json(state.app.accounts.sync(&actor, id, Utc::now()).await?))
}

pub async fn test_post(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TestPostResult>> {
    Ok(Json(state.app.accounts.test_post(&actor, id, Utc::now()).await?))
}

pub async fn disconnect(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.app.accounts.disconnect(&actor, id, Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}
