use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use socialflow_core::{AuthSession, Profile, Registration};

use crate::error::ApiResult;
use crate::middleware::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<Registration>,
) -> ApiResult<(StatusCode, Json<AuthSession>)> {
    let session = state.app.identity.register(req, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthSession>> {
    let session = state.app.identity.login(&req.email, &req.password).await?;
    Ok(Json(session))
}

pub async fn me(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> ApiResult<Json<Profile>> {
    Ok(Json(state.app.identity.me(user.id, Utc::now()).await?))
}
