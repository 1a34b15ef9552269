//! Templates, landing pages and AI generation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use socialflow_connectors::GenerationKind;
use socialflow_core::{Generation, LandingPage, NewLandingPage, NewTemplate, Template};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentActor;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub kind: String,
    pub prompt: String,
}

pub async fn create_template(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<NewTemplate>,
) -> ApiResult<(StatusCode, Json<Template>)> {
    let template = state.app.library.create_template(&actor, req, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn templates(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<Template>>> {
    Ok(Json(state.app.library.list_templates(&actor, Utc::now()).await?))
}

pub async fn delete_template(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.app.library.delete_template(&actor, id, Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_landing_page(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<NewLandingPage>,
) -> ApiResult<(StatusCode, Json<LandingPage>)> {
    let page = state
        .app
        .library
        .create_landing_page(&actor, req, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(page)))
}

pub async fn landing_pages(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<LandingPage>>> {
    Ok(Json(state.app.library.list_landing_pages(&actor, Utc::now()).await?))
}

pub async fn delete_landing_page(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .app
        .library
        .delete_landing_page(&actor, id, Utc::now())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn generate(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<GenerateRequest>,
) -> ApiResult<Json<Generation>> {
    let kind = GenerationKind::parse(&req.kind)
        .ok_or_else(|| ApiError::bad_request(format!("unknown generation kind: {}", req.kind)))?;
    let generation = state.app.ai.generate(&actor, kind, &req.prompt, Utc::now()).await?;
    Ok(Json(generation))
}
