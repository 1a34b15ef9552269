//! Public landing pages, the leads inbox and the analytics overview.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use socialflow_core::{AnalyticsOverview, Lead, LeadStatus, NewLead, PublicPage};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentActor;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<LeadStatus>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

pub async fn view_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<PublicPage>> {
    Ok(Json(state.app.leads.view_page(&slug).await?))
}

pub async fn capture(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<NewLead>,
) -> ApiResult<(StatusCode, Json<Lead>)> {
    let lead = state.app.leads.capture(&slug, req, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Lead>>> {
    Ok(Json(state.app.leads.list(&actor, query.status, Utc::now()).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Json<Lead>> {
    let status = LeadStatus::parse(&req.status)
        .ok_or_else(|| ApiError::bad_request(format!("unknown lead status: {}", req.status)))?;
    Ok(Json(
        state
            .app
            .leads
            .update_status(&actor, id, status, Utc::now())
            .await?,
    ))
}

pub async fn overview(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<AnalyticsOverview>> {
    Ok(Json(state.app.analytics.overview(&actor, Utc::now()).await?))
}
