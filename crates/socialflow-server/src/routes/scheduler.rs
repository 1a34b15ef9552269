use axum::{extract::State, Json};
use chrono::Utc;
use socialflow_core::{ProcessReport, QueueView};

use crate::error::ApiResult;
use crate::middleware::CurrentActor;
use crate::state::AppState;

pub async fn queue(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<QueueView>> {
    Ok(Json(state.app.scheduler.queue(&actor, Utc::now()).await?))
}

/// Sweep the caller's workspace.
pub async fn process(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<ProcessReport>> {
    Ok(Json(state.app.scheduler.process_for(&actor, Utc::now()).await?))
}
