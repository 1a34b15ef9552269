use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;
use socialflow_core::SubscriptionView;
use socialflow_org::Plan;

use crate::error::ApiResult;
use crate::middleware::CurrentActor;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChangePlanRequest {
    pub plan_id: String,
}

pub async fn plans(State(state): State<AppState>) -> Json<Vec<Plan>> {
    Json(state.app.billing.plans())
}

pub async fn subscription(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<SubscriptionView>> {
    Ok(Json(state.app.billing.subscription(&actor, Utc::now()).await?))
}

pub async fn change_plan(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<ChangePlanRequest>,
) -> ApiResult<Json<SubscriptionView>> {
    let view = state
        .app
        .billing
        .change_plan(&actor, &req.plan_id, Utc::now())
        .await?;
    Ok(Json(view))
}
