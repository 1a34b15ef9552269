use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use socialflow_core::{NewPost, Post, PostStatus, PostUpdate};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::middleware::CurrentActor;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<PostStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub scheduled_at: DateTime<Utc>,
}

pub async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<NewPost>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let post = state.app.posts.create(&actor, req, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Post>>> {
    Ok(Json(state.app.posts.list(&actor, query.status, Utc::now()).await?))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Post>> {
    Ok(Json(state.app.posts.get(&actor, id, Utc::now()).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(req): Json<PostUpdate>,
) -> ApiResult<Json<Post>> {
    Ok(Json(state.app.posts.update(&actor, id, req, Utc::now()).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.app.posts.delete(&actor, id, Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn schedule(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(req): Json<ScheduleRequest>,
) -> ApiResult<Json<Post>> {
    let post = state
        .app
        .posts
        .schedule(&actor, id, req.scheduled_at, Utc::now())
        .await?;
    Ok(Json(post))
}

pub async fn publish(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Post>> {
    Ok(Json(state.app.posts.publish_now(&actor, id, Utc::now()).await?))
}
