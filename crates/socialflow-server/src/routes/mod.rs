//! HTTP routes.

mod accounts;
mod auth;
mod billing;
mod leads;
mod library;
mod posts;
mod scheduler;
mod workspace;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::require_auth;
use crate::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Build the full API router.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/plans", get(billing::plans))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/p/{slug}", get(leads::view_page))
        .route("/p/{slug}/leads", post(leads::capture));

    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/subscription", get(billing::subscription))
        .route("/subscription/change-plan", post(billing::change_plan))
        .route("/workspace", get(workspace::current).post(workspace::create))
        .route("/workspace/list", get(workspace::list))
        .route("/workspace/switch/{tenant_id}", post(workspace::switch))
        .route("/workspace/settings", put(workspace::update_settings))
        .route("/workspace/invite", post(workspace::invite))
        .route("/workspace/invites", get(workspace::invites))
        .route("/workspace/invites/{id}/accept", post(workspace::accept_invite))
        .route("/workspace/invites/{id}/decline", post(workspace::decline_invite))
        .route("/workspace/members", get(workspace::members))
        .route("/workspace/members/{id}", delete(workspace::remove_member))
        .route("/workspace/members/{id}/role", put(workspace::update_role))
        .route("/posts", get(posts::list).post(posts::create))
        .route(
            "/posts/{id}",
            get(posts::get).put(posts::update).delete(posts::delete),
        )
        .route("/posts/{id}/schedule", post(posts::schedule))
        .route("/posts/{id}/publish", post(posts::publish))
        .route("/scheduler/queue", get(scheduler::queue))
        .route("/scheduler/process", post(scheduler::process))
        .route("/social-accounts", get(accounts::list).post(accounts::connect))
        .route("/social-accounts/oauth", post(accounts::connect_oauth))
        .route("/social-accounts/{id}", delete(accounts::disconnect))
        .route("/social-accounts/{id}/sync", post(accounts::sync))
        .route("/social-accounts/{id}/test-post", post(accounts::test_post))
        .route("/templates", get(library::templates).post(library::create_template))
        .route("/templates/{id}", delete(library::delete_template))
        .route(
            "/landing-pages",
            get(library::landing_pages).post(library::create_landing_page),
        )
        .route("/landing-pages/{id}", delete(library::delete_landing_page))
        .route("/ai/generate", post(library::generate))
        .route("/leads", get(leads::list))
        .route("/leads/{id}/status", put(leads::update_status))
        .route("/analytics/overview", get(leads::overview))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
