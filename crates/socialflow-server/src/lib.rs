//! # SocialFlow Server
//!
//! JSON HTTP API over the SocialFlow services. Handlers are thin: they pull
//! the caller out of the bearer token, call one service operation with the
//! current time, and map [`socialflow_core::CoreError`] onto a status code.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::{AppState, AppStateInner};
