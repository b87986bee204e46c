//! Student resource routes.

use crate::handlers::students::{create, destroy, list, show, update};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;

const BODY_LIMIT_BYTES: usize = 64 * 1024;

pub fn student_routes(state: AppState) -> Router {
    Router::new()
        .route("/students", get(list).post(create))
        .route("/students/:id", get(show).put(update).delete(destroy))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .with_state(state)
}
