//! HTTP transport for the soil classification service.
//!
//! One route does the work: `POST /predict-soil` takes a multipart upload
//! with an `image` file field and answers with the predicted soil type and
//! its confidence. `GET /health` exists for liveness probes.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use soilnet::service::model::ScoreModel;

use crate::routes::AppState;

/// Assemble the application router around a ready-to-serve state.
///
/// CORS is wide open: the service is consumed by browser front-ends on
/// other origins.
pub fn construct_router<M>(state: Arc<AppState<M>>, body_limit: usize) -> Router
where
    M: ScoreModel + Send + Sync + 'static,
{
    Router::new()
        .route("/predict-soil", post(routes::predict_soil::<M>))
        .route("/health", get(routes::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
