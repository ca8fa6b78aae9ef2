mod download;
mod health;
mod history;
mod index;
mod metrics;
mod predict;

use crate::server::SharedState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(index::index))
        .route("/health", get(health::healthcheck))
        .route(
            "/predict",
            post(predict::predict).options(predict::preflight),
        )
        .route("/history", get(history::history))
        .route("/download/{filename}", get(download::download))
        .route("/metrics", get(metrics::metrics_handler))
}
