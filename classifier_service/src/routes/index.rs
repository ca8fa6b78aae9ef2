use crate::server::SharedState;
use axum::{extract::State, response::Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct Endpoints {
    predict: &'static str,
    history: &'static str,
    download: &'static str,
    health: &'static str,
    metrics: &'static str,
}

#[derive(Serialize)]
pub struct ServiceDescriptor {
    status: &'static str,
    message: &'static str,
    model_loaded: bool,
    database_connected: bool,
    endpoints: Endpoints,
}

pub async fn index(State(state): State<SharedState>) -> Json<ServiceDescriptor> {
    state.metrics.record_request("/");

    Json(ServiceDescriptor {
        status: "running",
        message: "Image classification API is active",
        model_loaded: state.model_loaded(),
        database_connected: state.database_connected().await,
        endpoints: Endpoints {
            predict: "/predict (POST)",
            history: "/history (GET)",
            download: "/download/{filename} (GET)",
            health: "/health (GET)",
            metrics: "/metrics (GET)",
        },
    })
}
