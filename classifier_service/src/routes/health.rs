use crate::server::SharedState;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Healthy,
    Unhealthy,
}

#[derive(Serialize, Deserialize)]
pub struct Status {
    pub status: Health,
    pub model_loaded: bool,
    pub database_connected: bool,
}

pub async fn healthcheck(State(state): State<SharedState>) -> Json<Status> {
    state.metrics.record_request("/health");

    let status = if state.model_loaded() {
        Health::Healthy
    } else {
        Health::Unhealthy
    };

    Json(Status {
        status,
        model_loaded: state.model_loaded(),
        database_connected: state.database_connected().await,
    })
}
