use crate::{error::ApiError, server::SharedState};
use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub filename: String,
    pub prediction: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

#[instrument(skip(state))]
pub async fn history(State(state): State<SharedState>) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    state.metrics.record_request("/history");

    let summaries = state.record_store.list_all().await?;
    tracing::debug!("Returning {} history entries", summaries.len());

    let entries = summaries
        .into_iter()
        .map(|summary| HistoryEntry {
            filename: summary.filename,
            prediction: state.decision_policy.display_name(summary.label).to_string(),
            confidence: summary.confidence,
            timestamp: summary.timestamp,
        })
        .collect();

    Ok(Json(entries))
}
