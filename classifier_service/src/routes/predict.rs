use crate::{
    error::ApiError,
    normalizer::normalize,
    server::SharedState,
    store::NewRecord,
    upload::{validate_filename, ValidationError},
};
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::instrument;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: String,
    pub confidence: f64,
    pub raw_score: f64,
}

struct Upload {
    filename: String,
    content_type: String,
    bytes: Bytes,
}

/// Pulls the `file` part out of the form. Other parts, and a `file` part sent
/// as a plain text field without a `filename` attribute, are skipped.
async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) || field.file_name().is_none() {
            continue;
        }

        let extension = validate_filename(field.file_name())?;
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| extension.mime_type().to_string());

        let bytes = field.bytes().await?;

        return Ok(Upload {
            filename,
            content_type,
            bytes,
        });
    }

    Err(ValidationError::NoFileUploaded.into())
}

#[instrument(skip(state, multipart))]
pub async fn predict(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    state.metrics.record_request("/predict");
    let started = Instant::now();

    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!("Not a multipart upload: {}", rejection.body_text());
        ValidationError::NoFileUploaded
    })?;
    let upload = read_upload(&mut multipart).await?;

    let model_service = state
        .model_service
        .as_ref()
        .ok_or(ApiError::ModelUnavailable)?;

    tracing::info!(
        "Processing file: {} ({}, {} bytes)",
        upload.filename,
        upload.content_type,
        upload.bytes.len()
    );

    let image_data = upload.bytes.clone();
    let input = tokio::task::spawn_blocking(move || normalize(&image_data))
        .await
        .map_err(|e| ApiError::Internal(format!("Processing error: {}", e)))??;

    let inference_started = Instant::now();
    let score = model_service.predict(input).await?;
    state
        .metrics
        .record_prediction_duration(elapsed_ms(inference_started), "inference");

    let decision = state.decision_policy.decide(f64::from(score));

    let record_id = state
        .record_store
        .save(NewRecord {
            filename: upload.filename,
            content_type: upload.content_type,
            image: upload.bytes.to_vec(),
            label: decision.label,
            confidence: decision.confidence,
            raw_score: decision.raw_score,
            timestamp: Utc::now(),
        })
        .await
        .map_err(ApiError::Persist)?;

    state.metrics.record_prediction(decision.label);
    state
        .metrics
        .record_prediction_duration(elapsed_ms(started), "total");

    let response = PredictionResponse {
        prediction: state.decision_policy.display_name(decision.label).to_string(),
        confidence: decision.confidence,
        raw_score: decision.raw_score,
    };
    tracing::info!(
        "Record {}: {} ({}%, raw score {:.4})",
        record_id,
        response.prediction,
        response.confidence,
        response.raw_score
    );

    Ok(Json(response))
}

pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
