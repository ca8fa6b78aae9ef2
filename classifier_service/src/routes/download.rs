use crate::{error::ApiError, server::SharedState};
use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::Response,
};
use tracing::instrument;

#[instrument(skip(state))]
pub async fn download(
    State(state): State<SharedState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    state.metrics.record_request("/download");

    let image = state
        .record_store
        .find_by_filename(&filename)
        .await?
        .ok_or(ApiError::NotFound)?;

    let disposition = format!("inline; filename=\"{}\"", image.filename.replace('"', ""));

    Response::builder()
        .header(header::CONTENT_TYPE, image.content_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from(image.bytes))
        .map_err(|e| ApiError::Internal(format!("HTTP builder failed: {}", e)))
}
