//! Image classification endpoint.
//!
//! Accepts either a multipart upload (`file` field) or a JSON body
//! `{"url": "..."}` pointing at an image to download.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::services::{ImageInput, fetch_image};
use crate::state::AppState;

/// Multipart framing allowance on top of the image size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

const NO_INPUT: &str = "No file or URL provided";

#[derive(Debug, Deserialize)]
struct UrlRequest {
    #[serde(default)]
    url: Option<String>,
}

/// Classification result body.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub prediction: String,
    pub confidence: f32,
}

/// Build the analyze router.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().route(
        "/api/analyze",
        post(analyze).layer(DefaultBodyLimit::max(
            max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
        )),
    )
}

/// Classify an image.
///
/// POST /api/analyze
#[instrument(skip_all)]
async fn analyze(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let max_bytes = state.analyze_config().max_upload_bytes;

    let image = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        read_upload(multipart, max_bytes).await?
    } else if content_type.starts_with("application/json") {
        let Json(body) = Json::<UrlRequest>::from_request(request, &state).await?;
        let url = body
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest(NO_INPUT.to_owned()))?;
        fetch_image(state.http(), &url, max_bytes).await?
    } else {
        return Err(AppError::BadRequest(NO_INPUT.to_owned()));
    };

    let prediction = state.classifier().classify(&image).await?;
    tracing::info!(
        label = %prediction.label,
        confidence = prediction.confidence,
        "Image classified"
    );

    Ok(Json(AnalyzeResponse {
        prediction: prediction.label,
        confidence: prediction.confidence,
    }))
}

/// Read the `file` part of a multipart upload.
async fn read_upload(mut multipart: Multipart, max_bytes: usize) -> Result<ImageInput, AppError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        // Parts without a filename are plain form values, not uploads.
        let Some(file_name) = field.file_name() else {
            continue;
        };
        if file_name.is_empty() {
            return Err(AppError::BadRequest("No selected file".to_owned()));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(AppError::BadRequest(format!(
                    "Invalid image: file exceeds {max_bytes} bytes"
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(ImageInput::from_bytes(bytes)?);
    }

    Err(AppError::BadRequest(NO_INPUT.to_owned()))
}
