//! Relay endpoints.
//!
//! Each handler re-packages an inbound upload and forwards it to the model
//! backend, proxying the JSON response straight back to the caller. Uploads
//! are spooled to uuid-named temporary files for the lifetime of one
//! request; [`TempUpload`] removes its file on drop, so every exit path
//! (success, backend error, parse error) releases them.

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use axum::{
    Json,
    extract::{Multipart, State as AxumState, multipart::Field},
};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{error::AppError, state::State};

const BACKEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Temp-file name prefix; relay artifacts are findable (and absent, after a
/// request) under `std::env::temp_dir()`.
pub const TEMP_PREFIX: &str = "drscreen-upload";

pub const IMAGE_FIELD: &str = "image";
pub const BASELINE_FIELD: &str = "baseline_image";
pub const FOLLOWUP_FIELD: &str = "followup_image";

// Field names the model backend expects; fixed by its API.
const FORWARD_IMAGE_FIELD: &str = "file";
const FORWARD_BASELINE_FIELD: &str = "baseline_file";
const FORWARD_FOLLOWUP_FIELD: &str = "followup_file";

const PREDICT_FAILURE: &str = "Failed to process image";
const COMPARE_FAILURE: &str = "Failed to process images";

const MISSING_IMAGE: &str = "No image file uploaded";
const MISSING_PAIR: &str = "Both baseline and follow-up images are required";

/// One spooled upload. The backing file is deleted when this drops, no
/// matter how the request ends.
struct TempUpload {
    path: PathBuf,
    file_name: String,
    content_type: String,
}

impl TempUpload {
    async fn spool(field: Field<'_>, failure: &'static str) -> Result<Self, AppError> {
        let file_name = field.file_name().unwrap_or("image.jpg").to_string();
        let content_type = field.content_type().unwrap_or("image/jpeg").to_string();

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::MalformedUpload(e.to_string()))?;

        let path = env::temp_dir().join(format!("{TEMP_PREFIX}-{}", Uuid::new_v4()));
        tokio::fs::write(&path, &bytes).await.map_err(|e| AppError::Processing {
            message: failure,
            detail: e.to_string(),
        })?;

        Ok(Self {
            path,
            file_name,
            content_type,
        })
    }

    async fn part(&self, failure: &'static str) -> Result<Part, AppError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| AppError::Processing {
            message: failure,
            detail: e.to_string(),
        })?;

        Part::bytes(bytes)
            .file_name(self.file_name.clone())
            .mime_str(&self.content_type)
            .map_err(|e| AppError::Processing {
                message: failure,
                detail: e.to_string(),
            })
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Error deleting temporary file {}: {e}", self.path.display());
        }
    }
}

pub async fn predict_handler(
    AxumState(state): AxumState<Arc<State>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::MalformedUpload(e.to_string()))?
    {
        if field.name() == Some(IMAGE_FIELD) {
            image = Some(TempUpload::spool(field, PREDICT_FAILURE).await?);
        }
    }

    let image = image.ok_or(AppError::MissingFile(MISSING_IMAGE))?;

    let form = Form::new().part(FORWARD_IMAGE_FIELD, image.part(PREDICT_FAILURE).await?);
    forward(&state, "/predict", form, PREDICT_FAILURE).await
    // `image` drops here; the temp file goes with it.
}

pub async fn compare_handler(
    AxumState(state): AxumState<Arc<State>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut baseline = None;
    let mut follow_up = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::MalformedUpload(e.to_string()))?
    {
        match field.name() {
            Some(BASELINE_FIELD) => baseline = Some(TempUpload::spool(field, COMPARE_FAILURE).await?),
            Some(FOLLOWUP_FIELD) => follow_up = Some(TempUpload::spool(field, COMPARE_FAILURE).await?),
            _ => {}
        }
    }

    let (Some(baseline), Some(follow_up)) = (baseline, follow_up) else {
        return Err(AppError::MissingFile(MISSING_PAIR));
    };

    let form = Form::new()
        .part(FORWARD_BASELINE_FIELD, baseline.part(COMPARE_FAILURE).await?)
        .part(FORWARD_FOLLOWUP_FIELD, follow_up.part(COMPARE_FAILURE).await?);
    forward(&state, "/compare", form, COMPARE_FAILURE).await
}

/// Sends the re-packaged form to the model backend and proxies the JSON
/// body back. One attempt, fixed timeout, no retry.
async fn forward(
    state: &State,
    path: &str,
    form: Form,
    failure: &'static str,
) -> Result<Json<Value>, AppError> {
    let url = format!("{}{path}", state.config.model_api_url);
    info!("Sending request to model backend: {url}");

    let response = state
        .http
        .post(&url)
        .multipart(form)
        .timeout(BACKEND_TIMEOUT)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                AppError::BackendUnreachable("Connection failed or timed out".to_string())
            } else {
                AppError::Processing {
                    message: failure,
                    detail: e.to_string(),
                }
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("Model backend answered {status}: {body}");
        return Err(AppError::BackendStatus {
            status: status.as_u16(),
            body,
        });
    }

    let payload = response.json::<Value>().await.map_err(|e| AppError::Processing {
        message: failure,
        detail: e.to_string(),
    })?;

    Ok(Json(payload))
}
