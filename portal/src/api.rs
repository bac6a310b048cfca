//! HTTP client for the screening backend.

use records::{
    analysis::{DetectionResult, ProgressReport},
    diagnosis::{DiagnosisRecord, SaveOutcome},
    patient::PatientRecord,
};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::upload::ImageFile;

// Inbound field names of the relay endpoints.
const IMAGE_FIELD: &str = "image";
const BASELINE_FIELD: &str = "baseline_image";
const FOLLOWUP_FIELD: &str = "followup_image";

#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never completed.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server responded with status {0}")]
    Status(u16),

    /// The response body carried an `error` field; surfaced verbatim.
    #[error("{0}")]
    Backend(String),

    /// A persistence endpoint answered `success: false`.
    #[error("{0}")]
    Rejected(String),

    /// The response did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Single-image analysis via the relay.
    pub async fn analyze(&self, image: &ImageFile) -> Result<DetectionResult, ApiError> {
        let form = Form::new().part(IMAGE_FIELD, part_for(image)?);
        let value = self.post_multipart("/api/predict", form).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Baseline/follow-up comparison via the relay.
    pub async fn compare(
        &self,
        baseline: &ImageFile,
        follow_up: &ImageFile,
    ) -> Result<ProgressReport, ApiError> {
        let form = Form::new()
            .part(BASELINE_FIELD, part_for(baseline)?)
            .part(FOLLOWUP_FIELD, part_for(follow_up)?);
        let value = self.post_multipart("/api/compare", form).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn save_patient(&self, record: &PatientRecord) -> Result<String, ApiError> {
        let outcome = self.post_json("/api/patients", record).await?;
        if outcome.success {
            outcome
                .patient_id
                .ok_or_else(|| ApiError::Rejected("missing patientId in response".to_string()))
        } else {
            Err(ApiError::Rejected(outcome.error.unwrap_or_else(|| {
                "Failed to save patient data".to_string()
            })))
        }
    }

    pub async fn save_diagnosis(&self, record: &DiagnosisRecord) -> Result<String, ApiError> {
        let outcome = self.post_json("/api/diagnosis", record).await?;
        if outcome.success {
            outcome
                .diagnosis_id
                .ok_or_else(|| ApiError::Rejected("missing diagnosisId in response".to_string()))
        } else {
            Err(ApiError::Rejected(outcome.error.unwrap_or_else(|| {
                "Failed to save diagnosis data".to_string()
            })))
        }
    }

    async fn post_multipart(&self, path: &str, form: Form) -> Result<Value, ApiError> {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let value: Value = response.json().await?;
        // A 200 can still carry a backend-reported error; surface it
        // verbatim rather than treating it as a crash.
        if let Some(message) = value.get("error").and_then(Value::as_str) {
            return Err(ApiError::Backend(message.to_string()));
        }

        Ok(value)
    }

    // Persistence endpoints answer with a body on failure too, so the
    // outcome is read regardless of status.
    async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<SaveOutcome, ApiError> {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;

        Ok(response.json().await?)
    }
}

fn part_for(image: &ImageFile) -> Result<Part, ApiError> {
    Ok(Part::bytes(image.bytes.clone())
        .file_name(image.name.clone())
        .mime_str(&image.media_type)?)
}
