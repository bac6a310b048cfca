//! Diagnosis records and persistence acknowledgements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::DetectionResult;
use crate::patient::PatientRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosisType {
    Detection,
    Comparison,
}

/// One persisted analysis outcome, linked to a patient. Created only after
/// a successful analysis response; never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRecord {
    pub patient_id: String,
    pub patient_name: String,
    pub diagnosis_type: DiagnosisType,
    /// Whatever the model backend returned, stored verbatim.
    pub result: Value,
    pub timestamp: DateTime<Utc>,
}

impl DiagnosisRecord {
    pub fn detection(patient: &PatientRecord, result: &DetectionResult) -> Self {
        Self {
            patient_id: patient.patient_id.clone(),
            patient_name: patient.full_name.clone(),
            diagnosis_type: DiagnosisType::Detection,
            result: serde_json::to_value(result).unwrap_or(Value::Null),
            timestamp: Utc::now(),
        }
    }
}

/// Response body of the persistence endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
