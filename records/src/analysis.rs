//! Analysis result shapes returned by the model backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Model confidence, canonically a 0-1 fraction.
///
/// Construct with [`Confidence::from_fraction`] or
/// [`Confidence::from_percent`] depending on which scale the wire carries;
/// display is always a two-decimal percentage.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    pub fn from_fraction(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn from_percent(value: f64) -> Self {
        Self::from_fraction(value / 100.0)
    }

    pub fn as_fraction(self) -> f64 {
        self.0
    }

    pub fn as_percent(self) -> f64 {
        self.0 * 100.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.as_percent())
    }
}

/// Serde adapter for wire shapes that carry confidence on a 0-100 scale.
pub mod percent {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Confidence;

    pub fn serialize<S: Serializer>(value: &Confidence, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_percent())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Confidence, D::Error> {
        f64::deserialize(deserializer).map(Confidence::from_percent)
    }
}

/// Single-image prediction result. The wire confidence is 0-100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub severity: String,
    #[serde(with = "percent")]
    pub confidence: Confidence,
}

/// Per-image assessment inside a comparison report. The wire confidence is a
/// 0-1 fraction, unlike [`DetectionResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EyeAssessment {
    #[serde(rename = "hasDR")]
    pub has_dr: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Increased,
    Decreased,
    Stable,
}

impl fmt::Display for ChangeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Increased => "increased",
            Self::Decreased => "decreased",
            Self::Stable => "stable",
        };
        f.write_str(label)
    }
}

/// One lesion-count delta between the baseline and follow-up images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LesionChange {
    #[serde(rename = "type")]
    pub lesion_type: String,
    pub previous_count: u32,
    pub current_count: u32,
    pub change: ChangeDirection,
}

/// Two-image comparison result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub baseline_result: EyeAssessment,
    pub follow_up_result: EyeAssessment,
    pub overall_change: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesion_changes: Option<Vec<LesionChange>>,
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn confidence_converts_between_scales() {
        let from_percent = Confidence::from_percent(82.5);
        let from_fraction = Confidence::from_fraction(0.825);

        assert_eq!(from_percent, from_fraction);
        assert!((from_percent.as_fraction() - 0.825).abs() < 1e-9);
        assert!((from_fraction.as_percent() - 82.5).abs() < 1e-9);
    }

    #[test]
    fn confidence_displays_two_decimals() {
        assert_eq!(Confidence::from_percent(82.5).to_string(), "82.50%");
        assert_eq!(Confidence::from_fraction(0.9).to_string(), "90.00%");
    }

    #[test]
    fn confidence_clamps_out_of_range_values() {
        assert_eq!(Confidence::from_fraction(1.7).as_fraction(), 1.0);
        assert_eq!(Confidence::from_percent(-3.0).as_fraction(), 0.0);
    }

    #[test]
    fn detection_result_reads_percent_scale() {
        let result: DetectionResult =
            serde_json::from_value(json!({ "severity": "Moderate", "confidence": 82.5 })).unwrap();

        assert_eq!(result.severity, "Moderate");
        assert_eq!(result.confidence, Confidence::from_fraction(0.825));

        let round_tripped = serde_json::to_value(&result).unwrap();
        assert_eq!(round_tripped["confidence"], json!(82.5));
    }

    #[test]
    fn progress_report_reads_backend_shape() {
        let report: ProgressReport = serde_json::from_value(json!({
            "baselineResult": { "hasDR": true, "severity": "Mild", "confidence": 0.91 },
            "followUpResult": { "hasDR": true, "severity": "Moderate", "confidence": 0.88 },
            "overallChange": "Progression detected",
            "lesionChanges": [
                { "type": "microaneurysms", "previousCount": 4, "currentCount": 7, "change": "increased" }
            ],
            "recommendations": ["Refer to an ophthalmologist"]
        }))
        .unwrap();

        assert!(report.baseline_result.has_dr);
        assert_eq!(report.follow_up_result.severity.as_deref(), Some("Moderate"));
        assert_eq!(report.baseline_result.confidence, Confidence::from_fraction(0.91));
        let changes = report.lesion_changes.as_ref().unwrap();
        assert_eq!(changes[0].lesion_type, "microaneurysms");
        assert_eq!(changes[0].change, ChangeDirection::Increased);
    }

    #[test]
    fn progress_report_tolerates_missing_optional_fields() {
        let report: ProgressReport = serde_json::from_value(json!({
            "baselineResult": { "hasDR": false, "confidence": 0.97 },
            "followUpResult": { "hasDR": false, "confidence": 0.95 },
            "overallChange": "Stable",
            "recommendations": []
        }))
        .unwrap();

        assert!(report.lesion_changes.is_none());
        assert!(report.baseline_result.severity.is_none());
    }
}
