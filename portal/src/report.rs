//! Result rendering.
//!
//! Plain-text renderers for the two result shapes; a UI shell would lay the
//! same fields out visually. Both views end with the fixed disclaimer.

use std::fmt::Write;

use records::analysis::{DetectionResult, EyeAssessment, ProgressReport};

pub const DISCLAIMER: &str = "This analysis is intended as a diagnostic aid only. \
The final diagnosis and treatment decisions should always be made by a qualified \
healthcare professional based on a comprehensive clinical evaluation. AI-based \
detection systems are not a substitute for professional medical advice, diagnosis \
or treatment.";

/// Detection view: severity and confidence to two decimal places.
pub fn detection_summary(result: &DetectionResult) -> String {
    format!(
        "Severity: {}\nConfidence: {}\n\n{DISCLAIMER}",
        result.severity, result.confidence
    )
}

fn assessment_line(label: &str, assessment: &EyeAssessment) -> String {
    let presence = if assessment.has_dr {
        "DR detected"
    } else {
        "No DR detected"
    };

    match &assessment.severity {
        Some(severity) => format!(
            "{label}: {presence}, severity {severity}, confidence {}",
            assessment.confidence
        ),
        None => format!("{label}: {presence}, confidence {}", assessment.confidence),
    }
}

/// Monitoring view: both assessments, the overall change, lesion deltas
/// when present, and the recommendations list.
pub fn progress_summary(report: &ProgressReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", assessment_line("Baseline", &report.baseline_result));
    let _ = writeln!(out, "{}", assessment_line("Follow-up", &report.follow_up_result));
    let _ = writeln!(out, "Overall change: {}", report.overall_change);

    if let Some(changes) = &report.lesion_changes {
        let _ = writeln!(out, "Lesion changes:");
        for change in changes {
            let _ = writeln!(
                out,
                "  {}: {} -> {} ({})",
                change.lesion_type, change.previous_count, change.current_count, change.change
            );
        }
    }

    let _ = writeln!(out, "Recommendations:");
    for recommendation in &report.recommendations {
        let _ = writeln!(out, "  - {recommendation}");
    }

    let _ = write!(out, "\n{DISCLAIMER}");
    out
}
