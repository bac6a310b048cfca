//! Detection and monitoring flows.
//!
//! These mirror the page-level state machines of the original client:
//! selecting a file invalidates whatever the previous file produced, the
//! analysis result is stored before persistence is attempted, and a failed
//! save never takes an already-displayed result down with it.

use records::{
    analysis::{DetectionResult, ProgressReport},
    diagnosis::DiagnosisRecord,
    patient::PatientRecord,
};
use tracing::{info, warn};

use crate::{
    api::{ApiClient, ApiError},
    upload::{ImageFile, ImageSlot},
};

pub const DETECTION_FAILURE: &str = "Failed to analyze the image. Please try again.";
pub const MONITORING_FAILURE: &str = "Failed to analyze the images. Please try again.";

/// Whether the diagnosis derived from the current result has been written.
/// Deliberately separate from the result itself: the two transitions are
/// independently observable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DiagnosisSaveState {
    #[default]
    NotSaved,
    Saved {
        diagnosis_id: String,
    },
    Failed,
}

/// Single-image detection page state.
#[derive(Debug, Default)]
pub struct DetectionFlow {
    slot: ImageSlot,
    result: Option<DetectionResult>,
    saved: DiagnosisSaveState,
    error: Option<String>,
}

impl DetectionFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepting a new file clears any result tied to the previous file so
    /// a stale severity is never shown against a fresh image.
    pub fn select_image(&mut self, file: ImageFile) -> bool {
        let accepted = self.slot.select(file);
        if accepted {
            self.result = None;
            self.saved = DiagnosisSaveState::NotSaved;
        }
        accepted
    }

    pub fn can_analyze(&self) -> bool {
        self.slot.is_filled()
    }

    /// Runs one analysis round trip. Duplicate submission is prevented by
    /// exclusivity here, the library analog of disabling the button; there
    /// is no idempotency token underneath.
    pub async fn analyze(
        &mut self,
        api: &ApiClient,
        patient: &PatientRecord,
    ) -> Option<&DetectionResult> {
        if !self.can_analyze() {
            return None;
        }
        self.error = None;

        let outcome = match self.slot.image() {
            Some(image) => api.analyze(image).await,
            None => return None,
        };

        match outcome {
            Ok(result) => {
                info!("Analysis complete: {} ({})", result.severity, result.confidence);
                self.result = Some(result);
                self.save_diagnosis(api, patient).await;
            }
            Err(ApiError::Backend(message)) => {
                warn!("Model backend reported: {message}");
                self.error = Some(message);
            }
            Err(e) => {
                warn!("Error during analysis: {e}");
                self.error = Some(DETECTION_FAILURE.to_string());
            }
        }

        self.result.as_ref()
    }

    // Best effort: failure is logged and flagged, and the rendered result
    // stands either way.
    async fn save_diagnosis(&mut self, api: &ApiClient, patient: &PatientRecord) {
        let record = match &self.result {
            Some(result) => DiagnosisRecord::detection(patient, result),
            None => return,
        };

        match api.save_diagnosis(&record).await {
            Ok(diagnosis_id) => {
                info!("Diagnosis saved as {diagnosis_id}");
                self.saved = DiagnosisSaveState::Saved { diagnosis_id };
            }
            Err(e) => {
                warn!("Error saving diagnosis: {e}");
                self.saved = DiagnosisSaveState::Failed;
            }
        }
    }

    pub fn slot(&self) -> &ImageSlot {
        &self.slot
    }

    pub fn result(&self) -> Option<&DetectionResult> {
        self.result.as_ref()
    }

    pub fn save_state(&self) -> &DiagnosisSaveState {
        &self.saved
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Baseline/follow-up monitoring page state. The two slots carry
/// independent error state; only the compare action needs both.
#[derive(Debug, Default)]
pub struct MonitoringFlow {
    baseline: ImageSlot,
    follow_up: ImageSlot,
    report: Option<ProgressReport>,
    error: Option<String>,
}

impl MonitoringFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_baseline(&mut self, file: ImageFile) -> bool {
        let accepted = self.baseline.select(file);
        if accepted {
            self.report = None;
        }
        accepted
    }

    pub fn select_follow_up(&mut self, file: ImageFile) -> bool {
        let accepted = self.follow_up.select(file);
        if accepted {
            self.report = None;
        }
        accepted
    }

    pub fn can_compare(&self) -> bool {
        self.baseline.is_filled() && self.follow_up.is_filled()
    }

    pub async fn compare(&mut self, api: &ApiClient) -> Option<&ProgressReport> {
        if !self.can_compare() {
            return None;
        }
        self.error = None;

        let outcome = match (self.baseline.image(), self.follow_up.image()) {
            (Some(baseline), Some(follow_up)) => api.compare(baseline, follow_up).await,
            _ => return None,
        };

        match outcome {
            Ok(report) => {
                info!("Comparison complete: {}", report.overall_change);
                self.report = Some(report);
            }
            Err(ApiError::Backend(message)) => {
                warn!("Model backend reported: {message}");
                self.error = Some(message);
            }
            Err(e) => {
                warn!("Error during comparison: {e}");
                self.error = Some(MONITORING_FAILURE.to_string());
            }
        }

        self.report.as_ref()
    }

    pub fn baseline(&self) -> &ImageSlot {
        &self.baseline
    }

    pub fn follow_up(&self) -> &ImageSlot {
        &self.follow_up
    }

    pub fn report(&self) -> Option<&ProgressReport> {
        self.report.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str) -> ImageFile {
        ImageFile::new(name, "image/png", vec![1, 2, 3])
    }

    #[test]
    fn selecting_a_new_image_clears_the_previous_result() {
        let mut flow = DetectionFlow::new();
        assert!(flow.select_image(png("first.png")));

        // Simulate a completed round: a result and a saved diagnosis.
        flow.result = Some(DetectionResult {
            severity: "Mild".to_string(),
            confidence: records::analysis::Confidence::from_percent(90.0),
        });
        flow.saved = DiagnosisSaveState::Saved {
            diagnosis_id: "d-1".to_string(),
        };

        assert!(flow.select_image(png("second.png")));
        assert!(flow.result().is_none());
        assert_eq!(flow.save_state(), &DiagnosisSaveState::NotSaved);
    }

    #[test]
    fn rejected_selection_keeps_the_previous_result() {
        let mut flow = DetectionFlow::new();
        flow.select_image(png("first.png"));
        flow.result = Some(DetectionResult {
            severity: "Mild".to_string(),
            confidence: records::analysis::Confidence::from_percent(90.0),
        });

        assert!(!flow.select_image(ImageFile::new("clip.gif", "image/gif", vec![0])));
        // The slot cleared, but the last completed analysis is unchanged.
        assert!(flow.result().is_some());
        assert!(!flow.can_analyze());
    }

    #[test]
    fn compare_needs_both_slots() {
        let mut flow = MonitoringFlow::new();
        assert!(!flow.can_compare());

        flow.select_baseline(png("baseline.png"));
        assert!(!flow.can_compare());

        flow.select_follow_up(png("followup.png"));
        assert!(flow.can_compare());
    }

    #[test]
    fn slot_errors_stay_independent() {
        let mut flow = MonitoringFlow::new();
        flow.select_baseline(png("baseline.png"));
        flow.select_follow_up(ImageFile::new("scan.bmp", "image/bmp", vec![0]));

        assert!(flow.baseline().error().is_none());
        assert!(flow.follow_up().error().is_some());
        assert!(!flow.can_compare());
    }
}
