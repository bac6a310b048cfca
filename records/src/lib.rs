//! Shared data model for the DR screening platform.
//!
//! Everything that crosses the wire between the patient-facing flows and the
//! backend lives here: patient and diagnosis records, the analysis result
//! shapes returned by the model backend, and the intake validation rules.
//! Wire field names are camelCase to match the model backend and the stored
//! documents.
//!
//! ## Confidence scales
//!
//! The model backend is inconsistent: the single-image endpoint reports
//! confidence on a 0-100 scale, the comparison endpoint as a 0-1 fraction.
//! [`analysis::Confidence`] is the one canonical representation (a fraction);
//! both wire shapes convert at the serde boundary and nothing else in the
//! workspace ever sees a raw scale.

pub mod analysis;
pub mod diagnosis;
pub mod patient;
pub mod session;
