//! Patient intake submission.

use records::patient::{PatientIntake, PatientRecord, ValidationErrors};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    api::{ApiClient, ApiError},
    session::{CURRENT_PATIENT_ID_KEY, PATIENT_DATA_KEY, SessionStore},
};

/// Owner id recorded when nobody is logged in.
pub const ANONYMOUS_USER: &str = "anonymous";

#[derive(Error, Debug)]
pub enum IntakeError {
    /// Field-level validation failures. Nothing was sent anywhere.
    #[error("intake validation failed")]
    Invalid(ValidationErrors),

    #[error(transparent)]
    Save(#[from] ApiError),
}

/// Validates the intake, persists it, and parks the resulting record in the
/// session for the detection and monitoring flows to read.
///
/// The patient id is reused from the session when one exists so repeated
/// submissions in one sitting stay one patient; otherwise a fresh uuid is
/// minted.
pub async fn submit_intake(
    api: &ApiClient,
    session: &mut SessionStore,
    intake: &PatientIntake,
) -> Result<PatientRecord, IntakeError> {
    let patient_id = session
        .get::<String>(CURRENT_PATIENT_ID_KEY)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let user_id = session
        .user()
        .map(|user| user.email)
        .unwrap_or_else(|| ANONYMOUS_USER.to_string());

    let record =
        PatientRecord::from_intake(intake, patient_id, user_id).map_err(IntakeError::Invalid)?;

    api.save_patient(&record).await?;
    info!("Patient {} saved", record.patient_id);

    session.set(PATIENT_DATA_KEY, &record);
    session.set(CURRENT_PATIENT_ID_KEY, &record.patient_id);

    Ok(record)
}

/// The record a previous intake left in the session, if any. Pages past the
/// intake form redirect back to it when this is empty.
pub fn stored_patient(session: &SessionStore) -> Option<PatientRecord> {
    session.get(PATIENT_DATA_KEY)
}
