//! Manual smoke tool: runs one login + intake + detection pass against a
//! running backend. Point it at a deployment with `DRSCREEN_URL`.

use std::time::Duration;

use anyhow::Result;

use portal::{
    api::ApiClient,
    flows::DetectionFlow,
    intake::submit_intake,
    report,
    session::{Authenticator, SessionStore},
    upload::ImageFile,
};
use records::patient::PatientIntake;

// 1x1 transparent PNG; the backend only cares that it is an image upload.
const SAMPLE_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

#[tokio::main]
async fn main() -> Result<()> {
    let base_url =
        std::env::var("DRSCREEN_URL").unwrap_or_else(|_| "http://localhost:3001".to_string());
    println!("Target: {base_url}");

    let api = ApiClient::new(&base_url);
    let mut session = SessionStore::new();

    let auth = Authenticator::with_delay(Duration::ZERO);
    let user = auth.login(&mut session, "smoke@example.com", "password").await;
    println!("Logged in as {}", user.email);

    let intake = PatientIntake {
        full_name: "Smoke Test".to_string(),
        age: "54".to_string(),
        gender: "female".to_string(),
        medical_history: "Type 2 diabetes since 2014".to_string(),
        contact_number: "5551234567".to_string(),
        email: "smoke@example.com".to_string(),
    };
    let patient = submit_intake(&api, &mut session, &intake).await?;
    println!("Patient saved: {}", patient.patient_id);
    assert_eq!(portal::intake::stored_patient(&session).as_ref(), Some(&patient));

    let mut flow = DetectionFlow::new();
    flow.select_image(ImageFile::new("sample.png", "image/png", SAMPLE_PNG.to_vec()));

    if flow.analyze(&api, &patient).await.is_some() {
        if let Some(result) = flow.result() {
            println!("{}", report::detection_summary(result));
        }
        println!("Save state: {:?}", flow.save_state());
    } else {
        println!("Analysis failed: {:?}", flow.error());
    }

    Ok(())
}
