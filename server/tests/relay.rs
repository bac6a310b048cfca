//! End-to-end tests for the relay and persistence routes, with the model
//! backend stubbed by a local axum router.

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{Json, Router, extract::Multipart, http::StatusCode, routing::post};
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use drscreen::{
    config::{Config, Environment, set_environment},
    relay::TEMP_PREFIX,
    state::State,
};
use records::analysis::{Confidence, DetectionResult};

// The temp-dir assertions scan a shared directory, so the tests that make
// relay requests take turns.
static SERIAL: Mutex<()> = Mutex::const_new(());

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// App under test, pointed at the given model backend URL. Every test runs
/// with production error verbosity so `details` must never appear.
async fn spawn_app(model_api_url: String) -> SocketAddr {
    set_environment(Environment::Production);

    let state = State::with_config(Config {
        port: 0,
        model_api_url,
        // Nothing is listening here; persistence tests expect store failures.
        meili_url: "http://127.0.0.1:1".to_string(),
        meili_key: String::new(),
        environment: Environment::Production,
    });

    serve(drscreen::app(state)).await
}

/// Stub model backend that echoes which multipart field names it received.
fn stub_backend() -> Router {
    async fn field_names(mut multipart: Multipart) -> Vec<String> {
        let mut names = Vec::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            names.push(field.name().unwrap_or_default().to_string());
            let _ = field.bytes().await.unwrap();
        }
        names
    }

    Router::new()
        .route(
            "/predict",
            post(|multipart: Multipart| async move {
                let names = field_names(multipart).await;
                Json(json!({ "severity": "Moderate", "confidence": 82.5, "receivedFields": names }))
            }),
        )
        .route(
            "/compare",
            post(|multipart: Multipart| async move {
                let names = field_names(multipart).await;
                Json(json!({
                    "baselineResult": { "hasDR": true, "severity": "Mild", "confidence": 0.91 },
                    "followUpResult": { "hasDR": true, "severity": "Moderate", "confidence": 0.88 },
                    "overallChange": "Progression detected",
                    "recommendations": ["Refer to an ophthalmologist"],
                    "receivedFields": names
                }))
            }),
        )
}

fn failing_backend() -> Router {
    Router::new().route(
        "/predict",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model exploded") }),
    )
}

fn png_part() -> Part {
    // Not a real image; the relay never inspects the bytes.
    Part::bytes(vec![0x89, b'P', b'N', b'G', 0, 0, 0, 0])
        .file_name("retina.png")
        .mime_str("image/png")
        .unwrap()
}

fn upload_artifacts() -> Vec<PathBuf> {
    std::fs::read_dir(env::temp_dir())
        .unwrap()
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(TEMP_PREFIX))
        })
        .collect()
}

#[tokio::test]
async fn predict_proxies_the_backend_result() {
    let _guard = SERIAL.lock().await;

    let backend = serve(stub_backend()).await;
    let app = spawn_app(format!("http://{backend}")).await;

    let form = Form::new().part("image", png_part());
    let response = reqwest::Client::new()
        .post(format!("http://{app}/api/predict"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["receivedFields"], json!(["file"]));

    // The proxied body is what the detection flow deserializes.
    let result: DetectionResult = serde_json::from_value(body).unwrap();
    assert_eq!(result.severity, "Moderate");
    assert_eq!(result.confidence, Confidence::from_percent(82.5));

    assert!(upload_artifacts().is_empty());
}

#[tokio::test]
async fn compare_forwards_the_fixed_field_names() {
    let _guard = SERIAL.lock().await;

    let backend = serve(stub_backend()).await;
    let app = spawn_app(format!("http://{backend}")).await;

    let form = Form::new()
        .part("baseline_image", png_part())
        .part("followup_image", png_part());
    let response = reqwest::Client::new()
        .post(format!("http://{app}/api/compare"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["receivedFields"], json!(["baseline_file", "followup_file"]));
    assert_eq!(body["overallChange"], "Progression detected");

    assert!(upload_artifacts().is_empty());
}

#[tokio::test]
async fn predict_without_a_file_is_rejected() {
    let _guard = SERIAL.lock().await;

    let backend = serve(stub_backend()).await;
    let app = spawn_app(format!("http://{backend}")).await;

    let form = Form::new().text("comment", "no file here");
    let response = reqwest::Client::new()
        .post(format!("http://{app}/api/predict"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No image file uploaded");
}

#[tokio::test]
async fn compare_requires_both_images() {
    let _guard = SERIAL.lock().await;

    let backend = serve(stub_backend()).await;
    let app = spawn_app(format!("http://{backend}")).await;

    let form = Form::new().part("baseline_image", png_part());
    let response = reqwest::Client::new()
        .post(format!("http://{app}/api/compare"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Both baseline and follow-up images are required");

    // The spooled baseline is gone even though the request failed early.
    assert!(upload_artifacts().is_empty());
}

#[tokio::test]
async fn backend_error_status_is_surfaced_without_detail() {
    let _guard = SERIAL.lock().await;

    let backend = serve(failing_backend()).await;
    let app = spawn_app(format!("http://{backend}")).await;

    let form = Form::new().part("image", png_part());
    let response = reqwest::Client::new()
        .post(format!("http://{app}/api/predict"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Backend responded with error");
    // Production verbosity: no internals leak.
    assert!(body.get("details").is_none());

    assert!(upload_artifacts().is_empty());
}

#[tokio::test]
async fn unreachable_backend_reports_no_response() {
    let _guard = SERIAL.lock().await;

    // Port 1 is never listening.
    let app = spawn_app("http://127.0.0.1:1".to_string()).await;

    let form = Form::new()
        .part("baseline_image", png_part())
        .part("followup_image", png_part());
    let response = reqwest::Client::new()
        .post(format!("http://{app}/api/compare"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No response from backend server");
    assert!(body.get("details").is_none());

    assert!(upload_artifacts().is_empty());
}

#[tokio::test]
async fn non_post_methods_are_rejected() {
    let app = spawn_app("http://127.0.0.1:1".to_string()).await;

    let response = reqwest::get(format!("http://{app}/api/predict")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn malformed_persistence_payload_never_throws() {
    let app = spawn_app("http://127.0.0.1:1".to_string()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{app}/api/patients"))
        .header("content-type", "application/json")
        .body("this is not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to save patient data");
}

#[tokio::test]
async fn non_object_persistence_payload_is_a_failure() {
    let app = spawn_app("http://127.0.0.1:1".to_string()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{app}/api/diagnosis"))
        .json(&json!(["not", "an", "object"]))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to save diagnosis data");
}

#[tokio::test]
async fn unavailable_store_is_a_clean_failure() {
    let app = spawn_app("http://127.0.0.1:1".to_string()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{app}/api/diagnosis"))
        .json(&json!({ "patientId": "p-1", "diagnosisType": "detection" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to save diagnosis data");
}
