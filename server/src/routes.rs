//! Persistence endpoints.
//!
//! Thin pass-through to the document store: stamp, insert, acknowledge.
//! Every failure mode (malformed body, non-object body, store unavailable,
//! rejected insert) comes back as `success: false` with a 500; nothing
//! escapes the handler boundary.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State as AxumState, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use tracing::{error, info};

use crate::{
    database::{DIAGNOSIS_INDEX, PATIENT_INDEX, insert_document},
    state::State,
};

/// Per-collection response wording, matching what clients display.
struct CollectionAck {
    id_key: &'static str,
    saved: &'static str,
    failed: &'static str,
}

const PATIENT_ACK: CollectionAck = CollectionAck {
    id_key: "patientId",
    saved: "Patient data saved successfully",
    failed: "Failed to save patient data",
};

const DIAGNOSIS_ACK: CollectionAck = CollectionAck {
    id_key: "diagnosisId",
    saved: "Diagnosis data saved successfully",
    failed: "Failed to save diagnosis data",
};

pub async fn patients_handler(
    AxumState(state): AxumState<Arc<State>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    persist(&state, PATIENT_INDEX, &PATIENT_ACK, payload).await
}

pub async fn diagnosis_handler(
    AxumState(state): AxumState<Arc<State>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    persist(&state, DIAGNOSIS_INDEX, &DIAGNOSIS_ACK, payload).await
}

async fn persist(
    state: &State,
    index: &'static str,
    ack: &CollectionAck,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let document = match payload {
        Ok(Json(Value::Object(document))) => document,
        Ok(Json(other)) => {
            error!("Rejecting non-object {index} document: {other}");
            return failure(ack.failed);
        }
        Err(rejection) => {
            error!("Malformed {index} payload: {rejection}");
            return failure(ack.failed);
        }
    };

    let client = match state.documents().await {
        Ok(client) => client.clone(),
        Err(e) => {
            error!("Document store unavailable: {e}");
            return failure(ack.failed);
        }
    };

    match insert_document(&client, index, document).await {
        Ok(id) => {
            info!("Inserted {index} document {id}");
            success(ack, id)
        }
        Err(e) => {
            error!("Error saving {index} document: {e}");
            failure(ack.failed)
        }
    }
}

fn success(ack: &CollectionAck, id: String) -> Response {
    let mut body = Map::new();
    body.insert("success".to_string(), json!(true));
    body.insert(ack.id_key.to_string(), json!(id));
    body.insert("message".to_string(), json!(ack.saved));

    (StatusCode::OK, Json(Value::Object(body))).into_response()
}

fn failure(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "error": message })),
    )
        .into_response()
}
