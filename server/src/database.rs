//! # Document store
//!
//! Hosted Meilisearch instance holding the persisted collections.
//!
//! ## Schema
//! - Index `patients`: intake records, inserted verbatim
//! - Index `diagnoses`: one document per successful analysis
//! - Primary key `id` on both, a server-generated uuid
//! - `createdAt` stamped on insert, RFC 3339 UTC
//!
//! No migrations, no transactions, no reads from within this repository's
//! flows; the collections exist for operator-side tooling.

use std::sync::Arc;

use chrono::Utc;
use meilisearch_sdk::client::Client;
use serde_json::{Map, Value, json};
use thiserror::Error;
use uuid::Uuid;

pub const PATIENT_INDEX: &str = "patients";
pub const DIAGNOSIS_INDEX: &str = "diagnoses";
pub const DOCUMENT_ID: &str = "id";
pub const CREATED_AT: &str = "createdAt";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Client(#[from] meilisearch_sdk::errors::Error),

    #[error("insert task failed: {0}")]
    Task(String),
}

pub fn init_documents(url: &str, key: &str) -> Result<Arc<Client>, StoreError> {
    Ok(Arc::new(Client::new(url, Some(key))?))
}

/// Stamps `id` and `createdAt`, inserts the document, and returns the id
/// once the store has accepted it.
pub async fn insert_document(
    client: &Client,
    index: &str,
    mut document: Map<String, Value>,
) -> Result<String, StoreError> {
    let id = Uuid::new_v4().to_string();
    document.insert(DOCUMENT_ID.to_string(), json!(id));
    document.insert(CREATED_AT.to_string(), json!(Utc::now().to_rfc3339()));

    let task = client
        .index(index)
        .add_documents(&[Value::Object(document)], Some(DOCUMENT_ID))
        .await?
        .wait_for_completion(client, None, None)
        .await?;

    if task.is_failure() {
        return Err(StoreError::Task(format!("{task:?}")));
    }

    Ok(id)
}
