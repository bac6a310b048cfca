//! DR screening backend.
//!
//! # General Infrastructure
//! - Patient-facing clients talk to this server only; the model backend and
//!   the document store are never exposed directly
//! - Two relay routes re-package inbound uploads and forward them to the
//!   model backend (`/predict` for a single image, `/compare` for a
//!   baseline/follow-up pair), proxying the JSON result straight back
//! - Two persistence routes stamp inbound JSON documents and insert them
//!   into the hosted Meilisearch instance, one index per collection
//! - No retries anywhere: one user action is one outbound call
//!
//! # Notes
//!
//! ## Meilisearch as the document store
//! Patient and diagnosis documents are written once and never read back by
//! any flow in this repository, so the store only needs verbatim inserts
//! with a generated identifier. Meilisearch gives us exactly that (plus
//! operator-side search for free) without a schema or migration layer.
//!
//! ## Upload lifetime
//! Inbound image uploads are spooled to uuid-named temporary files for the
//! duration of one relay request and removed on every exit path, success or
//! not. Nothing image-shaped survives a request; only the diagnosis derived
//! from it is persisted.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header::CONTENT_TYPE},
    routing::post,
};
use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod relay;
pub mod routes;
pub mod state;

use relay::{compare_handler, predict_handler};
use routes::{diagnosis_handler, patients_handler};
use state::State;

// Fundus photographs run well past axum's 2 MB default body cap.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn app(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/predict", post(predict_handler))
        .route("/api/compare", post(compare_handler))
        .route("/api/patients", post(patients_handler))
        .route("/api/diagnosis", post(diagnosis_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new();

    info!("Starting server...");
    let address = format!("0.0.0.0:{}", state.config.port);
    let app = app(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
