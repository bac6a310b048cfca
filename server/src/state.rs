use std::sync::Arc;

use meilisearch_sdk::client::Client as DocumentClient;
use tokio::sync::OnceCell;

use super::{
    config::Config,
    database::{StoreError, init_documents},
};

pub struct State {
    pub config: Config,
    /// One pooled client for every relay call.
    pub http: reqwest::Client,
    documents: OnceCell<Arc<DocumentClient>>,
}

impl State {
    pub fn new() -> Arc<Self> {
        Self::with_config(Config::load())
    }

    pub fn with_config(config: Config) -> Arc<Self> {
        Arc::new(Self {
            config,
            http: reqwest::Client::new(),
            documents: OnceCell::new(),
        })
    }

    /// Process-wide document-store handle, created on first use and reused
    /// for the life of the process. `OnceCell` keeps concurrent first
    /// requests from racing the initialization.
    pub async fn documents(&self) -> Result<&Arc<DocumentClient>, StoreError> {
        self.documents
            .get_or_try_init(|| async { init_documents(&self.config.meili_url, &self.config.meili_key) })
            .await
    }
}
