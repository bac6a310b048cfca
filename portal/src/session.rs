//! Client-resident session state.
//!
//! The original keeps identity and in-progress intake data in web storage;
//! this is the same thing as an in-memory string map with fixed keys.
//! Nothing here is verified server-side: the stored user is a UI hint only,
//! never an authorization boundary.

use std::collections::HashMap;
use std::time::Duration;

use records::session::User;
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

pub const USER_KEY: &str = "user";
pub const PATIENT_DATA_KEY: &str = "patientData";
pub const CURRENT_PATIENT_ID_KEY: &str = "currentPatientId";

/// String key/value store mirroring web storage semantics: values are JSON
/// text, corrupt entries read back as absent.
#[derive(Debug, Default)]
pub struct SessionStore {
    values: HashMap<String, String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => {
                self.values.insert(key.to_string(), raw);
            }
            Err(e) => warn!("Failed to serialize session value for {key}: {e}"),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.values.get(key)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Corrupt session value for {key}: {e}");
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    pub fn user(&self) -> Option<User> {
        self.get(USER_KEY)
    }
}

/// Mocked authentication: any email/password pair succeeds after a
/// simulated round trip. No credential ever leaves the process.
#[derive(Debug, Clone)]
pub struct Authenticator {
    delay: Duration,
}

impl Default for Authenticator {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
        }
    }
}

impl Authenticator {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn login(&self, store: &mut SessionStore, email: &str, _password: &str) -> User {
        tokio::time::sleep(self.delay).await;

        let user = User {
            // Display name derived from the address; there is no profile.
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            is_logged_in: true,
        };
        store.set(USER_KEY, &user);
        user
    }

    pub async fn signup(
        &self,
        store: &mut SessionStore,
        name: &str,
        email: &str,
        _password: &str,
    ) -> User {
        tokio::time::sleep(self.delay).await;

        let user = User {
            name: name.to_string(),
            email: email.to_string(),
            is_logged_in: true,
        };
        store.set(USER_KEY, &user);
        user
    }

    pub fn logout(&self, store: &mut SessionStore) {
        store.remove(USER_KEY);
    }
}
