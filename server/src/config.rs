use std::{env, fmt::Display, fs::read_to_string, str::FromStr, sync::OnceLock};

use tracing::{info, warn};

/// Controls error-detail verbosity: development responses carry internal
/// detail, production responses never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

pub struct Config {
    pub port: u16,
    /// Base URL of the external model backend.
    pub model_api_url: String,
    pub meili_url: String,
    pub meili_key: String,
    pub environment: Environment,
}

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

impl Config {
    pub fn load() -> Self {
        let config = Self {
            port: try_load("RUST_PORT", "3001"),
            model_api_url: try_load("MODEL_API_URL", "http://localhost:8000"),
            meili_url: try_load("MEILI_URL", "http://localhost:7700"),
            meili_key: read_secret("MEILI_ADMIN_KEY"),
            environment: try_load("APP_ENV", "development"),
        };

        set_environment(config.environment);
        config
    }
}

/// Fixes the process-wide environment used when rendering error bodies.
/// First caller wins; `Config::load` passes the configured value.
pub fn set_environment(environment: Environment) {
    let _ = ENVIRONMENT.set(environment);
}

/// Whether error responses may carry internal detail.
pub fn verbose_errors() -> bool {
    matches!(
        ENVIRONMENT.get().copied().unwrap_or(Environment::Development),
        Environment::Development
    )
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

fn read_secret(secret_name: &str) -> String {
    let path = format!("/run/secrets/{secret_name}");

    // Docker secret first, plain environment variable outside the swarm. The
    // relay routes never touch the store, so a missing key only bites once a
    // persistence call is made.
    if let Ok(secret) = read_to_string(&path) {
        return secret.trim().to_string();
    }

    var(secret_name).unwrap_or_else(|_| {
        warn!("No secret file or variable for {secret_name}");
        String::new()
    })
}
