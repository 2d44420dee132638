use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::mongodb::ensure_indexes_exist;
use crate::store::{FallbackStore, MongoStore};
use crate::voting::{VotingCore, VotingPolicy};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // secrets
    jwt_secret: String,
}

impl Config {
    /// Secret key shared with the identity gateway, used to verify its JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

#[cfg(test)]
impl Config {
    pub fn example() -> Self {
        Self {
            jwt_secret: "gateway-test-secret".to_string(),
        }
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the other fairings and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the stores and the voting rules.
#[derive(Deserialize)]
struct StoreConfig {
    // secrets
    /// Without a URI there is no primary store, and everything is demo data.
    #[serde(default)]
    db_uri: Option<String>,
    // non-secrets
    #[serde(default = "StoreConfig::default_db_name")]
    db_name: String,
    #[serde(default = "StoreConfig::default_cast_attempts")]
    cast_attempts: u32,
    #[serde(default = "StoreConfig::default_retry_backoff_ms")]
    retry_backoff_ms: u64,
    #[serde(default)]
    enforce_voting_window: bool,
    #[serde(default = "StoreConfig::default_demo_fallback")]
    demo_fallback: bool,
}

impl StoreConfig {
    fn default_db_name() -> String {
        "ballot_ledger".to_string()
    }

    fn default_cast_attempts() -> u32 {
        VotingPolicy::default().cast_attempts
    }

    fn default_retry_backoff_ms() -> u64 {
        VotingPolicy::default().retry_backoff.as_millis() as u64
    }

    fn default_demo_fallback() -> bool {
        VotingPolicy::default().demo_fallback
    }

    fn policy(&self) -> VotingPolicy {
        VotingPolicy {
            cast_attempts: self.cast_attempts.max(1),
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            enforce_voting_window: self.enforce_voting_window,
            demo_fallback: self.demo_fallback,
        }
    }
}

/// A fairing that loads the store config, connects to the database if one is
/// configured, performs any setup necessary, and places a [`VotingCore`] into
/// managed state, along with the MongoDB `Client` and `Database` if any.
pub struct StoreFairing;

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "Stores",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<StoreConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load store config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        let policy = config.policy();
        let fallback = Arc::new(FallbackStore::with_demo_data());

        let db_uri = match config.db_uri.as_deref() {
            Some(uri) => uri,
            None => {
                warn!("No `db_uri` configured, running in demo mode");
                rocket = rocket.manage(VotingCore::demo(fallback, policy));
                return Ok(rocket);
            }
        };

        info!("Loaded database config, connecting...");
        // Construct the connection.
        let client = match MongoClient::with_uri_str(db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(&database_name(&config));

        // Ensure the required indexes exist. The unique vote index must be in
        // place before any vote is accepted.
        if let Err(e) = ensure_indexes_exist(&db).await {
            error!("Failed to create database indexes: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        // Manage the state.
        let core = VotingCore::new(Arc::new(MongoStore::from_db(&db)), fallback, policy);
        rocket = rocket.manage(client).manage(db).manage(core);
        Ok(rocket)
    }
}

/// Get the name of the database to use (non-test version).
#[cfg(not(test))]
fn database_name(config: &StoreConfig) -> String {
    config.db_name.clone()
}

/// Get the name of the database to use (test version).
/// Use a random name to avoid collisions between tests.
#[cfg(test)]
fn database_name(_config: &StoreConfig) -> String {
    crate::database()
}

#[cfg(test)]
mod tests {
    use rocket::figment::{providers::Serialized, Figment};

    use super::*;

    #[test]
    fn store_config_defaults_to_demo_mode_and_default_policy() {
        let config = Figment::new().extract::<StoreConfig>().unwrap();
        assert_eq!(config.db_uri, None);
        assert_eq!(config.db_name, "ballot_ledger");

        let policy = config.policy();
        let defaults = VotingPolicy::default();
        assert_eq!(policy.cast_attempts, defaults.cast_attempts);
        assert_eq!(policy.retry_backoff, defaults.retry_backoff);
        assert!(!policy.enforce_voting_window);
        assert!(policy.demo_fallback);
    }

    #[test]
    fn store_config_overrides() {
        let config = Figment::new()
            .merge(Serialized::default("db_uri", "mongodb://localhost:27017"))
            .merge(Serialized::default("cast_attempts", 0))
            .merge(Serialized::default("retry_backoff_ms", 250))
            .merge(Serialized::default("enforce_voting_window", true))
            .merge(Serialized::default("demo_fallback", false))
            .extract::<StoreConfig>()
            .unwrap();
        assert_eq!(config.db_uri.as_deref(), Some("mongodb://localhost:27017"));

        let policy = config.policy();
        // At least one attempt is always made.
        assert_eq!(policy.cast_attempts, 1);
        assert_eq!(policy.retry_backoff, Duration::from_millis(250));
        assert!(policy.enforce_voting_window);
        assert!(!policy.demo_fallback);
    }

    #[rocket::async_test]
    async fn ignition_aborts_when_indexes_cannot_be_created() {
        // The URI parses without connecting; creating the indexes cannot.
        let figment = rocket::Config::figment().merge((
            "db_uri",
            "mongodb://127.0.0.1:1/?directConnection=true&serverSelectionTimeoutMS=200",
        ));
        let err = match rocket::custom(figment).attach(StoreFairing).ignite().await {
            Ok(_) => panic!("ignited without indexes"),
            Err(err) => err,
        };
        match err.kind() {
            rocket::error::ErrorKind::FailedFairings(failed) => {
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].name, "Stores");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
