#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, StoreFairing};
use crate::logging::LoggerFairing;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod store;
pub mod voting;

/// Assemble the server: routes, configuration, stores and logging.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .attach(StoreFairing)
        .attach(LoggerFairing)
}

/// A server over the given voting core, bypassing configuration.
#[cfg(test)]
pub(crate) fn rocket_for(core: voting::VotingCore) -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .manage(config::Config::example())
        .manage(core)
}

/// A server whose primary store is the given database.
#[cfg(test)]
pub(crate) fn rocket_for_db(db: &mongodb::Database) -> Rocket<Build> {
    use std::sync::Arc;

    let core = voting::VotingCore::new(
        Arc::new(store::MongoStore::from_db(db)),
        Arc::new(store::FallbackStore::with_demo_data()),
        voting::VotingPolicy::default(),
    );
    rocket_for(core)
}

/// Connect to the database named by `db_uri` in `Rocket.toml`.
#[cfg(test)]
pub(crate) async fn db_client() -> mongodb::Client {
    let db_uri = rocket::build()
        .figment()
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` not set");
    mongodb::Client::with_uri_str(&db_uri)
        .await
        .unwrap_or_else(|e| panic!("Could not connect to database at {db_uri}: {e}"))
}

/// A fresh database name, so that tests never collide.
#[cfg(test)]
pub(crate) fn database() -> String {
    let random: u32 = rand::random();
    format!("test{random}")
}
