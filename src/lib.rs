#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod store;

pub use config::Config;

/// Build the server: routes, logging, config and database.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(logging::LoggerFairing)
        .attach(config::ConfigFairing)
        .attach(config::DatabaseFairing)
}

/// Connect to the database named in the test config.
#[cfg(test)]
pub(crate) async fn db_client() -> mongodb::Client {
    let db_uri = rocket::Config::figment()
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` not set");
    mongodb::Client::with_uri_str(db_uri)
        .await
        .expect("Failed to connect to database")
}

/// A fresh database name for one test.
#[cfg(test)]
pub(crate) fn database() -> String {
    config::get_database_name()
}

/// Build a server on an already-connected database, bypassing
/// [`config::DatabaseFairing`].
#[cfg(test)]
pub(crate) async fn rocket_for_db(
    db_client: mongodb::Client,
    db_name: &str,
    policy: model::common::ReferencePolicy,
) -> Rocket<Build> {
    let db = db_client.database(db_name);
    config::prepare_database(&db)
        .await
        .expect("Failed to prepare test database");

    let figment = rocket::Config::figment().merge(("reference_policy", policy));
    rocket::custom(figment)
        .mount("/", api::routes())
        .attach(logging::LoggerFairing)
        .attach(config::ConfigFairing)
        .manage(db_client)
        .manage(db)
}
