// Main application entry point

#[macro_use]
extern crate rocket;

mod ballot;
mod candidates;
mod config;
mod db;
mod error;
mod identity;
mod models;
mod routes;
mod schema;
mod tally;

use rocket::fairing::AdHoc;
use rocket::tokio::sync::broadcast::{channel, Sender};
use rocket::{Build, Rocket};
use rocket_db_pools::Database;

use config::AppConfig;
use db::VotingDB;

/// Shared per-process state: the change-notification channel for the votes
/// table. Every successful vote insert sends a wakeup; live-tally streams
/// subscribe and recompute a full snapshot per wakeup.
pub struct AppState {
    pub votes_tx: Sender<()>,
}

#[rocket::launch]
fn rocket() -> Rocket<Build> {
    let app_config = AppConfig::load();

    let state = AppState {
        votes_tx: channel::<()>(1024).0,
    };

    // `#[launch]` does not support early `return`, so select the rocket via
    // an if/else expression instead.
    if let Some(database_url) = app_config.configured_database_url().map(String::from) {
        let figment = rocket::config::Config::figment()
            .merge(("port", app_config.rocket_port))
            .merge((
                "databases.voting_db",
                rocket_db_pools::Config {
                    url: database_url,
                    min_connections: None,
                    max_connections: 1024,
                    connect_timeout: 3,
                    idle_timeout: None,
                    extensions: None,
                },
            ));

        rocket::custom(figment)
            .attach(VotingDB::init())
            .attach(AdHoc::on_ignite("Database Migrations", db::run_migrations))
            .manage(state)
            .mount("/api", routes::api_routes())
            .register("/", catchers![routes::not_found, routes::unprocessable])
    } else {
        eprintln!(
            "⚠️  DATABASE_URL is missing or still a placeholder; \
             serving in unconfigured mode (writes refused, reads return defaults)"
        );
        offline_rocket(&app_config, state)
    }
}

/// The unconfigured-mode rocket. Honors the configured port like the full
/// service; only the route set differs.
fn offline_rocket(app_config: &AppConfig, state: AppState) -> Rocket<Build> {
    let figment = rocket::config::Config::figment().merge(("port", app_config.rocket_port));

    rocket::custom(figment)
        .manage(state)
        .mount("/api", routes::offline_routes())
        .register("/", catchers![routes::not_found, routes::unprocessable])
}
