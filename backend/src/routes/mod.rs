// Routes module - organizes all HTTP route handlers

pub mod login;
pub mod offline;
pub mod voting;

use rocket::Route;
use rocket::serde::json::{Value, json};

pub fn api_routes() -> Vec<Route> {
    routes![
        login::login,
        voting::get_candidates,
        voting::cast_vote,
        voting::get_vote_status,
        voting::get_tallies,
        voting::live_tallies,
        voting::health,
    ]
}

/// Route set mounted instead of `api_routes` when no database is configured:
/// writes are refused locally, reads return empty defaults, and the static
/// candidate roster is still served.
pub fn offline_routes() -> Vec<Route> {
    routes![
        offline::login,
        voting::get_candidates,
        offline::cast_vote,
        offline::get_vote_status,
        offline::get_tallies,
        offline::health,
    ]
}

#[catch(404)]
pub fn not_found() -> Value {
    json!({ "error": "resource not found" })
}

#[catch(422)]
pub fn unprocessable() -> Value {
    json!({ "error": "request body could not be processed" })
}
