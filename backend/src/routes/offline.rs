//! Handlers mounted when no database is configured. Writes are refused with a
//! user-facing message; reads return the defaults the UI can always render.

use rocket::http::Status;
use rocket::serde::json::{Json, Value, json};

use crate::error::VoteError;
use crate::models::{
    CastVoteRequest, HealthResponse, LoginRequest, TallySnapshot, VoterStatusResponse,
};
use crate::tally;

fn refused() -> (Status, Json<Value>) {
    let err = VoteError::NotConfigured;
    (err.status(), Json(json!({ "error": err.to_string() })))
}

#[post("/login", format = "json", data = "<login_request>")]
pub fn login(login_request: Json<LoginRequest>) -> (Status, Json<Value>) {
    let _ = login_request;
    refused()
}

#[post("/vote", format = "json", data = "<vote_request>")]
pub fn cast_vote(vote_request: Json<CastVoteRequest>) -> (Status, Json<Value>) {
    let _ = vote_request;
    refused()
}

#[get("/status?<voter_id>")]
pub fn get_vote_status(voter_id: i32) -> Json<VoterStatusResponse> {
    let _ = voter_id;
    Json(VoterStatusResponse {
        has_voted: false,
        voted_for: None,
    })
}

#[get("/tallies")]
pub fn get_tallies() -> Json<TallySnapshot> {
    Json(tally::empty_snapshot())
}

#[get("/health")]
pub fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        configured: false,
        connected: false,
    })
}
