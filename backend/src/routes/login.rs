use rocket::http::Status;
use rocket::serde::json::Json;
use rocket_db_pools::Connection;

use crate::db::VotingDB;
use crate::identity;
use crate::models::{LoginRequest, Voter};

// Route to identify a voter, creating the record on first login
#[post("/login", format = "json", data = "<login_request>")]
pub async fn login(
    mut db: Connection<VotingDB>,
    login_request: Json<LoginRequest>,
) -> Result<Json<Voter>, Status> {
    let voter = identity::resolve(&mut db, &login_request.name, &login_request.address)
        .await
        .map_err(|e| {
            eprintln!("Error resolving voter: {}", e);
            e.status()
        })?;

    Ok(Json(voter))
}
