use rocket::Shutdown;
use rocket::State;
use rocket::http::Status;
use rocket::response::stream::{Event, EventStream};
use rocket::serde::json::Json;
use rocket::tokio::select;
use rocket::tokio::sync::broadcast::error::RecvError;
use rocket_db_pools::Connection;
use rocket_db_pools::diesel::prelude::*;

use crate::AppState;
use crate::ballot::{self, CastOutcome};
use crate::candidates::CANDIDATES;
use crate::db::VotingDB;
use crate::models::{
    CastVoteRequest, CastVoteResponse, HealthResponse, TallySnapshot, VoterStatusResponse,
};
use crate::schema::voters;
use crate::tally;

// Route to get the fixed candidate roster
#[get("/candidates")]
pub fn get_candidates() -> Json<Vec<&'static str>> {
    Json(CANDIDATES.to_vec())
}

// Route to cast a vote
#[post("/vote", format = "json", data = "<vote_request>")]
pub async fn cast_vote(
    mut db: Connection<VotingDB>,
    state: &State<AppState>,
    vote_request: Json<CastVoteRequest>,
) -> Result<(Status, Json<CastVoteResponse>), Status> {
    let outcome = ballot::cast_vote(&mut db, vote_request.voter_id, &vote_request.candidate_name)
        .await
        .map_err(|e| {
            eprintln!("Error casting vote: {}", e);
            e.status()
        })?;

    Ok(match outcome {
        CastOutcome::Recorded => {
            // Wake up live-tally subscribers; no one listening is fine.
            let _ = state.votes_tx.send(());

            (
                Status::Created,
                Json(CastVoteResponse {
                    outcome: "recorded".to_string(),
                    candidate_name: vote_request.candidate_name.clone(),
                }),
            )
        }
        CastOutcome::AlreadyVoted { candidate } => (
            Status::Ok,
            Json(CastVoteResponse {
                outcome: "already_voted".to_string(),
                candidate_name: candidate,
            }),
        ),
    })
}

// Route to check whether a voter has already cast a vote
#[get("/status?<voter_id>")]
pub async fn get_vote_status(
    mut db: Connection<VotingDB>,
    voter_id: i32,
) -> Json<VoterStatusResponse> {
    let existing = match ballot::find_vote(&mut db, voter_id).await {
        Ok(vote) => vote,
        Err(e) => {
            eprintln!("Error checking vote status: {}", e);
            None
        }
    };

    Json(VoterStatusResponse {
        has_voted: existing.is_some(),
        voted_for: existing.map(|v| v.candidate_name),
    })
}

// Route to get the current tally snapshot
#[get("/tallies")]
pub async fn get_tallies(mut db: Connection<VotingDB>) -> Json<TallySnapshot> {
    Json(tally::compute_tallies(&mut db).await)
}

// Route to stream tally snapshots: one on subscribe, then one per change
// notification on the votes table, until the client disconnects or the
// server shuts down
#[get("/tallies/live")]
pub async fn live_tallies(
    mut db: Connection<VotingDB>,
    state: &State<AppState>,
    mut end: Shutdown,
) -> EventStream![Event + '_] {
    let mut rx = state.votes_tx.subscribe();

    EventStream! {
        let snapshot = tally::compute_tallies(&mut db).await;
        yield Event::json(&snapshot).event("tallies");

        loop {
            select! {
                msg = rx.recv() => match msg {
                    Ok(()) => {},
                    // Missed wakeups are harmless: each refresh recomputes
                    // the full snapshot anyway.
                    Err(RecvError::Lagged(_)) => {},
                    Err(RecvError::Closed) => break,
                },
                _ = &mut end => break,
            }

            let snapshot = tally::compute_tallies(&mut db).await;
            yield Event::json(&snapshot).event("tallies");
        }
    }
}

// Route to probe database connectivity. The guard is optional so a pool that
// cannot hand out a connection still yields a JSON answer instead of a 503.
#[get("/health")]
pub async fn health(db: Option<Connection<VotingDB>>) -> Json<HealthResponse> {
    let connected = match db {
        Some(mut db) => match voters::table.count().get_result::<i64>(&mut db).await {
            Ok(_) => true,
            Err(e) => {
                eprintln!("Health probe failed: {}", e);
                false
            }
        },
        None => {
            eprintln!("Health probe could not acquire a database connection");
            false
        }
    };

    Json(HealthResponse {
        configured: true,
        connected,
    })
}

#[cfg(test)]
mod tests {
    use rocket::fairing::AdHoc;
    use rocket::http::{ContentType, Status};
    use rocket::local::blocking::Client;
    use rocket::serde::json::Value;
    use rocket::tokio::sync::broadcast::channel;
    use rocket_db_pools::Database;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::AppState;
    use crate::db::VotingDB;

    fn state() -> AppState {
        AppState {
            votes_tx: channel::<()>(16).0,
        }
    }

    #[test]
    fn health_reports_disconnected_when_no_connection_is_available() {
        let rocket = rocket::build()
            .manage(state())
            .mount("/api", crate::routes::api_routes());
        let client = Client::tracked(rocket).expect("valid rocket instance");

        let response = client.get("/api/health").dispatch();
        assert_eq!(response.status(), Status::Ok);

        let body: Value = response.into_json().expect("json health");
        assert_eq!(body["configured"], true);
        assert_eq!(body["connected"], false);
    }

    // End-to-end check of the storage-backed invariants: logging in twice
    // resolves to one voter, the second cast never creates a second vote row,
    // and the tally total moves by exactly one.
    //
    //   DATABASE_URL=mysql://... cargo test -p voting-backend -- --ignored
    #[test]
    #[ignore = "needs a MySQL server reachable via DATABASE_URL"]
    fn resolve_is_idempotent_and_second_cast_reports_first_choice() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL for the live-database test");

        let figment = rocket::config::Config::figment().merge((
            "databases.voting_db",
            rocket_db_pools::Config {
                url,
                min_connections: None,
                max_connections: 4,
                connect_timeout: 3,
                idle_timeout: None,
                extensions: None,
            },
        ));

        let rocket = rocket::custom(figment)
            .attach(VotingDB::init())
            .attach(AdHoc::on_ignite("Database Migrations", crate::db::run_migrations))
            .manage(state())
            .mount("/api", crate::routes::api_routes());
        let client = Client::tracked(rocket).expect("valid rocket instance");

        // A fresh identity per run keeps reruns against the same database clean.
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let login_body = format!(r#"{{"name": "Ana {}", "address": "Jl. X"}}"#, nonce);

        let first: Value = client
            .post("/api/login")
            .header(ContentType::JSON)
            .body(&login_body)
            .dispatch()
            .into_json()
            .expect("voter json");
        let second: Value = client
            .post("/api/login")
            .header(ContentType::JSON)
            .body(&login_body)
            .dispatch()
            .into_json()
            .expect("voter json");
        assert_eq!(first["id"], second["id"]);

        let voter_id = first["id"].as_i64().expect("voter id");

        let before: Value = client
            .get("/api/tallies")
            .dispatch()
            .into_json()
            .expect("tallies json");

        let cast = |candidate: &str| {
            let response = client
                .post("/api/vote")
                .header(ContentType::JSON)
                .body(format!(
                    r#"{{"voter_id": {}, "candidate_name": "{}"}}"#,
                    voter_id, candidate
                ))
                .dispatch();
            let status = response.status();
            let body: Value = response.into_json().expect("vote json");
            (status, body)
        };

        let (status, recorded) = cast("Doni");
        assert_eq!(status, Status::Created);
        assert_eq!(recorded["outcome"], "recorded");
        assert_eq!(recorded["candidate_name"], "Doni");

        let (status, duplicate) = cast("Bayu");
        assert_eq!(status, Status::Ok);
        assert_eq!(duplicate["outcome"], "already_voted");
        assert_eq!(duplicate["candidate_name"], "Doni");

        let status_uri = format!("/api/status?voter_id={}", voter_id);
        let voter_status: Value = client
            .get(status_uri.as_str())
            .dispatch()
            .into_json()
            .expect("status json");
        assert_eq!(voter_status["has_voted"], true);
        assert_eq!(voter_status["voted_for"], "Doni");

        let after: Value = client
            .get("/api/tallies")
            .dispatch()
            .into_json()
            .expect("tallies json");
        assert_eq!(
            after["total_votes"].as_i64().expect("total"),
            before["total_votes"].as_i64().expect("total") + 1
        );
    }
}
