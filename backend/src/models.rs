use chrono::NaiveDateTime;
use rocket::serde::{Deserialize, Serialize};
use rocket_db_pools::diesel::prelude::*;

use crate::schema::{voters, votes};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = voters)]
pub struct Voter {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub voted_for: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = voters)]
pub struct NewVoter {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = votes)]
pub struct Vote {
    pub id: i32,
    pub candidate_name: String,
    pub user_id: i32,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = votes)]
pub struct NewVote {
    pub candidate_name: String,
    pub user_id: i32,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct LoginRequest {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct CastVoteRequest {
    pub voter_id: i32,
    pub candidate_name: String,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct CastVoteResponse {
    pub outcome: String,
    pub candidate_name: String,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct VoterStatusResponse {
    pub has_voted: bool,
    pub voted_for: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TallyEntry {
    pub candidate_name: String,
    pub count: i64,
    pub percentage: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TallySnapshot {
    pub candidates: Vec<TallyEntry>,
    pub total_votes: i64,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthResponse {
    pub configured: bool,
    pub connected: bool,
}
