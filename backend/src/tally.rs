//! Tally computation over the full vote set.
//!
//! Counting is a pure pass over the fetched candidate names; the fetch
//! degrades to an all-zero snapshot on failure so the grid always renders.

use rocket_db_pools::Connection;
use rocket_db_pools::diesel::prelude::*;

use crate::candidates::CANDIDATES;
use crate::db::VotingDB;
use crate::models::{TallyEntry, TallySnapshot};
use crate::schema::votes;

/// Per-candidate counts in roster order plus the total. The total covers
/// every fetched row; rows naming something outside the roster count toward
/// no candidate.
pub fn count_votes(ballots: &[String]) -> TallySnapshot {
    let total_votes = ballots.len() as i64;

    let candidates = CANDIDATES
        .iter()
        .map(|&candidate| {
            let count = ballots.iter().filter(|b| b.as_str() == candidate).count() as i64;
            TallyEntry {
                candidate_name: candidate.to_string(),
                count,
                percentage: vote_percentage(count, total_votes),
            }
        })
        .collect();

    TallySnapshot {
        candidates,
        total_votes,
    }
}

/// Share of the total as a one-decimal string; "0.0" when there are no votes.
pub fn vote_percentage(count: i64, total: i64) -> String {
    if total > 0 {
        format!("{:.1}", count as f64 / total as f64 * 100.0)
    } else {
        "0.0".to_string()
    }
}

pub fn empty_snapshot() -> TallySnapshot {
    count_votes(&[])
}

/// Fetch all recorded votes and count them. Never fails: a fetch error is
/// logged and reported as zero votes everywhere.
pub async fn compute_tallies(db: &mut Connection<VotingDB>) -> TallySnapshot {
    let ballots = votes::table
        .select(votes::candidate_name)
        .load::<String>(db)
        .await;

    match ballots {
        Ok(ballots) => count_votes(&ballots),
        Err(e) => {
            eprintln!("Error fetching vote counts: {}", e);
            empty_snapshot()
        }
    }
}
