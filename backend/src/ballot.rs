//! Vote casting: at most one recorded vote per voter.
//!
//! The pre-check narrows the common repeat-vote case; the unique index on
//! `votes.user_id` is the actual backstop against two near-simultaneous casts
//! for the same voter, since check-then-insert is not atomic across sessions.

use rocket_db_pools::Connection;
use rocket_db_pools::diesel::prelude::*;

use crate::candidates;
use crate::db::VotingDB;
use crate::error::{InsertDisposition, VoteError, classify_insert};
use crate::models::{NewVote, Vote};
use crate::schema::{voters, votes};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastOutcome {
    Recorded,
    AlreadyVoted { candidate: String },
}

/// Record a vote for `candidate_name` on behalf of `voter_id`, or report the
/// vote that already exists. Any storage failure other than a duplicate leaves
/// state unchanged and the vote uncounted.
pub async fn cast_vote(
    db: &mut Connection<VotingDB>,
    voter_id: i32,
    candidate_name: &str,
) -> Result<CastOutcome, VoteError> {
    if !candidates::is_candidate(candidate_name) {
        return Err(VoteError::Validation(format!(
            "unknown candidate: {}",
            candidate_name
        )));
    }

    // Re-check before inserting; a vote may exist from another tab or session.
    if let Some(existing) = find_vote(db, voter_id).await? {
        reconcile_choice(db, voter_id, &existing.candidate_name).await;
        return Ok(CastOutcome::AlreadyVoted {
            candidate: existing.candidate_name,
        });
    }

    let new_vote = NewVote {
        candidate_name: candidate_name.to_string(),
        user_id: voter_id,
    };

    let inserted = diesel::insert_into(votes::table)
        .values(&new_vote)
        .execute(db)
        .await;

    match classify_insert(inserted) {
        InsertDisposition::Inserted => {
            reconcile_choice(db, voter_id, candidate_name).await;
            Ok(CastOutcome::Recorded)
        }
        InsertDisposition::LostRace => {
            // Lost the race to a concurrent cast; its vote is the effective one.
            match find_vote(db, voter_id).await? {
                Some(vote) => Ok(CastOutcome::AlreadyVoted {
                    candidate: vote.candidate_name,
                }),
                None => Err(VoteError::Duplicate),
            }
        }
        InsertDisposition::Failed(e) => Err(e.into()),
    }
}

pub async fn find_vote(
    db: &mut Connection<VotingDB>,
    voter_id: i32,
) -> Result<Option<Vote>, VoteError> {
    let vote = votes::table
        .filter(votes::user_id.eq(voter_id))
        .first::<Vote>(db)
        .await
        .optional()?;

    Ok(vote)
}

// Best-effort annotation of the voter row. The vote row is the source of
// truth; a failure here is logged and never contradicts a recorded vote.
async fn reconcile_choice(db: &mut Connection<VotingDB>, voter_id: i32, candidate: &str) {
    let updated = diesel::update(voters::table.find(voter_id))
        .set(voters::voted_for.eq(candidate))
        .execute(db)
        .await;

    if let Err(e) = updated {
        eprintln!("Error updating voter record: {}", e);
    }
}
