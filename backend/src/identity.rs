//! Identity resolution: find-or-create a voter by (name, address).
//!
//! The pair acts as a natural key backed by a unique index, so two first-time
//! logins racing on the same pair converge on a single row: the loser's
//! insert hits the uniqueness constraint and falls back to a reselect.

use rocket_db_pools::Connection;
use rocket_db_pools::diesel::prelude::*;

use crate::db::VotingDB;
use crate::error::{InsertDisposition, VoteError, classify_insert};
use crate::models::{NewVoter, Voter};
use crate::schema::voters;

/// Trimmed (name, address), or None when either is empty after trimming.
pub fn trimmed_identity<'a>(name: &'a str, address: &'a str) -> Option<(&'a str, &'a str)> {
    let name = name.trim();
    let address = address.trim();
    if name.is_empty() || address.is_empty() {
        None
    } else {
        Some((name, address))
    }
}

/// Look up the voter for this (name, address) pair, creating the row on the
/// first login. Repeated identical calls return the same record.
pub async fn resolve(
    db: &mut Connection<VotingDB>,
    name: &str,
    address: &str,
) -> Result<Voter, VoteError> {
    let (name, address) = trimmed_identity(name, address)
        .ok_or_else(|| VoteError::Validation("name and address must not be empty".to_string()))?;

    if let Some(voter) = find_voter(db, name, address).await? {
        return Ok(voter);
    }

    let new_voter = NewVoter {
        name: name.to_string(),
        address: address.to_string(),
    };

    let inserted = diesel::insert_into(voters::table)
        .values(&new_voter)
        .execute(db)
        .await;

    match classify_insert(inserted) {
        InsertDisposition::Inserted => {
            let voter_id = diesel::select(diesel::dsl::sql::<diesel::sql_types::Integer>(
                "LAST_INSERT_ID()",
            ))
            .get_result::<i32>(db)
            .await?;

            Ok(voters::table.find(voter_id).first::<Voter>(db).await?)
        }
        InsertDisposition::LostRace => {
            // A concurrent first login for the same pair won the insert race.
            find_voter(db, name, address)
                .await?
                .ok_or(VoteError::Storage(diesel::result::Error::NotFound))
        }
        InsertDisposition::Failed(e) => Err(e.into()),
    }
}

async fn find_voter(
    db: &mut Connection<VotingDB>,
    name: &str,
    address: &str,
) -> Result<Option<Voter>, VoteError> {
    let voter = voters::table
        .filter(voters::name.eq(name))
        .filter(voters::address.eq(address))
        .first::<Voter>(db)
        .await
        .optional()?;

    Ok(voter)
}

#[cfg(test)]
mod tests {
    use super::trimmed_identity;

    #[test]
    fn identity_is_trimmed() {
        assert_eq!(
            trimmed_identity("  Ana ", " Jl. X\n"),
            Some(("Ana", "Jl. X"))
        );
    }

    #[test]
    fn blank_identity_is_rejected() {
        assert_eq!(trimmed_identity("", "Jl. X"), None);
        assert_eq!(trimmed_identity("Ana", "   "), None);
        assert_eq!(trimmed_identity(" \t", ""), None);
    }

    // Stock MySQL compares VARCHAR case-insensitively (utf8mb4_0900_ai_ci),
    // which would resolve "ana" to the voter stored as "Ana". The identity
    // columns must pin a binary collation so lookup and the unique key stay
    // exact-match.
    #[test]
    fn identity_columns_collate_case_sensitively() {
        let migration =
            include_str!("../migrations/2025-08-29-000001_create_voters_and_votes/up.sql");
        let voters_ddl = migration
            .split("CREATE TABLE votes")
            .next()
            .expect("voters DDL");

        for column in ["name", "address"] {
            let line = voters_ddl
                .lines()
                .find(|l| l.trim_start().starts_with(column))
                .expect("column definition");
            assert!(
                line.contains("COLLATE utf8mb4_bin"),
                "voters.{} must use a case-sensitive collation",
                column
            );
        }
    }
}
