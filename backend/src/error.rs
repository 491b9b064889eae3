use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket::http::Status;
use thiserror::Error;

/// Failures the voting components can report. A duplicate vote is recognized
/// here but reinterpreted by the caller as an outcome, never surfaced as a
/// fatal error.
#[derive(Debug, Error)]
pub enum VoteError {
    #[error("{0}")]
    Validation(String),
    #[error("database is not configured")]
    NotConfigured,
    #[error("a row already exists for this key")]
    Duplicate,
    #[error("storage error: {0}")]
    Storage(#[from] DieselError),
}

impl VoteError {
    pub fn status(&self) -> Status {
        match self {
            VoteError::Validation(_) => Status::UnprocessableEntity,
            VoteError::NotConfigured => Status::ServiceUnavailable,
            VoteError::Duplicate => Status::Conflict,
            VoteError::Storage(_) => Status::InternalServerError,
        }
    }
}

/// Uniqueness-violation check, the storage layer's signal that a second row
/// for an already-taken key was refused.
pub fn is_unique_violation(e: &DieselError) -> bool {
    matches!(
        e,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

/// What an insert against a uniqueness-guarded table amounted to. Losing the
/// race to a concurrent insert is an expected branch, not a failure.
#[derive(Debug)]
pub enum InsertDisposition {
    Inserted,
    LostRace,
    Failed(DieselError),
}

pub fn classify_insert(result: Result<usize, DieselError>) -> InsertDisposition {
    match result {
        Ok(_) => InsertDisposition::Inserted,
        Err(e) if is_unique_violation(&e) => InsertDisposition::LostRace,
        Err(e) => InsertDisposition::Failed(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::http::Status;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            VoteError::Validation("empty".into()).status(),
            Status::UnprocessableEntity
        );
        assert_eq!(VoteError::NotConfigured.status(), Status::ServiceUnavailable);
        assert_eq!(VoteError::Duplicate.status(), Status::Conflict);
        assert_eq!(
            VoteError::Storage(DieselError::NotFound).status(),
            Status::InternalServerError
        );
    }

    #[test]
    fn unique_violations_are_recognized() {
        let violation = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("Duplicate entry".to_string()),
        );
        assert!(is_unique_violation(&violation));
        assert!(!is_unique_violation(&DieselError::NotFound));
    }

    #[test]
    fn duplicate_insert_is_a_lost_race_not_a_failure() {
        let violation = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("Duplicate entry".to_string()),
        );
        assert!(matches!(
            classify_insert(Err(violation)),
            InsertDisposition::LostRace
        ));
        assert!(matches!(
            classify_insert(Ok(1)),
            InsertDisposition::Inserted
        ));
        assert!(matches!(
            classify_insert(Err(DieselError::NotFound)),
            InsertDisposition::Failed(DieselError::NotFound)
        ));
    }
}
