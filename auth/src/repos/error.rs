/**
 * Responsibility
 * - What the persistence layer tells the layers above
 * - Unique violations get their own variant so "email taken" is a 409, not a 500
 */
use thiserror::Error;

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error: {0}")]
    Db(sqlx::Error),
    #[error("conflict")]
    Conflict,
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e
            && dbe.code().as_deref() == Some(UNIQUE_VIOLATION)
        {
            return RepoError::Conflict;
        }
        RepoError::Db(e)
    }
}

pub type RepoResult<T> = Result<T, RepoError>;
