use thiserror::Error;

use crate::RecordId;

/// errors returned by [`PeopleDb`](crate::PeopleDb) lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Invalid id: {0}")]
    InvalidId(RecordId),

    #[error("Invalid SSN: {0}")]
    UnknownSsn(String),
}

impl StoreError {
    /// `true` for either "not found" variant.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::InvalidId(_) | StoreError::UnknownSsn(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
