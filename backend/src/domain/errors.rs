//! Boundary error taxonomy for the drink ledger.
//!
//! Every public service and facade operation returns `LedgerResult<T>` so the
//! calling application can pattern-match on the failure kind instead of
//! string-matching error messages. Storage internals use `anyhow` and are
//! normalized into `LedgerError::Storage` at the service layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Input validation failed (empty name, non-positive volume, out-of-range
    /// strength, bad date or hour value)
    #[error("invalid field: {0}")]
    InvalidField(String),

    /// The referenced entry id does not exist
    #[error("entry not found: {0}")]
    NotFound(String),

    /// An entry with this id already exists
    #[error("duplicate entry id: {0}")]
    DuplicateId(String),

    /// Baseline period contains no qualifying entries
    #[error("empty period: {0}")]
    EmptyPeriod(String),

    /// Neither total consumption nor daily average was supplied
    #[error("missing input: {0}")]
    MissingInput(String),

    /// Import document could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// Underlying storage failed (I/O, serialization)
    #[error("storage error: {0}")]
    Storage(String),

    /// An operation was called before a successful `init`
    #[error("ledger not initialized")]
    NotInitialized,
}

impl LedgerError {
    /// Normalize an internal storage failure into the boundary taxonomy.
    pub fn storage(err: anyhow::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
