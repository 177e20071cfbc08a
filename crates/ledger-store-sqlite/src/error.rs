//! Error type for `ledger-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] ledger_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("phase not found: {0}")]
  PhaseNotFound(String),

  /// Attempted to initialise a phase whose id is already taken.
  #[error("phase already exists: {0}")]
  PhaseExists(String),
}

impl From<Error> for ledger_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(e) => e,
      Error::PhaseNotFound(id) => Self::PhaseNotFound(id),
      Error::PhaseExists(id) => Self::PhaseExists(id),
      other => Self::Store(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
