//! Error types for `ledger-core`.
//!
//! [`Error`] is the taxonomy every backend converts into at the operation
//! boundary. [`ErrorKind`] is its coarse classification.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Missing or semantically invalid input.
  #[error("validation error: {0}")]
  Validation(String),

  #[error("phase not found: {0}")]
  PhaseNotFound(String),

  #[error("phase already exists: {0}")]
  PhaseExists(String),

  /// The storage engine rejected the operation for any other reason.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation(_) => ErrorKind::Validation,
      Self::PhaseNotFound(_) => ErrorKind::NotFound,
      Self::PhaseExists(_) => ErrorKind::Conflict,
      Self::Store(_) => ErrorKind::Store,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  NotFound,
  Conflict,
  Store,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
