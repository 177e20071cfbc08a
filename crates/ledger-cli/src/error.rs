//! The textual error result returned by every operation.

use ledger_core::ErrorKind;
use thiserror::Error;

/// A failed operation. Its `Display` form is what the caller sees.
#[derive(Debug, Error)]
#[error("Error: {message}")]
pub struct OpError {
  pub kind:    ErrorKind,
  pub message: String,
}

impl OpError {
  /// Convert any backend error via the core taxonomy.
  pub fn store<E: Into<ledger_core::Error>>(e: E) -> Self { Self::from(e.into()) }
}

impl From<ledger_core::Error> for OpError {
  fn from(e: ledger_core::Error) -> Self {
    Self { kind: e.kind(), message: e.to_string() }
  }
}

impl From<ledger_report::Error> for OpError {
  fn from(e: ledger_report::Error) -> Self {
    Self { kind: e.kind(), message: e.to_string() }
  }
}

pub type OpResult = Result<String, OpError>;
