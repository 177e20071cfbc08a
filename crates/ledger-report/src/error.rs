//! Error types for the report renderer.

use std::path::PathBuf;

use ledger_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Ledger(#[from] ledger_core::Error),

  #[error("failed to write {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },
}

impl Error {
  /// Convert any backend error into [`Error::Ledger`].
  pub fn store<E: Into<ledger_core::Error>>(e: E) -> Self { Self::Ledger(e.into()) }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Ledger(e) => e.kind(),
      Self::Io { .. } => ErrorKind::Store,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
