//! Operation boundary for the project ledger.
//!
//! Every ledger operation takes validated arguments, runs as one unit of
//! work against a [`LedgerStore`](ledger_core::store::LedgerStore) and
//! returns either a text result or an [`OpError`]. The `ledger` binary is
//! a thin clap wrapper over these functions.

pub mod error;
pub mod ops;
pub mod settings;

pub use error::{OpError, OpResult};
pub use settings::Settings;
