//! Core types and trait definitions for the project ledger.
//!
//! This crate is deliberately free of database and filesystem dependencies.
//! The SQLite backend, the report renderer and the CLI all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod journal;
pub mod phase;
pub mod registry;
pub mod search;
pub mod store;

pub use error::{Error, ErrorKind, Result};
