//! Markdown report rendering for the project ledger.
//!
//! Assembles ledger state into fixed-layout documents and writes them under
//! a documents root. One renderer per report kind; `all` fans out to every
//! kind.
//!
//! # Quick start
//!
//! ```no_run
//! # async fn run(store: std::sync::Arc<impl ledger_core::store::LedgerStore>) {
//! use ledger_report::{DocPaths, Renderer, ReportKind};
//!
//! let renderer = Renderer::new(store, DocPaths::new("artifacts"));
//! let written = renderer.render(&ReportKind::All).await.unwrap();
//! println!("{} documents", written.len());
//! # }
//! ```

pub mod error;
mod kind;
pub mod markdown;
mod renderer;

pub use error::{Error, Result};
pub use kind::{DocPaths, ReportKind, sanitize};
pub use renderer::Renderer;
