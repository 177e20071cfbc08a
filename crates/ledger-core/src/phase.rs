//! Phases and the short text items that hang off them.
//!
//! A phase is the only entity with a caller-chosen key. Everything else in
//! the ledger refers back to a phase by that id, but the reference is soft:
//! nothing checks that the phase exists when an item is appended.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Status given to a phase created without one.
pub const DEFAULT_PHASE_STATUS: &str = "Pending";

// ─── Phase ───────────────────────────────────────────────────────────────────

/// A caller-defined unit of project work.
///
/// `status` is free-form text; no set of allowed values is enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
  pub id:          String,
  pub title:       String,
  pub status:      String,
  pub description: String,
  /// Set by the store when the phase is created.
  pub started_at:  DateTime<Utc>,
  pub ended_at:    Option<DateTime<Utc>>,
  /// Closing summary, usually written when the phase ends.
  pub conclusion:  Option<String>,
}

/// Input for creating a phase. Build with [`NewPhase::new`], which enforces
/// that the id and title are present.
#[derive(Debug, Clone)]
pub struct NewPhase {
  pub id:          String,
  pub title:       String,
  pub status:      String,
  pub description: String,
}

impl NewPhase {
  pub fn new(id: impl Into<String>, title: impl Into<String>) -> Result<Self> {
    let id = id.into();
    let title = title.into();

    if id.trim().is_empty() {
      return Err(Error::validation("phase id must not be empty"));
    }
    // The id names the phase's report file.
    if id.contains(['/', '\\']) || id.contains("..") {
      return Err(Error::validation(format!(
        "phase id {id:?} must not contain path separators or '..'"
      )));
    }
    if title.trim().is_empty() {
      return Err(Error::validation(format!(
        "a title is required to initialise phase {id}"
      )));
    }

    Ok(Self {
      id,
      title,
      status: DEFAULT_PHASE_STATUS.to_owned(),
      description: String::new(),
    })
  }

  pub fn with_status(mut self, status: Option<String>) -> Self {
    if let Some(status) = status {
      self.status = status;
    }
    self
  }

  pub fn with_description(mut self, description: Option<String>) -> Self {
    if let Some(description) = description {
      self.description = description;
    }
    self
  }
}

/// A partial update of a phase. Fields left as `None` are not touched.
#[derive(Debug, Clone, Default)]
pub struct PhasePatch {
  pub title:       Option<String>,
  pub status:      Option<String>,
  pub description: Option<String>,
  pub ended_at:    Option<DateTime<Utc>>,
  pub conclusion:  Option<String>,
}

impl PhasePatch {
  pub fn is_empty(&self) -> bool {
    self.title.is_none()
      && self.status.is_none()
      && self.description.is_none()
      && self.ended_at.is_none()
      && self.conclusion.is_none()
  }
}

/// Outcome of [`LedgerStore::update_phase`](crate::store::LedgerStore::update_phase).
#[derive(Debug, Clone)]
pub enum PhaseUpdate {
  /// The patch was applied; carries the phase as it now reads.
  Applied(Phase),
  /// The patch was empty, so the store was not touched.
  NoChanges,
}

// ─── Phase items ─────────────────────────────────────────────────────────────

/// The three kinds of one-line item a phase collects. Each kind lives in its
/// own table and is fixed once written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseItemKind {
  Objective,
  Finding,
  NextStep,
}

impl PhaseItemKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Objective => "objective",
      Self::Finding => "finding",
      Self::NextStep => "next_step",
    }
  }
}

impl fmt::Display for PhaseItemKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for PhaseItemKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "objective" | "objectives" => Ok(Self::Objective),
      "finding" | "findings" => Ok(Self::Finding),
      "next_step" | "next_steps" | "next-step" => Ok(Self::NextStep),
      other => Err(Error::validation(format!(
        "unknown item kind {other:?}; expected objective, finding or next_step"
      ))),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseItem {
  pub id:       i64,
  pub phase_id: String,
  pub kind:     PhaseItemKind,
  pub text:     String,
}

#[derive(Debug, Clone)]
pub struct NewPhaseItem {
  pub phase_id: String,
  pub kind:     PhaseItemKind,
  pub text:     String,
}

// ─── Metrics ─────────────────────────────────────────────────────────────────

/// A named measurement on a phase. Setting a key again replaces its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMetric {
  pub phase_id: String,
  pub key:      String,
  pub value:    String,
}
