//! Encoding and decoding helpers between ledger domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Rows whose columns need
//! decoding are read into `Raw*` structs first, inside the connection
//! closure, and converted to domain types outside it.

use chrono::{DateTime, Utc};
use ledger_core::{
  journal::{Lesson, LessonEntry, LogEntry, PlanStep},
  phase::{Phase, PhaseItemKind},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── PhaseItemKind ───────────────────────────────────────────────────────────

/// The table backing each item kind.
pub fn item_table(kind: PhaseItemKind) -> &'static str {
  match kind {
    PhaseItemKind::Objective => "objectives",
    PhaseItemKind::Finding => "findings",
    PhaseItemKind::NextStep => "next_steps",
  }
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

pub const PHASE_COLUMNS: &str = "id, title, status, description, started_at, ended_at, conclusion";

pub struct RawPhase {
  pub id:          String,
  pub title:       String,
  pub status:      String,
  pub description: String,
  pub started_at:  String,
  pub ended_at:    Option<String>,
  pub conclusion:  Option<String>,
}

impl RawPhase {
  /// Read a row selected with [`PHASE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      title:       row.get(1)?,
      status:      row.get(2)?,
      description: row.get(3)?,
      started_at:  row.get(4)?,
      ended_at:    row.get(5)?,
      conclusion:  row.get(6)?,
    })
  }

  pub fn into_phase(self) -> Result<Phase> {
    Ok(Phase {
      id:          self.id,
      title:       self.title,
      status:      self.status,
      description: self.description,
      started_at:  decode_dt(&self.started_at)?,
      ended_at:    decode_opt_dt(self.ended_at.as_deref())?,
      conclusion:  self.conclusion,
    })
  }
}

pub struct RawLogEntry {
  pub id:          i64,
  pub phase_id:    String,
  pub recorded_at: String,
  pub action:      String,
  pub outcome:     String,
  pub artifacts:   Vec<String>,
}

impl RawLogEntry {
  pub fn into_entry(self) -> Result<LogEntry> {
    Ok(LogEntry {
      id:          self.id,
      phase_id:    self.phase_id,
      recorded_at: decode_dt(&self.recorded_at)?,
      action:      self.action,
      outcome:     self.outcome,
      artifacts:   self.artifacts,
    })
  }
}

pub struct RawPlanStep {
  pub id:          i64,
  pub phase_id:    String,
  pub step:        String,
  pub recorded_at: String,
}

impl RawPlanStep {
  pub fn into_step(self) -> Result<PlanStep> {
    Ok(PlanStep {
      id:          self.id,
      phase_id:    self.phase_id,
      step:        self.step,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

pub struct RawLesson {
  pub id:          i64,
  pub phase_id:    String,
  pub text:        String,
  pub recorded_at: String,
  pub phase_title: Option<String>,
}

impl RawLesson {
  pub fn into_entry(self) -> Result<LessonEntry> {
    Ok(LessonEntry {
      lesson:      Lesson {
        id:          self.id,
        phase_id:    self.phase_id,
        text:        self.text,
        recorded_at: decode_dt(&self.recorded_at)?,
      },
      phase_title: self.phase_title,
    })
  }
}
