//! Append-only, phase-scoped records: execution log entries, plan steps,
//! lessons and usage examples.
//!
//! None of these are ever updated or deleted once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Execution log ───────────────────────────────────────────────────────────

/// One line of a phase's execution log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
  pub id:          i64,
  pub phase_id:    String,
  pub recorded_at: DateTime<Utc>,
  pub action:      String,
  pub outcome:     String,
  /// Paths or names produced by the action, in the order they were given.
  pub artifacts:   Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewLogEntry {
  pub phase_id:  String,
  pub action:    String,
  pub outcome:   String,
  pub artifacts: Vec<String>,
}

// ─── Plan ────────────────────────────────────────────────────────────────────

/// A planned step. Steps read back in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
  pub id:          i64,
  pub phase_id:    String,
  pub step:        String,
  pub recorded_at: DateTime<Utc>,
}

// ─── Lessons ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
  pub id:          i64,
  pub phase_id:    String,
  pub text:        String,
  pub recorded_at: DateTime<Utc>,
}

/// A lesson joined with the title of its phase. The title is `None` when the
/// lesson points at a phase that was never created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonEntry {
  pub lesson:      Lesson,
  pub phase_title: Option<String>,
}

// ─── Usage examples ──────────────────────────────────────────────────────────

/// A titled code snippet showing how to use what a phase produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageExample {
  pub id:          i64,
  pub phase_id:    String,
  pub title:       String,
  pub code:        String,
  pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUsageExample {
  pub phase_id:    String,
  pub title:       String,
  pub code:        String,
  pub description: Option<String>,
}
