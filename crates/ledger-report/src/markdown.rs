//! Markdown layouts for every report kind.
//!
//! Pure functions from already-loaded ledger data to document text. The
//! layouts are fixed: sections always appear in the same order, and a
//! section with no rows keeps its heading with an empty list under it.

use chrono::{DateTime, Utc};
use ledger_core::{
  journal::{LessonEntry, LogEntry, PlanStep, UsageExample},
  phase::{Phase, PhaseItem, PhaseMetric},
  registry::{Faq, InventoryItem},
  search::SearchMode,
};

pub const MISSION_PLACEHOLDER: &str = "_No mission statement recorded yet._";
pub const ARCHITECTURE_PLACEHOLDER: &str = "_No architecture notes recorded yet._";
pub const NO_RESULTS_PLACEHOLDER: &str = "_No results found._";

/// Everything the phase report shows, already ordered.
#[derive(Debug, Clone)]
pub struct PhaseReport {
  pub phase:      Phase,
  pub objectives: Vec<PhaseItem>,
  pub plan:       Vec<PlanStep>,
  pub log:        Vec<LogEntry>,
  pub metrics:    Vec<PhaseMetric>,
  pub findings:   Vec<PhaseItem>,
  pub next_steps: Vec<PhaseItem>,
  pub examples:   Vec<UsageExample>,
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn date(dt: DateTime<Utc>) -> String { dt.format("%Y-%m-%d").to_string() }

/// Append `s` and a newline.
fn line(out: &mut String, s: &str) {
  out.push_str(s);
  out.push('\n');
}

/// Escape a value for use inside a Markdown table cell.
pub(crate) fn escape_cell(s: &str) -> String {
  s.replace('|', "\\|").replace('\n', " ")
}

/// Emit `## heading`, the body lines, and a blank separator line.
fn section<I>(out: &mut String, heading: &str, lines: I)
where
  I: IntoIterator<Item = String>,
{
  line(out, &format!("## {heading}"));
  for body in lines {
    line(out, &body);
  }
  out.push('\n');
}

fn bullets(items: &[PhaseItem]) -> impl Iterator<Item = String> + '_ {
  items.iter().map(|i| format!("- {}", i.text))
}

// ─── Phase ────────────────────────────────────────────────────────────────────

pub fn phase_report(report: &PhaseReport) -> String {
  let phase = &report.phase;
  let mut out = String::new();

  line(&mut out, &format!("# Phase {}: {}", phase.id, phase.title));
  out.push('\n');
  line(&mut out, &format!("**Status:** {}", phase.status));
  match phase.ended_at {
    Some(end) => line(
      &mut out,
      &format!("**Date:** {} to {}", date(phase.started_at), date(end)),
    ),
    None => line(&mut out, &format!("**Date:** {}", date(phase.started_at))),
  }
  if !phase.description.is_empty() {
    line(&mut out, &format!("**Description:** {}", phase.description));
  }
  out.push('\n');

  section(&mut out, "Objectives", bullets(&report.objectives));

  section(
    &mut out,
    "Execution Plan",
    report
      .plan
      .iter()
      .enumerate()
      .map(|(i, s)| format!("{}. **[{}]** {}", i + 1, date(s.recorded_at), s.step)),
  );

  section(
    &mut out,
    "Execution Log",
    report.log.iter().map(|e| {
      let mut entry = format!(
        "- **{}**: {}\n  - Outcome: {}",
        date(e.recorded_at),
        e.action,
        e.outcome
      );
      if !e.artifacts.is_empty() {
        let artifacts: Vec<String> = e.artifacts.iter().map(|a| format!("`{a}`")).collect();
        entry.push_str(&format!("\n  - Artifacts: {}", artifacts.join(", ")));
      }
      entry
    }),
  );

  section(
    &mut out,
    "Metrics",
    report.metrics.iter().map(|m| format!("- **{}:** {}", m.key, m.value)),
  );

  section(&mut out, "Key Findings", bullets(&report.findings));
  section(&mut out, "Conclusion", phase.conclusion.clone());
  section(&mut out, "Next Steps", bullets(&report.next_steps));

  section(
    &mut out,
    "Usage Examples",
    report.examples.iter().map(|ex| {
      let mut block = format!("### {}\n", ex.title);
      if let Some(description) = ex.description.as_deref().filter(|d| !d.is_empty()) {
        block.push_str(&format!("{description}\n\n"));
      }
      block.push_str(&format!("```bash\n{}\n```\n", ex.code.trim_end()));
      block
    }),
  );

  out
}

// ─── Inventory ────────────────────────────────────────────────────────────────

/// `items` must already be sorted by `(category, path)`.
pub fn inventory_report(items: &[InventoryItem]) -> String {
  let mut out = String::from("# Script & Tool Inventory\n\n");
  out.push_str("| Path | Category | Description | Status | Usage |\n");
  out.push_str("|---|---|---|---|---|\n");
  for item in items {
    let usage = item
      .usage
      .as_deref()
      .map(|u| format!("`{}`", escape_cell(u)))
      .unwrap_or_default();
    line(
      &mut out,
      &format!(
        "| `{}` | {} | {} | {} | {} |",
        escape_cell(&item.path),
        escape_cell(&item.category),
        escape_cell(&item.description),
        escape_cell(&item.status),
        usage,
      ),
    );
  }
  out
}

// ─── Lessons ──────────────────────────────────────────────────────────────────

/// `lessons` must already be in timestamp order.
pub fn lessons_report(lessons: &[LessonEntry]) -> String {
  let mut out = String::from("# Lessons Learned\n\n");
  for entry in lessons {
    let lesson = &entry.lesson;
    let phase = match &entry.phase_title {
      Some(title) => format!("Phase {} ({title})", lesson.phase_id),
      None => format!("Phase {}", lesson.phase_id),
    };
    line(
      &mut out,
      &format!("- **[{}]** {phase}: {}", date(lesson.recorded_at), lesson.text),
    );
  }
  out
}

// ─── Overview ─────────────────────────────────────────────────────────────────

pub fn overview_report(
  mission: Option<&str>,
  architecture: Option<&str>,
  phases: &[Phase],
  faqs: &[Faq],
) -> String {
  let mut out = String::from("# Project Overview\n\n");

  section(&mut out, "Mission", [mission.unwrap_or(MISSION_PLACEHOLDER).to_owned()]);
  section(&mut out, "Architecture", [
    architecture.unwrap_or(ARCHITECTURE_PLACEHOLDER).to_owned()
  ]);

  section(
    &mut out,
    "Phases",
    phases.iter().map(|p| {
      let mut entry = format!("- **Phase {}: {}** [{}]", p.id, p.title, p.status);
      if !p.description.is_empty() {
        entry.push_str(&format!(" {}", p.description));
      }
      entry
    }),
  );

  section(
    &mut out,
    "FAQ",
    faqs.iter().map(|f| format!("### {}\n{}\n", f.question, f.answer)),
  );

  out
}

// ─── Search ───────────────────────────────────────────────────────────────────

pub fn search_report(query: &str, mode: SearchMode, lines: &[String]) -> String {
  let mut out = format!("# Search Results: {query}\n\n");
  let mode = match mode {
    SearchMode::Keyword => "keyword",
    SearchMode::Regex => "regex",
  };
  line(&mut out, &format!("**Mode:** {mode}"));
  out.push('\n');

  if lines.is_empty() {
    line(&mut out, NO_RESULTS_PLACEHOLDER);
  } else {
    for hit in lines {
      line(&mut out, &format!("- {hit}"));
    }
  }
  out
}
