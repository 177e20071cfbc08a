//! One function per ledger operation.
//!
//! Each takes already shape-checked arguments, enforces the semantic rules,
//! performs a single unit of work against the store and returns a short
//! confirmation string. Failures come back as [`OpError`] values and never
//! end the process.

use std::{path::PathBuf, str::FromStr};

use chrono::Utc;
use ledger_core::{
  Error,
  journal::{NewLogEntry, NewUsageExample},
  phase::{NewPhase, NewPhaseItem, PhaseItemKind, PhaseMetric, PhasePatch, PhaseUpdate},
  registry::{InventoryUpsert, NewFaq, OverviewKey},
  search::{Scope, SearchHit, SearchMode, SearchQuery},
  store::LedgerStore,
};
use ledger_report::{Renderer, ReportKind};

use crate::error::{OpError, OpResult};

// ─── Phases ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseMode {
  Init,
  Update,
}

impl FromStr for PhaseMode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    match s {
      "init" => Ok(Self::Init),
      "update" => Ok(Self::Update),
      other => Err(Error::validation(format!(
        "unknown phase mode {other:?}; expected init or update"
      ))),
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct PhaseArgs {
  pub id:          String,
  pub title:       Option<String>,
  pub status:      Option<String>,
  pub description: Option<String>,
  /// Closing summary (update only).
  pub conclusion:  Option<String>,
  /// Stamp the phase's end time with the current time (update only).
  pub end:         bool,
}

pub async fn init_or_update_phase<S: LedgerStore>(
  store: &S,
  mode: PhaseMode,
  args: PhaseArgs,
) -> OpResult {
  match mode {
    PhaseMode::Init => {
      let input = NewPhase::new(args.id, args.title.unwrap_or_default())?
        .with_status(args.status)
        .with_description(args.description);
      let phase = store.init_phase(input).await.map_err(OpError::store)?;
      tracing::info!(phase = %phase.id, "phase initialised");
      Ok(format!("Initialized Phase {}: {}", phase.id, phase.title))
    }
    PhaseMode::Update => {
      let patch = PhasePatch {
        title:       args.title,
        status:      args.status,
        description: args.description,
        ended_at:    args.end.then(Utc::now),
        conclusion:  args.conclusion,
      };
      match store.update_phase(&args.id, patch).await.map_err(OpError::store)? {
        PhaseUpdate::NoChanges => Ok(format!("No updates provided for Phase {}.", args.id)),
        PhaseUpdate::Applied(phase) => {
          tracing::info!(phase = %phase.id, status = %phase.status, "phase updated");
          Ok(format!("Updated Phase {} (status: {}).", phase.id, phase.status))
        }
      }
    }
  }
}

pub async fn append_phase_item<S: LedgerStore>(
  store: &S,
  phase_id: String,
  kind: &str,
  text: String,
) -> OpResult {
  let kind: PhaseItemKind = kind.parse()?;
  let item = store
    .append_phase_item(NewPhaseItem { phase_id, kind, text })
    .await
    .map_err(OpError::store)?;
  Ok(format!("Added {} to Phase {}.", item.kind, item.phase_id))
}

pub async fn set_phase_metric<S: LedgerStore>(
  store: &S,
  phase_id: String,
  key: String,
  value: String,
) -> OpResult {
  if key.trim().is_empty() {
    return Err(Error::validation("a metric needs a key").into());
  }
  let metric = store
    .set_phase_metric(PhaseMetric { phase_id, key, value })
    .await
    .map_err(OpError::store)?;
  Ok(format!("Set metric {} = {} on Phase {}.", metric.key, metric.value, metric.phase_id))
}

// ─── Journal ─────────────────────────────────────────────────────────────────

pub async fn log_work<S: LedgerStore>(
  store: &S,
  phase_id: String,
  action: String,
  outcome: String,
  artifacts: Vec<String>,
) -> OpResult {
  let entry = store
    .log_work(NewLogEntry { phase_id, action, outcome, artifacts })
    .await
    .map_err(OpError::store)?;
  tracing::info!(phase = %entry.phase_id, entry = entry.id, "work logged");
  Ok(format!("Logged work for Phase {}.", entry.phase_id))
}

pub async fn add_usage_example<S: LedgerStore>(store: &S, input: NewUsageExample) -> OpResult {
  let example = store.add_usage_example(input).await.map_err(OpError::store)?;
  Ok(format!("Added usage example '{}' to Phase {}.", example.title, example.phase_id))
}

pub async fn manage_plan<S: LedgerStore>(store: &S, phase_id: String, step: String) -> OpResult {
  let step = store.add_plan_step(phase_id, step).await.map_err(OpError::store)?;
  Ok(format!("Added plan step to Phase {}.", step.phase_id))
}

pub async fn record_lesson<S: LedgerStore>(store: &S, phase_id: String, text: String) -> OpResult {
  let lesson = store.record_lesson(phase_id, text).await.map_err(OpError::store)?;
  Ok(format!("Lesson recorded for Phase {}.", lesson.phase_id))
}

// ─── Registries ──────────────────────────────────────────────────────────────

pub async fn register_inventory<S: LedgerStore>(store: &S, input: InventoryUpsert) -> OpResult {
  let item = store.upsert_inventory(input).await.map_err(OpError::store)?;
  Ok(format!("Updated inventory: {} [{}, {}]", item.path, item.category, item.status))
}

#[derive(Debug, Clone, Default)]
pub struct OverviewArgs {
  pub mission:      Option<String>,
  pub architecture: Option<String>,
  pub faq_question: Option<String>,
  pub faq_answer:   Option<String>,
  /// Scope the FAQ to a phase; `None` makes it global.
  pub faq_phase:    Option<String>,
}

/// Set overview facts and optionally add an FAQ.
///
/// The FAQ is only added when both question and answer are present; one
/// without the other is skipped.
pub async fn update_overview<S: LedgerStore>(store: &S, args: OverviewArgs) -> OpResult {
  let mut done = Vec::new();

  for (key, value) in [
    (OverviewKey::Mission, args.mission),
    (OverviewKey::Architecture, args.architecture),
  ] {
    if let Some(value) = value {
      store.set_overview_fact(key, value).await.map_err(OpError::store)?;
      done.push(format!("Updated {key}."));
    }
  }

  if let (Some(question), Some(answer)) = (args.faq_question, args.faq_answer) {
    let faq = store
      .add_faq(NewFaq { question, answer, phase_id: args.faq_phase })
      .await
      .map_err(OpError::store)?;
    done.push(format!("Added FAQ: {}", faq.question));
  }

  if done.is_empty() {
    return Ok("No overview updates provided.".to_owned());
  }
  Ok(done.join("\n"))
}

// ─── Search & reports ────────────────────────────────────────────────────────

async fn search_hits<S: LedgerStore>(
  store: &S,
  query: &SearchQuery,
) -> Result<Vec<SearchHit>, OpError> {
  tracing::debug!(query = %query.text, mode = ?query.mode, scope = ?query.scope, "searching");
  store.search(query).await.map_err(OpError::store)
}

fn search_query(query: String, mode: &str, scope: &[String]) -> Result<SearchQuery, OpError> {
  Ok(SearchQuery { text: query, mode: mode.parse()?, scope: Scope::parse(scope) })
}

/// One formatted line per hit, or a no-results message.
pub async fn search<S: LedgerStore>(
  store: &S,
  query: String,
  mode: &str,
  scope: &[String],
) -> OpResult {
  let query = search_query(query, mode, scope)?;
  let hits = search_hits(store, &query).await?;

  if hits.is_empty() {
    return Ok(format!("No results found for '{}'.", query.text));
  }
  Ok(hits.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"))
}

/// The same hits as [`search`], as a JSON array.
pub async fn search_json<S: LedgerStore>(
  store: &S,
  query: String,
  mode: &str,
  scope: &[String],
) -> OpResult {
  let query = search_query(query, mode, scope)?;
  let hits = search_hits(store, &query).await?;
  serde_json::to_string_pretty(&hits).map_err(|e| OpError::from(Error::Store(Box::new(e))))
}

/// Which report to render, before validation.
#[derive(Debug, Clone, Default)]
pub struct RenderArgs {
  pub kind:     String,
  pub phase_id: Option<String>,
  pub query:    Option<String>,
  pub mode:     Option<String>,
}

pub async fn render<S: LedgerStore>(renderer: &Renderer<S>, args: RenderArgs) -> OpResult {
  let mode = match args.mode.as_deref() {
    Some(mode) => mode.parse()?,
    None => SearchMode::Keyword,
  };
  let kind = ReportKind::parse(&args.kind, args.phase_id, args.query, mode)?;
  let written: Vec<PathBuf> = renderer.render(&kind).await?;

  let mut out = format!("Rendered {} document(s):", written.len());
  for path in &written {
    out.push_str("\n- ");
    out.push_str(&path.display().to_string());
  }
  Ok(out)
}
