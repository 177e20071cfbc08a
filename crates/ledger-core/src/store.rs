//! The `LedgerStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `ledger-store-sqlite`).
//! The report renderer and the CLI depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  journal::{Lesson, LessonEntry, LogEntry, NewLogEntry, NewUsageExample, PlanStep, UsageExample},
  phase::{
    NewPhase, NewPhaseItem, Phase, PhaseItem, PhaseItemKind, PhaseMetric, PhasePatch, PhaseUpdate,
  },
  registry::{Faq, InventoryItem, InventoryUpsert, NewFaq, OverviewKey},
  search::{SearchHit, SearchQuery},
};

/// Abstraction over a ledger backend.
///
/// Every method is one atomic unit of work against the store. Apart from
/// phases (partial updates) and inventory (upsert), every record is
/// append-only. Nothing is ever deleted.
///
/// All methods return `Send` futures so the trait can be used from a
/// multi-threaded tokio runtime.
pub trait LedgerStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Phases ────────────────────────────────────────────────────────────

  /// Create a phase. Fails with a conflict if the id is already taken.
  fn init_phase(
    &self,
    input: NewPhase,
  ) -> impl Future<Output = Result<Phase, Self::Error>> + Send + '_;

  /// Apply a partial update. An empty patch returns
  /// [`PhaseUpdate::NoChanges`] without touching the store; otherwise a
  /// missing phase is an error.
  fn update_phase<'a>(
    &'a self,
    id: &'a str,
    patch: PhasePatch,
  ) -> impl Future<Output = Result<PhaseUpdate, Self::Error>> + Send + 'a;

  fn get_phase<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Phase>, Self::Error>> + Send + 'a;

  /// All phases in creation order.
  fn list_phases(&self) -> impl Future<Output = Result<Vec<Phase>, Self::Error>> + Send + '_;

  /// All phases ordered by id. All-digit ids sort first, by numeric value.
  fn list_phases_by_id(
    &self,
  ) -> impl Future<Output = Result<Vec<Phase>, Self::Error>> + Send + '_;

  /// Set one metric on a phase, replacing any earlier value for its key.
  fn set_phase_metric(
    &self,
    metric: PhaseMetric,
  ) -> impl Future<Output = Result<PhaseMetric, Self::Error>> + Send + '_;

  /// A phase's metrics in the order their keys were first set.
  fn list_phase_metrics<'a>(
    &'a self,
    phase_id: &'a str,
  ) -> impl Future<Output = Result<Vec<PhaseMetric>, Self::Error>> + Send + 'a;

  // ── Phase-scoped appends ──────────────────────────────────────────────

  /// Append an objective, finding or next step. The phase id is not
  /// checked.
  fn append_phase_item(
    &self,
    input: NewPhaseItem,
  ) -> impl Future<Output = Result<PhaseItem, Self::Error>> + Send + '_;

  fn list_phase_items<'a>(
    &'a self,
    phase_id: &'a str,
    kind: PhaseItemKind,
  ) -> impl Future<Output = Result<Vec<PhaseItem>, Self::Error>> + Send + 'a;

  /// Append an execution log entry together with its artifacts.
  fn log_work(
    &self,
    input: NewLogEntry,
  ) -> impl Future<Output = Result<LogEntry, Self::Error>> + Send + '_;

  /// Log entries for a phase, oldest first.
  fn list_log_entries<'a>(
    &'a self,
    phase_id: &'a str,
  ) -> impl Future<Output = Result<Vec<LogEntry>, Self::Error>> + Send + 'a;

  fn add_usage_example(
    &self,
    input: NewUsageExample,
  ) -> impl Future<Output = Result<UsageExample, Self::Error>> + Send + '_;

  fn list_usage_examples<'a>(
    &'a self,
    phase_id: &'a str,
  ) -> impl Future<Output = Result<Vec<UsageExample>, Self::Error>> + Send + 'a;

  fn add_plan_step(
    &self,
    phase_id: String,
    step: String,
  ) -> impl Future<Output = Result<PlanStep, Self::Error>> + Send + '_;

  /// Plan steps for a phase in insertion order.
  fn list_plan_steps<'a>(
    &'a self,
    phase_id: &'a str,
  ) -> impl Future<Output = Result<Vec<PlanStep>, Self::Error>> + Send + 'a;

  fn record_lesson(
    &self,
    phase_id: String,
    text: String,
  ) -> impl Future<Output = Result<Lesson, Self::Error>> + Send + '_;

  /// Every lesson with its phase title, oldest first.
  fn list_lessons(
    &self,
  ) -> impl Future<Output = Result<Vec<LessonEntry>, Self::Error>> + Send + '_;

  // ── Registries ────────────────────────────────────────────────────────

  /// Insert or update an inventory path and return the stored row.
  fn upsert_inventory(
    &self,
    input: InventoryUpsert,
  ) -> impl Future<Output = Result<InventoryItem, Self::Error>> + Send + '_;

  /// The whole inventory ordered by `(category, path)`.
  fn list_inventory(
    &self,
  ) -> impl Future<Output = Result<Vec<InventoryItem>, Self::Error>> + Send + '_;

  /// Replace an overview fact. Last write wins.
  fn set_overview_fact(
    &self,
    key: OverviewKey,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_overview_fact(
    &self,
    key: OverviewKey,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  fn add_faq(&self, input: NewFaq) -> impl Future<Output = Result<Faq, Self::Error>> + Send + '_;

  /// FAQs with no owning phase, in insertion order.
  fn list_global_faqs(
    &self,
  ) -> impl Future<Output = Result<Vec<Faq>, Self::Error>> + Send + '_;

  // ── Search ────────────────────────────────────────────────────────────

  /// Run `query` over the categories in its scope. Hits come back grouped
  /// by category in [`Category::ALL`](crate::search::Category::ALL) order
  /// and, within a category, in row order.
  fn search<'a>(
    &'a self,
    query: &'a SearchQuery,
  ) -> impl Future<Output = Result<Vec<SearchHit>, Self::Error>> + Send + 'a;
}
