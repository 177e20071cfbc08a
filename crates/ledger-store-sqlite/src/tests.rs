//! Integration tests for `SqliteStore` against an in-memory database.

use ledger_core::{
  ErrorKind,
  journal::{NewLogEntry, NewUsageExample},
  phase::{NewPhase, NewPhaseItem, PhaseItemKind, PhaseMetric, PhasePatch, PhaseUpdate},
  registry::{InventoryUpsert, NewFaq, OverviewKey},
  search::{Category, Scope, SearchQuery},
  store::LedgerStore,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn phase(s: &SqliteStore, id: &str, title: &str) {
  s.init_phase(NewPhase::new(id, title).unwrap()).await.unwrap();
}

fn item(phase_id: &str, kind: PhaseItemKind, text: &str) -> NewPhaseItem {
  NewPhaseItem { phase_id: phase_id.into(), kind, text: text.into() }
}

fn inventory(path: &str, description: &str, category: Option<&str>) -> InventoryUpsert {
  InventoryUpsert {
    path:        path.into(),
    description: description.into(),
    category:    category.map(str::to_owned),
    ..Default::default()
  }
}

async fn lines(s: &SqliteStore, query: &SearchQuery) -> Vec<String> {
  s.search(query)
    .await
    .unwrap()
    .iter()
    .map(ToString::to_string)
    .collect()
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ensure_schema_is_idempotent() {
  let s = store().await;
  phase(&s, "1", "Bootstrap").await;

  s.ensure_schema().await.unwrap();
  s.ensure_schema().await.unwrap();

  assert_eq!(s.list_phases().await.unwrap().len(), 1);
}

#[tokio::test]
async fn reopening_a_file_keeps_data() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("ledger.db");

  let s = SqliteStore::open(&path).await.unwrap();
  phase(&s, "1", "Bootstrap").await;
  s.close().await.unwrap();

  let s = SqliteStore::open(&path).await.unwrap();
  let fetched = s.get_phase("1").await.unwrap().unwrap();
  assert_eq!(fetched.title, "Bootstrap");
}

// ─── Phases ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn init_and_get_phase() {
  let s = store().await;
  let created = s
    .init_phase(
      NewPhase::new("1", "Bootstrap")
        .unwrap()
        .with_description(Some("Set things up".into())),
    )
    .await
    .unwrap();
  assert_eq!(created.status, "Pending");
  assert!(created.ended_at.is_none());

  let fetched = s.get_phase("1").await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_phase_missing_returns_none() {
  let s = store().await;
  assert!(s.get_phase("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_init_is_conflict() {
  let s = store().await;
  phase(&s, "1", "Bootstrap").await;

  let err = s
    .init_phase(NewPhase::new("1", "Again").unwrap())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PhaseExists(ref id) if id == "1"));
  assert_eq!(ledger_core::Error::from(err).kind(), ErrorKind::Conflict);

  let fetched = s.get_phase("1").await.unwrap().unwrap();
  assert_eq!(fetched.title, "Bootstrap");
}

#[tokio::test]
async fn partial_update_leaves_other_fields() {
  let s = store().await;
  s.init_phase(
    NewPhase::new("1", "Bootstrap")
      .unwrap()
      .with_description(Some("Set things up".into())),
  )
  .await
  .unwrap();

  let patch = PhasePatch { status: Some("Active".into()), ..Default::default() };
  let PhaseUpdate::Applied(updated) = s.update_phase("1", patch).await.unwrap() else {
    panic!("expected the patch to be applied");
  };

  assert_eq!(updated.status, "Active");
  assert_eq!(updated.title, "Bootstrap");
  assert_eq!(updated.description, "Set things up");
}

#[tokio::test]
async fn update_can_close_a_phase() {
  let s = store().await;
  phase(&s, "1", "Bootstrap").await;

  let patch = PhasePatch {
    status: Some("Complete".into()),
    ended_at: Some(chrono::Utc::now()),
    ..Default::default()
  };
  s.update_phase("1", patch).await.unwrap();

  let fetched = s.get_phase("1").await.unwrap().unwrap();
  assert!(fetched.ended_at.is_some());
}

#[tokio::test]
async fn update_missing_phase_is_not_found() {
  let s = store().await;
  let patch = PhasePatch { title: Some("Ghost".into()), ..Default::default() };
  let err = s.update_phase("404", patch).await.unwrap_err();
  assert!(matches!(err, Error::PhaseNotFound(_)));
  assert_eq!(ledger_core::Error::from(err).kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn empty_update_is_a_no_op() {
  let s = store().await;
  phase(&s, "1", "Bootstrap").await;

  let outcome = s.update_phase("1", PhasePatch::default()).await.unwrap();
  assert!(matches!(outcome, PhaseUpdate::NoChanges));
}

#[tokio::test]
async fn phase_orders() {
  let s = store().await;
  phase(&s, "b", "Second").await;
  phase(&s, "a", "First").await;

  let by_table: Vec<_> = s.list_phases().await.unwrap().into_iter().map(|p| p.id).collect();
  assert_eq!(by_table, ["b", "a"]);

  let by_id: Vec<_> = s
    .list_phases_by_id()
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.id)
    .collect();
  assert_eq!(by_id, ["a", "b"]);
}

#[tokio::test]
async fn numeric_ids_sort_as_numbers() {
  let s = store().await;
  for id in ["10", "beta", "2", "1", "alpha"] {
    phase(&s, id, "Phase").await;
  }

  let by_id: Vec<_> = s
    .list_phases_by_id()
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.id)
    .collect();
  assert_eq!(by_id, ["1", "2", "10", "alpha", "beta"]);
}

#[tokio::test]
async fn conclusion_is_patched_and_read_back() {
  let s = store().await;
  phase(&s, "1", "Bootstrap").await;
  assert!(s.get_phase("1").await.unwrap().unwrap().conclusion.is_none());

  let patch = PhasePatch { conclusion: Some("Done and dusted".into()), ..Default::default() };
  let PhaseUpdate::Applied(updated) = s.update_phase("1", patch).await.unwrap() else {
    panic!("patch with a conclusion was treated as empty");
  };
  assert_eq!(updated.conclusion.as_deref(), Some("Done and dusted"));
  assert_eq!(updated.title, "Bootstrap");
}

#[tokio::test]
async fn metrics_replace_by_key_and_keep_first_order() {
  let s = store().await;
  let metric = |key: &str, value: &str| PhaseMetric {
    phase_id: "1".into(),
    key:      key.into(),
    value:    value.into(),
  };
  s.set_phase_metric(metric("tests", "10")).await.unwrap();
  s.set_phase_metric(metric("coverage", "70%")).await.unwrap();
  s.set_phase_metric(metric("tests", "12")).await.unwrap();

  let metrics = s.list_phase_metrics("1").await.unwrap();
  let pairs: Vec<_> = metrics.iter().map(|m| (m.key.as_str(), m.value.as_str())).collect();
  assert_eq!(pairs, [("tests", "12"), ("coverage", "70%")]);
  assert!(s.list_phase_metrics("2").await.unwrap().is_empty());
}

// ─── Phase-scoped appends ────────────────────────────────────────────────────

#[tokio::test]
async fn items_route_to_their_kind() {
  let s = store().await;
  phase(&s, "1", "Bootstrap").await;

  s.append_phase_item(item("1", PhaseItemKind::Objective, "Ship it")).await.unwrap();
  s.append_phase_item(item("1", PhaseItemKind::Finding, "It shipped")).await.unwrap();
  s.append_phase_item(item("1", PhaseItemKind::Finding, "Nobody noticed")).await.unwrap();

  let objectives = s.list_phase_items("1", PhaseItemKind::Objective).await.unwrap();
  let findings = s.list_phase_items("1", PhaseItemKind::Finding).await.unwrap();
  let next = s.list_phase_items("1", PhaseItemKind::NextStep).await.unwrap();

  assert_eq!(objectives.len(), 1);
  assert_eq!(findings.iter().map(|f| f.text.as_str()).collect::<Vec<_>>(), [
    "It shipped",
    "Nobody noticed"
  ]);
  assert!(findings.iter().all(|f| f.kind == PhaseItemKind::Finding));
  assert!(next.is_empty());
}

#[tokio::test]
async fn orphaned_items_are_accepted() {
  let s = store().await;
  let stored = s
    .append_phase_item(item("ghost", PhaseItemKind::NextStep, "Haunt"))
    .await
    .unwrap();
  assert_eq!(stored.phase_id, "ghost");
}

#[tokio::test]
async fn log_entry_keeps_artifact_order() {
  let s = store().await;
  phase(&s, "1", "Bootstrap").await;

  s.log_work(NewLogEntry {
    phase_id:  "1".into(),
    action:    "Generated docs".into(),
    outcome:   "Done".into(),
    artifacts: vec!["z.md".into(), "a.md".into(), "m.md".into()],
  })
  .await
  .unwrap();
  s.log_work(NewLogEntry {
    phase_id:  "1".into(),
    action:    "Thought about it".into(),
    outcome:   "Nothing produced".into(),
    artifacts: vec![],
  })
  .await
  .unwrap();

  let entries = s.list_log_entries("1").await.unwrap();
  assert_eq!(entries.len(), 2);
  assert_eq!(entries[0].artifacts, ["z.md", "a.md", "m.md"]);
  assert!(entries[1].artifacts.is_empty());
  assert_eq!(entries[1].action, "Thought about it");
}

#[tokio::test]
async fn plan_steps_keep_insertion_order() {
  let s = store().await;
  for step in ["first", "second", "third"] {
    s.add_plan_step("1".into(), step.into()).await.unwrap();
  }

  let steps: Vec<_> = s
    .list_plan_steps("1")
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.step)
    .collect();
  assert_eq!(steps, ["first", "second", "third"]);
}

#[tokio::test]
async fn usage_example_description_is_optional() {
  let s = store().await;
  s.add_usage_example(NewUsageExample {
    phase_id:    "1".into(),
    title:       "Run".into(),
    code:        "cargo run".into(),
    description: None,
  })
  .await
  .unwrap();

  let examples = s.list_usage_examples("1").await.unwrap();
  assert_eq!(examples.len(), 1);
  assert!(examples[0].description.is_none());
}

#[tokio::test]
async fn lessons_join_phase_title() {
  let s = store().await;
  phase(&s, "1", "Bootstrap").await;

  s.record_lesson("1".into(), "Measure first".into()).await.unwrap();
  s.record_lesson("orphan".into(), "Nobody owns this".into()).await.unwrap();

  let lessons = s.list_lessons().await.unwrap();
  assert_eq!(lessons.len(), 2);
  assert_eq!(lessons[0].phase_title.as_deref(), Some("Bootstrap"));
  assert_eq!(lessons[1].phase_title, None);
  assert!(lessons[0].lesson.recorded_at <= lessons[1].lesson.recorded_at);
}

// ─── Registries ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn inventory_defaults() {
  let s = store().await;
  let stored = s.upsert_inventory(inventory("run.sh", "Runs", None)).await.unwrap();
  assert_eq!(stored.category, "Uncategorized");
  assert_eq!(stored.status, "Active");
  assert!(stored.usage.is_none());
}

#[tokio::test]
async fn inventory_upsert_keeps_unsupplied_fields() {
  let s = store().await;
  s.upsert_inventory(InventoryUpsert {
    usage: Some("./run.sh".into()),
    ..inventory("run.sh", "d1", Some("Scripts"))
  })
  .await
  .unwrap();

  let stored = s.upsert_inventory(inventory("run.sh", "d2", None)).await.unwrap();
  assert_eq!(stored.description, "d2");
  assert_eq!(stored.category, "Scripts");
  assert_eq!(stored.usage.as_deref(), Some("./run.sh"));

  let all = s.list_inventory().await.unwrap();
  assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn inventory_sorted_by_category_then_path() {
  let s = store().await;
  s.upsert_inventory(inventory("b.sh", "b", Some("Tools"))).await.unwrap();
  s.upsert_inventory(inventory("z.sh", "z", Some("Build"))).await.unwrap();
  s.upsert_inventory(inventory("a.sh", "a", Some("Tools"))).await.unwrap();

  let paths: Vec<_> = s
    .list_inventory()
    .await
    .unwrap()
    .into_iter()
    .map(|i| i.path)
    .collect();
  assert_eq!(paths, ["z.sh", "a.sh", "b.sh"]);
}

#[tokio::test]
async fn overview_fact_last_write_wins() {
  let s = store().await;
  assert!(s.get_overview_fact(OverviewKey::Mission).await.unwrap().is_none());

  s.set_overview_fact(OverviewKey::Mission, "v1".into()).await.unwrap();
  s.set_overview_fact(OverviewKey::Mission, "v2".into()).await.unwrap();

  assert_eq!(s.get_overview_fact(OverviewKey::Mission).await.unwrap().as_deref(), Some("v2"));
  assert!(s.get_overview_fact(OverviewKey::Architecture).await.unwrap().is_none());
}

#[tokio::test]
async fn only_global_faqs_are_listed() {
  let s = store().await;
  s.add_faq(NewFaq { question: "Why?".into(), answer: "Because".into(), phase_id: None })
    .await
    .unwrap();
  s.add_faq(NewFaq {
    question: "Which phase?".into(),
    answer:   "This one".into(),
    phase_id: Some("1".into()),
  })
  .await
  .unwrap();

  let global = s.list_global_faqs().await.unwrap();
  assert_eq!(global.len(), 1);
  assert_eq!(global[0].question, "Why?");
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn keyword_search_finds_every_searchable_kind() {
  let s = store().await;
  s.init_phase(
    NewPhase::new("1", "Parser rewrite")
      .unwrap()
      .with_description(Some("Replace the old parser".into())),
  )
  .await
  .unwrap();
  s.log_work(NewLogEntry {
    phase_id:  "1".into(),
    action:    "Benchmarked parser".into(),
    outcome:   "2x faster".into(),
    artifacts: vec![],
  })
  .await
  .unwrap();
  s.append_phase_item(item("1", PhaseItemKind::Objective, "Parser handles unicode"))
    .await
    .unwrap();
  s.append_phase_item(item("1", PhaseItemKind::Finding, "Parser allocates per token"))
    .await
    .unwrap();
  s.append_phase_item(item("1", PhaseItemKind::NextStep, "Pool parser buffers"))
    .await
    .unwrap();
  s.record_lesson("1".into(), "Parser combinators are slow".into()).await.unwrap();
  s.add_plan_step("1".into(), "Profile the PARSER".into()).await.unwrap();

  let hits = lines(&s, &SearchQuery::keyword("parser")).await;
  assert_eq!(hits, [
    "[PHASE 1] Parser rewrite: Replace the old parser",
    "[LOG 1] Benchmarked parser: 2x faster",
    "[OBJECTIVE 1] Parser handles unicode",
    "[FINDING 1] Parser allocates per token",
    "[NEXT_STEP 1] Pool parser buffers",
    "[LESSON 1] Parser combinators are slow",
    "[PLAN 1] Profile the PARSER",
  ]);
}

#[tokio::test]
async fn usage_examples_are_not_searchable() {
  let s = store().await;
  s.add_usage_example(NewUsageExample {
    phase_id:    "1".into(),
    title:       "Zebra".into(),
    code:        "zebra --run".into(),
    description: Some("zebra".into()),
  })
  .await
  .unwrap();

  assert!(lines(&s, &SearchQuery::keyword("zebra")).await.is_empty());
}

#[tokio::test]
async fn regex_search_matches_digits() {
  let s = store().await;
  s.record_lesson("1".into(), "The code is 12345".into()).await.unwrap();

  let hits = lines(&s, &SearchQuery::regex(r"\d+")).await;
  assert_eq!(hits.len(), 1);
  assert!(hits[0].contains("12345"));
}

#[tokio::test]
async fn invalid_regex_returns_nothing() {
  let s = store().await;
  s.record_lesson("1".into(), "[unbalanced".into()).await.unwrap();

  assert!(lines(&s, &SearchQuery::regex("[unbalanced")).await.is_empty());
}

#[tokio::test]
async fn scope_limits_categories() {
  let s = store().await;
  s.record_lesson("1".into(), "shared word".into()).await.unwrap();
  s.add_plan_step("1".into(), "shared word".into()).await.unwrap();

  let query = SearchQuery::keyword("shared").with_scope(Scope::parse(["plans"]));
  assert_eq!(lines(&s, &query).await, ["[PLAN 1] shared word"]);

  let bogus = SearchQuery::keyword("shared").with_scope(Scope::parse(["usage_examples"]));
  assert!(lines(&s, &bogus).await.is_empty());
}

#[tokio::test]
async fn global_entities_have_no_context() {
  let s = store().await;
  s.upsert_inventory(inventory("tools/sync.sh", "Syncs mirrors", None)).await.unwrap();
  s.add_faq(NewFaq { question: "How to sync?".into(), answer: "Run it".into(), phase_id: None })
    .await
    .unwrap();
  s.add_faq(NewFaq {
    question: "Sync in phase 2?".into(),
    answer:   "Yes".into(),
    phase_id: Some("2".into()),
  })
  .await
  .unwrap();

  let hits = s.search(&SearchQuery::keyword("sync")).await.unwrap();
  assert_eq!(hits.iter().map(|h| h.category).collect::<Vec<_>>(), [
    Category::Inventory,
    Category::Faq,
    Category::Faq
  ]);
  assert_eq!(hits[0].to_string(), "[INVENTORY] tools/sync.sh: Syncs mirrors");
  assert_eq!(hits[1].to_string(), "[FAQ] How to sync?: Run it");
  assert_eq!(hits[2].to_string(), "[FAQ 2] Sync in phase 2?: Yes");
}

#[tokio::test]
async fn inventory_matches_on_usage() {
  let s = store().await;
  s.upsert_inventory(InventoryUpsert {
    usage: Some("make deploy".into()),
    ..inventory("deploy.sh", "Ships it", None)
  })
  .await
  .unwrap();

  assert_eq!(lines(&s, &SearchQuery::keyword("make")).await, [
    "[INVENTORY] deploy.sh: Ships it"
  ]);
}
