//! [`SqliteStore`]: the SQLite implementation of [`LedgerStore`].

use std::{cmp::Ordering, collections::HashMap, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use ledger_core::{
  journal::{
    Lesson, LessonEntry, LogEntry, NewLogEntry, NewUsageExample, PlanStep, UsageExample,
  },
  phase::{
    NewPhase, NewPhaseItem, Phase, PhaseItem, PhaseItemKind, PhaseMetric, PhasePatch, PhaseUpdate,
  },
  registry::{
    DEFAULT_CATEGORY, DEFAULT_INVENTORY_STATUS, Faq, InventoryItem, InventoryUpsert, NewFaq,
    OverviewKey,
  },
  search::{SearchHit, SearchQuery},
  store::LedgerStore,
};

use crate::{
  Error, Result,
  encode::{
    PHASE_COLUMNS, RawLesson, RawLogEntry, RawPhase, RawPlanStep, encode_dt, item_table,
  },
  schema::SCHEMA,
  search,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A project ledger backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and ensure the schema exists.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.ensure_schema().await?;
    tracing::info!(path = %path.display(), "opened ledger store");
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.ensure_schema().await?;
    Ok(store)
  }

  /// Create every table that does not exist yet. Safe to call repeatedly.
  pub async fn ensure_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Close the underlying connection. Other clones of this store stop
  /// working once it is closed.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn query_phases(&self, order_by: &'static str) -> Result<Vec<Phase>> {
    let raws: Vec<RawPhase> = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {PHASE_COLUMNS} FROM phases ORDER BY {order_by}"))?;
        let rows = stmt
          .query_map([], RawPhase::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPhase::into_phase).collect()
  }
}

/// All-digit ids first, by numeric value, then every other id as text.
fn id_order(a: &str, b: &str) -> Ordering {
  fn numeric(id: &str) -> Option<u128> {
    id.bytes().all(|c| c.is_ascii_digit()).then(|| id.parse().ok()).flatten()
  }
  match (numeric(a), numeric(b)) {
    (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => a.cmp(b),
  }
}

// ─── LedgerStore impl ────────────────────────────────────────────────────────

impl LedgerStore for SqliteStore {
  type Error = Error;

  // ── Phases ────────────────────────────────────────────────────────────────

  async fn init_phase(&self, input: NewPhase) -> Result<Phase> {
    let phase = Phase {
      id:          input.id,
      title:       input.title,
      status:      input.status,
      description: input.description,
      started_at:  Utc::now(),
      ended_at:    None,
      conclusion:  None,
    };

    let id          = phase.id.clone();
    let title       = phase.title.clone();
    let status      = phase.status.clone();
    let description = phase.description.clone();
    let at_str      = encode_dt(phase.started_at);

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let res = conn.execute(
          "INSERT INTO phases (id, title, status, description, started_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id, title, status, description, at_str],
        );
        match res {
          Ok(_) => Ok(true),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            Ok(false)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::PhaseExists(phase.id));
    }
    Ok(phase)
  }

  async fn update_phase(&self, id: &str, patch: PhasePatch) -> Result<PhaseUpdate> {
    if patch.is_empty() {
      return Ok(PhaseUpdate::NoChanges);
    }

    let mut sets: Vec<&'static str> = vec![];
    let mut values: Vec<String> = vec![];
    if let Some(title) = patch.title {
      sets.push("title = ?");
      values.push(title);
    }
    if let Some(status) = patch.status {
      sets.push("status = ?");
      values.push(status);
    }
    if let Some(description) = patch.description {
      sets.push("description = ?");
      values.push(description);
    }
    if let Some(ended_at) = patch.ended_at {
      sets.push("ended_at = ?");
      values.push(encode_dt(ended_at));
    }
    if let Some(conclusion) = patch.conclusion {
      sets.push("conclusion = ?");
      values.push(conclusion);
    }

    let sql = format!("UPDATE phases SET {} WHERE id = ?", sets.join(", "));
    let id_str = id.to_owned();
    values.push(id_str.clone());

    let raw: Option<RawPhase> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(&sql, rusqlite::params_from_iter(values.iter()))?;
        if changed == 0 {
          return Ok(None);
        }
        let raw = conn.query_row(
          &format!("SELECT {PHASE_COLUMNS} FROM phases WHERE id = ?1"),
          rusqlite::params![id_str],
          RawPhase::from_row,
        )?;
        Ok(Some(raw))
      })
      .await?;

    match raw {
      Some(raw) => Ok(PhaseUpdate::Applied(raw.into_phase()?)),
      None => Err(Error::PhaseNotFound(id.to_owned())),
    }
  }

  async fn get_phase(&self, id: &str) -> Result<Option<Phase>> {
    let id_str = id.to_owned();

    let raw: Option<RawPhase> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PHASE_COLUMNS} FROM phases WHERE id = ?1"),
              rusqlite::params![id_str],
              RawPhase::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPhase::into_phase).transpose()
  }

  async fn list_phases(&self) -> Result<Vec<Phase>> { self.query_phases("rowid").await }

  async fn list_phases_by_id(&self) -> Result<Vec<Phase>> {
    let mut phases = self.query_phases("id").await?;
    phases.sort_by(|a, b| id_order(&a.id, &b.id));
    Ok(phases)
  }

  async fn set_phase_metric(&self, metric: PhaseMetric) -> Result<PhaseMetric> {
    let phase_id = metric.phase_id.clone();
    let key      = metric.key.clone();
    let value    = metric.value.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO phase_metrics (phase_id, key, value) VALUES (?1, ?2, ?3)
           ON CONFLICT(phase_id, key) DO UPDATE SET value = excluded.value",
          rusqlite::params![phase_id, key, value],
        )?;
        Ok(())
      })
      .await?;

    Ok(metric)
  }

  async fn list_phase_metrics(&self, phase_id: &str) -> Result<Vec<PhaseMetric>> {
    let id_str = phase_id.to_owned();

    let metrics = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT phase_id, key, value FROM phase_metrics WHERE phase_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(PhaseMetric { phase_id: row.get(0)?, key: row.get(1)?, value: row.get(2)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(metrics)
  }

  // ── Phase-scoped appends ──────────────────────────────────────────────────

  async fn append_phase_item(&self, input: NewPhaseItem) -> Result<PhaseItem> {
    let table    = item_table(input.kind);
    let phase_id = input.phase_id.clone();
    let text     = input.text.clone();

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO {table} (phase_id, text) VALUES (?1, ?2)"),
          rusqlite::params![phase_id, text],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(PhaseItem { id, phase_id: input.phase_id, kind: input.kind, text: input.text })
  }

  async fn list_phase_items(&self, phase_id: &str, kind: PhaseItemKind) -> Result<Vec<PhaseItem>> {
    let table  = item_table(kind);
    let id_str = phase_id.to_owned();

    let items = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT id, phase_id, text FROM {table} WHERE phase_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(PhaseItem {
              id: row.get(0)?,
              phase_id: row.get(1)?,
              kind,
              text: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(items)
  }

  async fn log_work(&self, input: NewLogEntry) -> Result<LogEntry> {
    let mut entry = LogEntry {
      id:          0,
      phase_id:    input.phase_id,
      recorded_at: Utc::now(),
      action:      input.action,
      outcome:     input.outcome,
      artifacts:   input.artifacts,
    };

    let phase_id  = entry.phase_id.clone();
    let at_str    = encode_dt(entry.recorded_at);
    let action    = entry.action.clone();
    let outcome   = entry.outcome.clone();
    let artifacts = entry.artifacts.clone();

    entry.id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO execution_logs (phase_id, recorded_at, action, outcome)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![phase_id, at_str, action, outcome],
        )?;
        let entry_id = tx.last_insert_rowid();
        {
          let mut stmt = tx.prepare(
            "INSERT INTO log_artifacts (entry_id, position, artifact) VALUES (?1, ?2, ?3)",
          )?;
          for (position, artifact) in artifacts.iter().enumerate() {
            stmt.execute(rusqlite::params![entry_id, position as i64, artifact])?;
          }
        }
        tx.commit()?;
        Ok(entry_id)
      })
      .await?;

    Ok(entry)
  }

  async fn list_log_entries(&self, phase_id: &str) -> Result<Vec<LogEntry>> {
    let id_str = phase_id.to_owned();

    let raws: Vec<RawLogEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, phase_id, recorded_at, action, outcome
           FROM execution_logs
           WHERE phase_id = ?1
           ORDER BY recorded_at, id",
        )?;
        let mut entries = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawLogEntry {
              id:          row.get(0)?,
              phase_id:    row.get(1)?,
              recorded_at: row.get(2)?,
              action:      row.get(3)?,
              outcome:     row.get(4)?,
              artifacts:   Vec::new(),
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT a.entry_id, a.artifact
           FROM log_artifacts a
           JOIN execution_logs e ON e.id = a.entry_id
           WHERE e.phase_id = ?1
           ORDER BY a.entry_id, a.position",
        )?;
        let mut by_entry: HashMap<i64, Vec<String>> = HashMap::new();
        let rows = stmt.query_map(rusqlite::params![id_str], |row| {
          Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
          let (entry_id, artifact) = row?;
          by_entry.entry(entry_id).or_default().push(artifact);
        }

        for entry in &mut entries {
          if let Some(artifacts) = by_entry.remove(&entry.id) {
            entry.artifacts = artifacts;
          }
        }
        Ok(entries)
      })
      .await?;

    raws.into_iter().map(RawLogEntry::into_entry).collect()
  }

  async fn add_usage_example(&self, input: NewUsageExample) -> Result<UsageExample> {
    let phase_id    = input.phase_id.clone();
    let title       = input.title.clone();
    let code        = input.code.clone();
    let description = input.description.clone();

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO usage_examples (phase_id, title, code, description)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![phase_id, title, code, description],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(UsageExample {
      id,
      phase_id:    input.phase_id,
      title:       input.title,
      code:        input.code,
      description: input.description,
    })
  }

  async fn list_usage_examples(&self, phase_id: &str) -> Result<Vec<UsageExample>> {
    let id_str = phase_id.to_owned();

    let examples = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, phase_id, title, code, description
           FROM usage_examples WHERE phase_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(UsageExample {
              id:          row.get(0)?,
              phase_id:    row.get(1)?,
              title:       row.get(2)?,
              code:        row.get(3)?,
              description: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(examples)
  }

  async fn add_plan_step(&self, phase_id: String, step: String) -> Result<PlanStep> {
    let mut plan_step = PlanStep { id: 0, phase_id, step, recorded_at: Utc::now() };

    let phase_id = plan_step.phase_id.clone();
    let step     = plan_step.step.clone();
    let at_str   = encode_dt(plan_step.recorded_at);

    plan_step.id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO plans (phase_id, step, recorded_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![phase_id, step, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(plan_step)
  }

  async fn list_plan_steps(&self, phase_id: &str) -> Result<Vec<PlanStep>> {
    let id_str = phase_id.to_owned();

    let raws: Vec<RawPlanStep> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, phase_id, step, recorded_at
           FROM plans WHERE phase_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawPlanStep {
              id:          row.get(0)?,
              phase_id:    row.get(1)?,
              step:        row.get(2)?,
              recorded_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPlanStep::into_step).collect()
  }

  async fn record_lesson(&self, phase_id: String, text: String) -> Result<Lesson> {
    let mut lesson = Lesson { id: 0, phase_id, text, recorded_at: Utc::now() };

    let phase_id = lesson.phase_id.clone();
    let text     = lesson.text.clone();
    let at_str   = encode_dt(lesson.recorded_at);

    lesson.id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO lessons (phase_id, text, recorded_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![phase_id, text, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(lesson)
  }

  async fn list_lessons(&self) -> Result<Vec<LessonEntry>> {
    let raws: Vec<RawLesson> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT l.id, l.phase_id, l.text, l.recorded_at, p.title
           FROM lessons l
           LEFT JOIN phases p ON p.id = l.phase_id
           ORDER BY l.recorded_at, l.id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawLesson {
              id:          row.get(0)?,
              phase_id:    row.get(1)?,
              text:        row.get(2)?,
              recorded_at: row.get(3)?,
              phase_title: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLesson::into_entry).collect()
  }

  // ── Registries ────────────────────────────────────────────────────────────

  async fn upsert_inventory(&self, input: InventoryUpsert) -> Result<InventoryItem> {
    let item = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO inventory (path, description, category, status, usage)
           VALUES (?1, ?2, COALESCE(?3, ?6), COALESCE(?4, ?7), ?5)
           ON CONFLICT(path) DO UPDATE SET
             description = excluded.description,
             category    = COALESCE(?3, inventory.category),
             status      = COALESCE(?4, inventory.status),
             usage       = COALESCE(?5, inventory.usage)",
          rusqlite::params![
            input.path,
            input.description,
            input.category,
            input.status,
            input.usage,
            DEFAULT_CATEGORY,
            DEFAULT_INVENTORY_STATUS,
          ],
        )?;
        let item = conn.query_row(
          "SELECT path, description, category, status, usage FROM inventory WHERE path = ?1",
          rusqlite::params![input.path],
          |row| {
            Ok(InventoryItem {
              path:        row.get(0)?,
              description: row.get(1)?,
              category:    row.get(2)?,
              status:      row.get(3)?,
              usage:       row.get(4)?,
            })
          },
        )?;
        Ok(item)
      })
      .await?;

    Ok(item)
  }

  async fn list_inventory(&self) -> Result<Vec<InventoryItem>> {
    let items = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT path, description, category, status, usage
           FROM inventory ORDER BY category, path",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(InventoryItem {
              path:        row.get(0)?,
              description: row.get(1)?,
              category:    row.get(2)?,
              status:      row.get(3)?,
              usage:       row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(items)
  }

  async fn set_overview_fact(&self, key: OverviewKey, value: String) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO overview (key, value) VALUES (?1, ?2)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value",
          rusqlite::params![key.as_str(), value],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_overview_fact(&self, key: OverviewKey) -> Result<Option<String>> {
    let value = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM overview WHERE key = ?1",
              rusqlite::params![key.as_str()],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(value)
  }

  async fn add_faq(&self, input: NewFaq) -> Result<Faq> {
    let question = input.question.clone();
    let answer   = input.answer.clone();
    let phase_id = input.phase_id.clone();

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO faqs (question, answer, phase_id) VALUES (?1, ?2, ?3)",
          rusqlite::params![question, answer, phase_id],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Faq { id, question: input.question, answer: input.answer, phase_id: input.phase_id })
  }

  async fn list_global_faqs(&self) -> Result<Vec<Faq>> {
    let faqs = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, question, answer, phase_id
           FROM faqs WHERE phase_id IS NULL ORDER BY id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Faq {
              id:       row.get(0)?,
              question: row.get(1)?,
              answer:   row.get(2)?,
              phase_id: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(faqs)
  }

  // ── Search ────────────────────────────────────────────────────────────────

  async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
    let matcher    = query.matcher();
    let categories: Vec<_> = query.scope.categories().collect();

    tracing::debug!(
      text = %query.text,
      mode = ?query.mode,
      categories = categories.len(),
      "searching ledger"
    );

    let hits = self
      .conn
      .call(move |conn| {
        let mut hits = Vec::new();
        for category in categories {
          hits.extend(search::scan(conn, category, &matcher)?);
        }
        Ok(hits)
      })
      .await?;

    Ok(hits)
  }
}
