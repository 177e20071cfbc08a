//! Per-category row scans for [`LedgerStore::search`](ledger_core::store::LedgerStore::search).
//!
//! Each category reads its rows in natural row order, tests its text
//! columns with the [`Matcher`] and turns matching rows into hits. There is
//! no ranking and no deduplication.

use ledger_core::{
  phase::PhaseItemKind,
  search::{Category, Matcher, SearchHit},
};

use crate::encode::item_table;

/// Scan one category and return its hits in row order.
pub fn scan(
  conn: &rusqlite::Connection,
  category: Category,
  matcher: &Matcher,
) -> rusqlite::Result<Vec<SearchHit>> {
  match category {
    Category::Phase => collect(
      conn,
      "SELECT id, title, description FROM phases ORDER BY rowid",
      |row| {
        let id: String = row.get(0)?;
        let title: String = row.get(1)?;
        let description: String = row.get(2)?;
        let matched = matcher.any([Some(title.as_str()), Some(description.as_str())]);
        Ok(matched.then(|| hit(category, Some(id), title, non_empty(description))))
      },
    ),
    Category::ExecutionLog => collect(
      conn,
      "SELECT phase_id, action, outcome FROM execution_logs ORDER BY id",
      |row| {
        let phase_id: String = row.get(0)?;
        let action: String = row.get(1)?;
        let outcome: String = row.get(2)?;
        let matched = matcher.any([Some(action.as_str()), Some(outcome.as_str())]);
        Ok(matched.then(|| hit(category, Some(phase_id), action, Some(outcome))))
      },
    ),
    Category::Objective => scan_items(conn, category, PhaseItemKind::Objective, matcher),
    Category::Finding => scan_items(conn, category, PhaseItemKind::Finding, matcher),
    Category::NextStep => scan_items(conn, category, PhaseItemKind::NextStep, matcher),
    Category::Lesson => scan_text(conn, category, "lessons", "text", matcher),
    Category::Inventory => collect(
      conn,
      "SELECT path, description, usage FROM inventory ORDER BY rowid",
      |row| {
        let path: String = row.get(0)?;
        let description: String = row.get(1)?;
        let usage: Option<String> = row.get(2)?;
        let matched = matcher.any([Some(path.as_str()), Some(description.as_str()), usage.as_deref()]);
        Ok(matched.then(|| hit(category, None, path, Some(description))))
      },
    ),
    Category::Plan => scan_text(conn, category, "plans", "step", matcher),
    Category::Faq => collect(
      conn,
      "SELECT phase_id, question, answer FROM faqs ORDER BY id",
      |row| {
        let phase_id: Option<String> = row.get(0)?;
        let question: String = row.get(1)?;
        let answer: String = row.get(2)?;
        let matched = matcher.any([Some(question.as_str()), Some(answer.as_str())]);
        Ok(matched.then(|| hit(category, phase_id, question, Some(answer))))
      },
    ),
  }
}

fn scan_items(
  conn: &rusqlite::Connection,
  category: Category,
  kind: PhaseItemKind,
  matcher: &Matcher,
) -> rusqlite::Result<Vec<SearchHit>> {
  scan_text(conn, category, item_table(kind), "text", matcher)
}

/// Scan a phase-scoped table with a single searchable column.
fn scan_text(
  conn: &rusqlite::Connection,
  category: Category,
  table: &'static str,
  column: &'static str,
  matcher: &Matcher,
) -> rusqlite::Result<Vec<SearchHit>> {
  collect(
    conn,
    &format!("SELECT phase_id, {column} FROM {table} ORDER BY id"),
    |row| {
      let phase_id: String = row.get(0)?;
      let text: String = row.get(1)?;
      let matched = matcher.is_match(&text);
      Ok(matched.then(|| hit(category, Some(phase_id), text, None)))
    },
  )
}

fn collect<F>(conn: &rusqlite::Connection, sql: &str, mut f: F) -> rusqlite::Result<Vec<SearchHit>>
where
  F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<Option<SearchHit>>,
{
  let mut stmt = conn.prepare(sql)?;
  let mut rows = stmt.query([])?;
  let mut hits = Vec::new();
  while let Some(row) = rows.next()? {
    if let Some(h) = f(row)? {
      hits.push(h);
    }
  }
  Ok(hits)
}

fn hit(
  category: Category,
  context: Option<String>,
  primary: String,
  secondary: Option<String>,
) -> SearchHit {
  SearchHit { category, context, primary, secondary }
}

fn non_empty(s: String) -> Option<String> { (!s.is_empty()).then_some(s) }
