//! Report kinds and where each one is written.

use std::path::{Component, Path, PathBuf};

use ledger_core::{Error, Result, search::SearchMode};

/// What to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportKind {
  Phase(String),
  Inventory,
  Lessons,
  Overview,
  Search { query: String, mode: SearchMode },
  /// Overview, inventory, lessons, then one phase report per phase.
  All,
}

impl ReportKind {
  /// Build a kind from its name and the companion fields some kinds need.
  ///
  /// `phase` needs `phase_id` and `search` needs a non-empty `query`;
  /// anything else is a validation error.
  pub fn parse(
    kind: &str,
    phase_id: Option<String>,
    query: Option<String>,
    mode: SearchMode,
  ) -> Result<Self> {
    match kind.trim().to_ascii_lowercase().as_str() {
      "phase" => phase_id
        .filter(|id| !id.trim().is_empty())
        .map(Self::Phase)
        .ok_or_else(|| Error::validation("a phase report requires a phase id")),
      "inventory" => Ok(Self::Inventory),
      "lessons" => Ok(Self::Lessons),
      "overview" => Ok(Self::Overview),
      "search" => query
        .filter(|q| !q.is_empty())
        .map(|query| Self::Search { query, mode })
        .ok_or_else(|| Error::validation("a search report requires a query")),
      "all" => Ok(Self::All),
      other => Err(Error::validation(format!(
        "unknown report kind {other:?}; expected phase, inventory, lessons, overview, search or all"
      ))),
    }
  }
}

/// Replace every non-alphanumeric character with `_`.
///
/// Distinct queries that differ only in punctuation map to the same name,
/// so their reports overwrite each other.
pub fn sanitize(query: &str) -> String {
  query
    .chars()
    .map(|c| if c.is_alphanumeric() { c } else { '_' })
    .collect()
}

/// Fixed document locations under a documents root.
#[derive(Debug, Clone)]
pub struct DocPaths {
  root: PathBuf,
}

impl DocPaths {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  /// The phase report path. An id that would place the file anywhere but
  /// directly inside `phases/` is rejected.
  pub fn phase(&self, phase_id: &str) -> Result<PathBuf> {
    let file = format!("Phase_{phase_id}_Report.md");
    let mut parts = Path::new(&file).components();
    match (parts.next(), parts.next()) {
      (Some(Component::Normal(_)), None) if !phase_id.contains("..") => {
        Ok(self.root.join("phases").join(file))
      }
      _ => Err(Error::validation(format!(
        "phase id {phase_id:?} cannot be used as a report file name"
      ))),
    }
  }

  pub fn inventory(&self) -> PathBuf { self.docs().join("Inventory.md") }

  pub fn lessons(&self) -> PathBuf { self.docs().join("Lessons_Learned.md") }

  pub fn overview(&self) -> PathBuf { self.docs().join("Overview.md") }

  pub fn search(&self, query: &str) -> PathBuf {
    self.docs().join(format!("Search_Results_{}.md", sanitize(query)))
  }

  fn docs(&self) -> PathBuf { self.root.join("docs") }
}

#[cfg(test)]
mod tests {
  use ledger_core::ErrorKind;

  use super::*;

  #[test]
  fn sanitize_replaces_punctuation() {
    assert_eq!(sanitize("a/b c.d"), "a_b_c_d");
    assert_eq!(sanitize("a/b"), sanitize("a_b"));
  }

  #[test]
  fn fixed_paths() {
    let paths = DocPaths::new("/docs-root");
    assert_eq!(paths.phase("3").unwrap(), Path::new("/docs-root/phases/Phase_3_Report.md"));
    assert_eq!(paths.inventory(), Path::new("/docs-root/docs/Inventory.md"));
    assert_eq!(paths.lessons(), Path::new("/docs-root/docs/Lessons_Learned.md"));
    assert_eq!(paths.overview(), Path::new("/docs-root/docs/Overview.md"));
    assert_eq!(
      paths.search("x?y"),
      Path::new("/docs-root/docs/Search_Results_x_y.md")
    );
  }

  #[test]
  fn phase_path_stays_in_phases_dir() {
    let paths = DocPaths::new("/docs-root");
    for id in ["x/../../../escaped", "../up", "a/b"] {
      let err = paths.phase(id).unwrap_err();
      assert_eq!(err.kind(), ErrorKind::Validation, "{id} was accepted");
    }
  }

  #[test]
  fn phase_kind_needs_an_id() {
    let err = ReportKind::parse("phase", None, None, SearchMode::Keyword).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let kind = ReportKind::parse("phase", Some("2".into()), None, SearchMode::Keyword).unwrap();
    assert_eq!(kind, ReportKind::Phase("2".into()));
  }

  #[test]
  fn search_kind_needs_a_query() {
    let err = ReportKind::parse("search", None, None, SearchMode::Regex).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
  }

  #[test]
  fn unknown_kind_is_rejected() {
    assert!(ReportKind::parse("metrics", None, None, SearchMode::Keyword).is_err());
  }
}
