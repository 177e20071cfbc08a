//! [`Renderer`] reads ledger state through a [`LedgerStore`] and writes
//! Markdown documents under a documents root.
//!
//! Writing a document always overwrites whatever was at its path. Writes
//! are plain `tokio::fs::write` calls; there is no temp-file-and-rename.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use ledger_core::{
  Error as LedgerError,
  phase::PhaseItemKind,
  registry::OverviewKey,
  search::{SearchMode, SearchQuery},
  store::LedgerStore,
};

use crate::{
  DocPaths, ReportKind,
  error::{Error, Result},
  markdown::{self, PhaseReport},
};

pub struct Renderer<S> {
  store: Arc<S>,
  paths: DocPaths,
}

impl<S> Renderer<S>
where
  S: LedgerStore,
{
  pub fn new(store: Arc<S>, paths: DocPaths) -> Self { Self { store, paths } }

  /// Render `kind` and return the path of every document written.
  pub async fn render(&self, kind: &ReportKind) -> Result<Vec<PathBuf>> {
    match kind {
      ReportKind::Phase(id) => Ok(vec![self.render_phase(id).await?]),
      ReportKind::Inventory => Ok(vec![self.render_inventory().await?]),
      ReportKind::Lessons => Ok(vec![self.render_lessons().await?]),
      ReportKind::Overview => Ok(vec![self.render_overview().await?]),
      ReportKind::Search { query, mode } => Ok(vec![self.render_search(query, *mode).await?]),
      ReportKind::All => self.render_all().await,
    }
  }

  /// Render one phase. A missing phase is an error and writes nothing.
  pub async fn render_phase(&self, phase_id: &str) -> Result<PathBuf> {
    let store = &self.store;
    let phase = store
      .get_phase(phase_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| LedgerError::PhaseNotFound(phase_id.to_owned()))?;

    let report = PhaseReport {
      objectives: store
        .list_phase_items(phase_id, PhaseItemKind::Objective)
        .await
        .map_err(Error::store)?,
      plan:       store.list_plan_steps(phase_id).await.map_err(Error::store)?,
      log:        store.list_log_entries(phase_id).await.map_err(Error::store)?,
      metrics:    store.list_phase_metrics(phase_id).await.map_err(Error::store)?,
      findings:   store
        .list_phase_items(phase_id, PhaseItemKind::Finding)
        .await
        .map_err(Error::store)?,
      next_steps: store
        .list_phase_items(phase_id, PhaseItemKind::NextStep)
        .await
        .map_err(Error::store)?,
      examples:   store.list_usage_examples(phase_id).await.map_err(Error::store)?,
      phase,
    };

    let path = self.paths.phase(phase_id)?;
    self.write(&path, markdown::phase_report(&report)).await?;
    Ok(path)
  }

  pub async fn render_inventory(&self) -> Result<PathBuf> {
    let items = self.store.list_inventory().await.map_err(Error::store)?;
    let path = self.paths.inventory();
    self.write(&path, markdown::inventory_report(&items)).await?;
    Ok(path)
  }

  pub async fn render_lessons(&self) -> Result<PathBuf> {
    let lessons = self.store.list_lessons().await.map_err(Error::store)?;
    let path = self.paths.lessons();
    self.write(&path, markdown::lessons_report(&lessons)).await?;
    Ok(path)
  }

  pub async fn render_overview(&self) -> Result<PathBuf> {
    let store = &self.store;
    let mission = store
      .get_overview_fact(OverviewKey::Mission)
      .await
      .map_err(Error::store)?;
    let architecture = store
      .get_overview_fact(OverviewKey::Architecture)
      .await
      .map_err(Error::store)?;
    let phases = store.list_phases_by_id().await.map_err(Error::store)?;
    let faqs = store.list_global_faqs().await.map_err(Error::store)?;

    let path = self.paths.overview();
    let doc = markdown::overview_report(mission.as_deref(), architecture.as_deref(), &phases, &faqs);
    self.write(&path, doc).await?;
    Ok(path)
  }

  pub async fn render_search(&self, query: &str, mode: SearchMode) -> Result<PathBuf> {
    if query.is_empty() {
      return Err(LedgerError::validation("a search report requires a query").into());
    }

    let search = SearchQuery { text: query.to_owned(), mode, ..Default::default() };
    let lines: Vec<String> = self
      .store
      .search(&search)
      .await
      .map_err(Error::store)?
      .iter()
      .map(ToString::to_string)
      .collect();

    let path = self.paths.search(query);
    self.write(&path, markdown::search_report(query, mode, &lines)).await?;
    Ok(path)
  }

  /// Overview, inventory and lessons, then every phase in table order.
  pub async fn render_all(&self) -> Result<Vec<PathBuf>> {
    let mut written = vec![
      self.render_overview().await?,
      self.render_inventory().await?,
      self.render_lessons().await?,
    ];
    for phase in self.store.list_phases().await.map_err(Error::store)? {
      written.push(self.render_phase(&phase.id).await?);
    }
    Ok(written)
  }

  async fn write(&self, path: &Path, contents: String) -> Result<()> {
    let io_err = |source: std::io::Error| Error::Io { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    tokio::fs::write(path, contents).await.map_err(io_err)?;
    tracing::info!(path = %path.display(), "wrote report");
    Ok(())
  }
}
