//! `ledger` binary.
//!
//! Reads `ledger.toml` (or the path given with `--config`) and `LEDGER_*`
//! environment variables, opens the SQLite store once, runs a single
//! operation and prints its result.

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use ledger_cli::{
  OpResult, Settings,
  ops::{self, OverviewArgs, PhaseArgs, PhaseMode, RenderArgs},
};
use ledger_core::{journal::NewUsageExample, registry::InventoryUpsert};
use ledger_report::{DocPaths, Renderer};
use ledger_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Project ledger: phases, logs, lessons and reports")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "ledger.toml")]
  config: PathBuf,

  /// Store file, overriding the configuration.
  #[arg(long, global = true)]
  store: Option<PathBuf>,

  /// Documents root, overriding the configuration.
  #[arg(long, global = true)]
  docs: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create or update a phase.
  Phase {
    #[command(subcommand)]
    action: PhaseCommand,
  },
  /// Append an objective, finding or next step to a phase.
  Item {
    phase_id: String,
    /// objective, finding or next_step
    kind:     String,
    text:     String,
  },
  /// Set a named metric on a phase.
  Metric { phase_id: String, key: String, value: String },
  /// Record an action taken and its outcome.
  Log {
    phase_id: String,
    action:   String,
    outcome:  String,
    /// Files produced or touched; repeatable.
    #[arg(short, long = "artifact")]
    artifacts: Vec<String>,
  },
  /// Attach a usage example to a phase.
  Usage {
    phase_id:    String,
    title:       String,
    code:        String,
    #[arg(short, long)]
    description: Option<String>,
  },
  /// Append a step to a phase's plan.
  Plan { phase_id: String, step: String },
  /// Record a lesson learned.
  Lesson { phase_id: String, text: String },
  /// Register or update a script or tool.
  Inventory {
    path:        String,
    description: String,
    #[arg(long)]
    category:    Option<String>,
    #[arg(long)]
    status:      Option<String>,
    #[arg(long)]
    usage:       Option<String>,
  },
  /// Set the mission or architecture, and optionally add an FAQ.
  Overview {
    #[arg(long)]
    mission:      Option<String>,
    #[arg(long)]
    architecture: Option<String>,
    #[arg(long)]
    question:     Option<String>,
    #[arg(long)]
    answer:       Option<String>,
    /// Scope the FAQ to a phase instead of making it global.
    #[arg(long)]
    faq_phase:    Option<String>,
  },
  /// Search every category, or only the given ones.
  Search {
    query: String,
    /// Treat the query as a case-insensitive regular expression.
    #[arg(long)]
    regex: bool,
    /// Category to search; repeatable.
    #[arg(long)]
    scope: Vec<String>,
    /// Print hits as JSON.
    #[arg(long)]
    json:  bool,
  },
  /// Write Markdown documents under the documents root.
  Render {
    /// phase, inventory, lessons, overview, search or all
    kind:  String,
    #[arg(long)]
    phase: Option<String>,
    #[arg(long)]
    query: Option<String>,
    #[arg(long)]
    regex: bool,
  },
}

#[derive(Subcommand)]
enum PhaseCommand {
  Init {
    id:          String,
    #[arg(long)]
    title:       Option<String>,
    #[arg(long)]
    status:      Option<String>,
    #[arg(long)]
    description: Option<String>,
  },
  Update {
    id:          String,
    #[arg(long)]
    title:       Option<String>,
    #[arg(long)]
    status:      Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    conclusion:  Option<String>,
    /// Stamp the phase's end time.
    #[arg(long)]
    end:         bool,
  },
}

fn mode(regex: bool) -> &'static str { if regex { "regex" } else { "keyword" } }

async fn dispatch(store: &SqliteStore, renderer: &Renderer<SqliteStore>, command: Command) -> OpResult {
  match command {
    Command::Phase { action } => {
      let (mode, args) = match action {
        PhaseCommand::Init { id, title, status, description } => {
          let args = PhaseArgs { id, title, status, description, ..Default::default() };
          (PhaseMode::Init, args)
        }
        PhaseCommand::Update { id, title, status, description, conclusion, end } => {
          (PhaseMode::Update, PhaseArgs { id, title, status, description, conclusion, end })
        }
      };
      ops::init_or_update_phase(store, mode, args).await
    }
    Command::Item { phase_id, kind, text } => {
      ops::append_phase_item(store, phase_id, &kind, text).await
    }
    Command::Metric { phase_id, key, value } => {
      ops::set_phase_metric(store, phase_id, key, value).await
    }
    Command::Log { phase_id, action, outcome, artifacts } => {
      ops::log_work(store, phase_id, action, outcome, artifacts).await
    }
    Command::Usage { phase_id, title, code, description } => {
      ops::add_usage_example(store, NewUsageExample { phase_id, title, code, description }).await
    }
    Command::Plan { phase_id, step } => ops::manage_plan(store, phase_id, step).await,
    Command::Lesson { phase_id, text } => ops::record_lesson(store, phase_id, text).await,
    Command::Inventory { path, description, category, status, usage } => {
      let input = InventoryUpsert { path, description, category, status, usage };
      ops::register_inventory(store, input).await
    }
    Command::Overview { mission, architecture, question, answer, faq_phase } => {
      let args = OverviewArgs {
        mission,
        architecture,
        faq_question: question,
        faq_answer: answer,
        faq_phase,
      };
      ops::update_overview(store, args).await
    }
    Command::Search { query, regex, scope, json: true } => {
      ops::search_json(store, query, mode(regex), &scope).await
    }
    Command::Search { query, regex, scope, json: false } => {
      ops::search(store, query, mode(regex), &scope).await
    }
    Command::Render { kind, phase, query, regex } => {
      let args = RenderArgs {
        kind,
        phase_id: phase,
        query,
        mode: Some(mode(regex).to_owned()),
      };
      ops::render(renderer, args).await
    }
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  // Logs go to stderr; stdout carries only results.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let settings = Settings::load(&cli.config)
    .context("failed to read configuration")?
    .with_overrides(cli.store, cli.docs);

  if let Some(parent) = settings.store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("failed to create store directory {parent:?}"))?;
  }

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;

  let renderer = Renderer::new(Arc::new(store.clone()), DocPaths::new(&settings.docs_root));

  let outcome = dispatch(&store, &renderer, cli.command).await;
  drop(renderer);
  store.close().await.context("failed to close store")?;

  match outcome {
    Ok(text) => {
      println!("{text}");
      Ok(ExitCode::SUCCESS)
    }
    Err(e) => {
      tracing::warn!(kind = ?e.kind, "operation failed");
      println!("{e}");
      Ok(ExitCode::FAILURE)
    }
  }
}
