//! Runtime settings: where the store file and the documents live.
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `LEDGER_*` environment variables. Command-line flags are
//! applied on top by the binary.

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_STORE_PATH: &str = "artifacts/ledger.db";
pub const DEFAULT_DOCS_ROOT: &str = "artifacts";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub store_path: PathBuf,
  pub docs_root:  PathBuf,
}

impl Settings {
  /// Load settings from `file` (which may be absent) and the environment.
  pub fn load(file: &Path) -> Result<Self, config::ConfigError> {
    let settings: Self = config::Config::builder()
      .set_default("store_path", DEFAULT_STORE_PATH)?
      .set_default("docs_root", DEFAULT_DOCS_ROOT)?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("LEDGER"))
      .build()?
      .try_deserialize()?;

    Ok(Self {
      store_path: expand_tilde(&settings.store_path),
      docs_root:  expand_tilde(&settings.docs_root),
    })
  }

  pub fn with_overrides(mut self, store: Option<PathBuf>, docs: Option<PathBuf>) -> Self {
    if let Some(store) = store {
      self.store_path = expand_tilde(&store);
    }
    if let Some(docs) = docs {
      self.docs_root = expand_tilde(&docs);
    }
    self
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
