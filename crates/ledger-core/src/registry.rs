//! Project-wide registries: the script/tool inventory, the overview facts and
//! the FAQ.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_CATEGORY: &str = "Uncategorized";
pub const DEFAULT_INVENTORY_STATUS: &str = "Active";

// ─── Inventory ───────────────────────────────────────────────────────────────

/// A registered script or tool, keyed by its path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
  pub path:        String,
  pub description: String,
  pub category:    String,
  pub status:      String,
  pub usage:       Option<String>,
}

/// Input for registering an inventory path.
///
/// Re-registering a path always replaces the description. The optional
/// fields replace the stored value only when they are `Some`; new rows fall
/// back to [`DEFAULT_CATEGORY`] and [`DEFAULT_INVENTORY_STATUS`].
#[derive(Debug, Clone, Default)]
pub struct InventoryUpsert {
  pub path:        String,
  pub description: String,
  pub category:    Option<String>,
  pub status:      Option<String>,
  pub usage:       Option<String>,
}

// ─── Overview ────────────────────────────────────────────────────────────────

/// The fixed set of singleton overview facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverviewKey {
  Mission,
  Architecture,
}

impl OverviewKey {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Mission => "mission",
      Self::Architecture => "architecture",
    }
  }
}

impl fmt::Display for OverviewKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OverviewKey {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "mission" => Ok(Self::Mission),
      "architecture" => Ok(Self::Architecture),
      other => Err(Error::validation(format!("unknown overview key {other:?}"))),
    }
  }
}

// ─── FAQ ─────────────────────────────────────────────────────────────────────

/// A question and its answer. `phase_id == None` marks a global entry, which
/// is the only kind the overview document lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
  pub id:       i64,
  pub question: String,
  pub answer:   String,
  pub phase_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewFaq {
  pub question: String,
  pub answer:   String,
  pub phase_id: Option<String>,
}
