//! Search query types, the text matcher, and the shape of a search hit.
//!
//! The backend decides how rows are fetched; everything about *whether* a
//! row matches and how a match is printed lives here so every backend
//! behaves the same.

use std::{collections::BTreeSet, fmt, str::FromStr};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Mode ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
  /// Case-insensitive substring containment.
  #[default]
  Keyword,
  /// Case-insensitive regular expression.
  Regex,
}

impl FromStr for SearchMode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "keyword" => Ok(Self::Keyword),
      "regex" => Ok(Self::Regex),
      other => Err(Error::validation(format!(
        "unknown search mode {other:?}; expected keyword or regex"
      ))),
    }
  }
}

// ─── Categories ──────────────────────────────────────────────────────────────

/// Every searchable category, in result order. Usage examples are absent on
/// purpose: they are never searched.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Phase,
  ExecutionLog,
  Objective,
  Finding,
  NextStep,
  Lesson,
  Inventory,
  Plan,
  Faq,
}

impl Category {
  pub const ALL: [Self; 9] = [
    Self::Phase,
    Self::ExecutionLog,
    Self::Objective,
    Self::Finding,
    Self::NextStep,
    Self::Lesson,
    Self::Inventory,
    Self::Plan,
    Self::Faq,
  ];

  /// The scope name, which is also the backing table name.
  pub fn table(self) -> &'static str {
    match self {
      Self::Phase => "phases",
      Self::ExecutionLog => "execution_logs",
      Self::Objective => "objectives",
      Self::Finding => "findings",
      Self::NextStep => "next_steps",
      Self::Lesson => "lessons",
      Self::Inventory => "inventory",
      Self::Plan => "plans",
      Self::Faq => "faqs",
    }
  }

  /// Tag printed at the start of a match line.
  pub fn label(self) -> &'static str {
    match self {
      Self::Phase => "PHASE",
      Self::ExecutionLog => "LOG",
      Self::Objective => "OBJECTIVE",
      Self::Finding => "FINDING",
      Self::NextStep => "NEXT_STEP",
      Self::Lesson => "LESSON",
      Self::Inventory => "INVENTORY",
      Self::Plan => "PLAN",
      Self::Faq => "FAQ",
    }
  }

  /// Resolve a scope name. Accepts table names and their singular forms.
  pub fn from_name(name: &str) -> Option<Self> {
    let name = name.trim().to_ascii_lowercase();
    Self::ALL.into_iter().find(|c| {
      let table = c.table();
      name == table || table.strip_suffix('s') == Some(name.as_str())
    })
  }
}

// ─── Scope ───────────────────────────────────────────────────────────────────

/// Which categories a search considers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
  #[default]
  All,
  /// Only these categories. May be empty, in which case nothing matches.
  Only(BTreeSet<Category>),
}

impl Scope {
  /// Build a scope from caller-supplied names.
  ///
  /// No names means every category. Unknown names are dropped without an
  /// error, so a list made only of unknown names searches nothing.
  pub fn parse<I, S>(names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let names: Vec<S> = names.into_iter().collect();
    if names.is_empty() {
      return Self::All;
    }
    Self::Only(
      names
        .iter()
        .filter_map(|n| Category::from_name(n.as_ref()))
        .collect(),
    )
  }

  pub fn includes(&self, category: Category) -> bool {
    match self {
      Self::All => true,
      Self::Only(set) => set.contains(&category),
    }
  }

  /// The categories to search, always in result order.
  pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
    Category::ALL.into_iter().filter(|c| self.includes(*c))
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Parameters for [`LedgerStore::search`](crate::store::LedgerStore::search).
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
  pub text:  String,
  pub mode:  SearchMode,
  pub scope: Scope,
}

impl SearchQuery {
  pub fn keyword(text: impl Into<String>) -> Self {
    Self { text: text.into(), ..Default::default() }
  }

  pub fn regex(text: impl Into<String>) -> Self {
    Self { text: text.into(), mode: SearchMode::Regex, ..Default::default() }
  }

  pub fn with_scope(mut self, scope: Scope) -> Self {
    self.scope = scope;
    self
  }

  pub fn matcher(&self) -> Matcher { Matcher::new(&self.text, self.mode) }
}

// ─── Matcher ─────────────────────────────────────────────────────────────────

/// Tests column values against a query.
#[derive(Debug, Clone)]
pub enum Matcher {
  Keyword(String),
  Regex(Regex),
  /// The query was an invalid pattern; nothing matches.
  Never,
}

impl Matcher {
  pub fn new(query: &str, mode: SearchMode) -> Self {
    match mode {
      SearchMode::Keyword => Self::Keyword(query.to_lowercase()),
      SearchMode::Regex => {
        match RegexBuilder::new(query).case_insensitive(true).build() {
          Ok(re) => Self::Regex(re),
          Err(e) => {
            tracing::debug!(pattern = query, error = %e, "invalid search pattern");
            Self::Never
          }
        }
      }
    }
  }

  pub fn is_match(&self, value: &str) -> bool {
    match self {
      Self::Keyword(needle) => value.to_lowercase().contains(needle.as_str()),
      Self::Regex(re) => re.is_match(value),
      Self::Never => false,
    }
  }

  /// True if any of the (possibly absent) column values match.
  pub fn any<'a>(&self, values: impl IntoIterator<Item = Option<&'a str>>) -> bool {
    values.into_iter().flatten().any(|v| self.is_match(v))
  }
}

// ─── Hits ────────────────────────────────────────────────────────────────────

/// A single search match. Its [`Display`](fmt::Display) form is the match
/// line: `[LABEL context] primary: secondary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
  pub category:  Category,
  /// The owning phase id; `None` for global entities.
  pub context:   Option<String>,
  pub primary:   String,
  pub secondary: Option<String>,
}

impl fmt::Display for SearchHit {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.context {
      Some(ctx) => write!(f, "[{} {ctx}] ", self.category.label())?,
      None => write!(f, "[{}] ", self.category.label())?,
    }
    f.write_str(&self.primary)?;
    if let Some(secondary) = &self.secondary {
      write!(f, ": {secondary}")?;
    }
    Ok(())
  }
}
