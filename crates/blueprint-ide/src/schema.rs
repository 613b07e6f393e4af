//! Static candidate tables.
//!
//! Pools and snippets are declared in TOML and validated once at load. The
//! built-in table covers the Home Assistant core configuration surface.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use smol_str::SmolStr;
use thiserror::Error;
use tracing::debug;

use crate::completion::{CompletionItem, CompletionKind};
use crate::snippet::Snippet;

const BUILTIN: &str = include_str!("../schema/home_assistant.toml");

const DEFAULT_SENTINEL: &str = "snip";

/// Errors raised while loading a schema table.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The text is not valid TOML or does not match the table layout.
    #[error("invalid schema table: {0}")]
    Toml(#[from] toml::de::Error),
    /// A pool entry has no display text.
    #[error("{pool} entry {index} has no text")]
    EmptyText {
        /// Pool name.
        pool: &'static str,
        /// Position of the entry in its pool.
        index: usize,
    },
    /// A snippet has no prefix.
    #[error("snippet {index} has no prefix")]
    EmptySnippetPrefix {
        /// Position of the snippet.
        index: usize,
    },
    /// A snippet has no body.
    #[error("snippet '{0}' has an empty body")]
    EmptySnippetBody(SmolStr),
    /// Two snippets share a prefix.
    #[error("duplicate snippet prefix '{0}'")]
    DuplicateSnippet(SmolStr),
    /// The snippet sentinel is empty or not an identifier.
    #[error("invalid snippet sentinel '{0}'")]
    InvalidSentinel(SmolStr),
}

/// Named candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pool {
    /// Top-level integration keys.
    Domains,
    /// Keys of an automation entry.
    AutomationKeys,
    /// Values of the automation `mode:` key.
    AutomationModes,
    /// Trigger platforms.
    Triggers,
    /// Condition types.
    Conditions,
    /// Service calls.
    Services,
    /// Keys of an action step.
    ActionKeys,
    /// Keys shared by entity configurations.
    CommonKeys,
    /// YAML escape tags such as `!secret`.
    EscapeTags,
    /// Sensor platforms.
    SensorPlatforms,
}

impl Pool {
    /// Every pool, in table order.
    pub const ALL: [Pool; 10] = [
        Pool::Domains,
        Pool::AutomationKeys,
        Pool::AutomationModes,
        Pool::Triggers,
        Pool::Conditions,
        Pool::Services,
        Pool::ActionKeys,
        Pool::CommonKeys,
        Pool::EscapeTags,
        Pool::SensorPlatforms,
    ];

    /// Table name in the TOML file.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Pool::Domains => "domains",
            Pool::AutomationKeys => "automation_keys",
            Pool::AutomationModes => "automation_modes",
            Pool::Triggers => "triggers",
            Pool::Conditions => "conditions",
            Pool::Services => "services",
            Pool::ActionKeys => "action_keys",
            Pool::CommonKeys => "common_keys",
            Pool::EscapeTags => "escape_tags",
            Pool::SensorPlatforms => "sensor_platforms",
        }
    }

    /// Candidate kind of the pool's entries.
    #[must_use]
    pub fn kind(self) -> CompletionKind {
        match self {
            Pool::Domains => CompletionKind::Domain,
            Pool::AutomationKeys | Pool::ActionKeys | Pool::CommonKeys => CompletionKind::Key,
            Pool::AutomationModes => CompletionKind::Value,
            Pool::Triggers => CompletionKind::Trigger,
            Pool::Conditions => CompletionKind::Condition,
            Pool::Services => CompletionKind::Service,
            Pool::EscapeTags => CompletionKind::Tag,
            Pool::SensorPlatforms => CompletionKind::Platform,
        }
    }
}

/// A static candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolEntry {
    /// Text inserted into the document.
    pub text: SmolStr,
    /// Kind derived from the owning pool.
    pub kind: CompletionKind,
    /// Optional description.
    pub description: Option<SmolStr>,
}

impl PoolEntry {
    /// Converts the entry into a candidate.
    #[must_use]
    pub fn to_item(&self) -> CompletionItem {
        let item = CompletionItem::new(self.text.clone(), self.kind);
        match &self.description {
            Some(description) => item.with_description(description.clone()),
            None => item,
        }
    }
}

/// Validated candidate tables.
#[derive(Debug, Clone)]
pub struct Schema {
    pools: FxHashMap<Pool, Vec<PoolEntry>>,
    snippets: Vec<Snippet>,
    snippet_sentinel: SmolStr,
}

impl Schema {
    /// Loads the built-in Home Assistant tables.
    pub fn builtin() -> Result<Self, SchemaError> {
        Self::from_toml(BUILTIN)
    }

    /// Parses and validates a schema table.
    pub fn from_toml(text: &str) -> Result<Self, SchemaError> {
        let raw: SchemaToml = toml::from_str(text)?;
        let schema = raw.into_schema()?;
        debug!(
            entries = schema.pools.values().map(Vec::len).sum::<usize>(),
            snippets = schema.snippets.len(),
            sentinel = %schema.snippet_sentinel,
            "schema loaded"
        );
        Ok(schema)
    }

    /// Entries of a pool. Pools missing from the table are empty.
    #[must_use]
    pub fn pool(&self, pool: Pool) -> &[PoolEntry] {
        self.pools
            .get(&pool)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Snippet templates in table order.
    #[must_use]
    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    /// Word that introduces a snippet trigger.
    #[must_use]
    pub fn snippet_sentinel(&self) -> &str {
        &self.snippet_sentinel
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaToml {
    snippet_sentinel: Option<String>,
    #[serde(default)]
    domains: Vec<EntryToml>,
    #[serde(default)]
    automation_keys: Vec<EntryToml>,
    #[serde(default)]
    automation_modes: Vec<EntryToml>,
    #[serde(default)]
    triggers: Vec<EntryToml>,
    #[serde(default)]
    conditions: Vec<EntryToml>,
    #[serde(default)]
    services: Vec<EntryToml>,
    #[serde(default)]
    action_keys: Vec<EntryToml>,
    #[serde(default)]
    common_keys: Vec<EntryToml>,
    #[serde(default)]
    escape_tags: Vec<EntryToml>,
    #[serde(default)]
    sensor_platforms: Vec<EntryToml>,
    #[serde(default)]
    snippets: Vec<SnippetToml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntryToml {
    #[serde(default)]
    text: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnippetToml {
    #[serde(default)]
    prefix: String,
    label: Option<String>,
    #[serde(default)]
    body: String,
    description: Option<String>,
}

impl SchemaToml {
    fn into_schema(mut self) -> Result<Schema, SchemaError> {
        let sentinel = self
            .snippet_sentinel
            .take()
            .unwrap_or_else(|| DEFAULT_SENTINEL.to_string());
        if !is_identifier(&sentinel) {
            return Err(SchemaError::InvalidSentinel(sentinel.into()));
        }

        let mut pools = FxHashMap::default();
        for pool in Pool::ALL {
            let entries = std::mem::take(self.entries_mut(pool));
            pools.insert(pool, convert_entries(pool, entries)?);
        }

        let mut seen = FxHashSet::default();
        let mut snippets = Vec::with_capacity(self.snippets.len());
        for (index, raw) in self.snippets.into_iter().enumerate() {
            let prefix = raw.prefix.trim();
            if prefix.is_empty() {
                return Err(SchemaError::EmptySnippetPrefix { index });
            }
            let body = raw.body.trim_end_matches(['\n', '\r']);
            if body.trim().is_empty() {
                return Err(SchemaError::EmptySnippetBody(prefix.into()));
            }
            if !seen.insert(SmolStr::new(prefix)) {
                return Err(SchemaError::DuplicateSnippet(prefix.into()));
            }
            let mut snippet = Snippet::new(prefix, body);
            if let Some(label) = raw.label.filter(|label| !label.trim().is_empty()) {
                snippet = snippet.with_label(label);
            }
            if let Some(description) = raw.description {
                snippet = snippet.with_description(description);
            }
            snippets.push(snippet);
        }

        Ok(Schema {
            pools,
            snippets,
            snippet_sentinel: sentinel.into(),
        })
    }

    fn entries_mut(&mut self, pool: Pool) -> &mut Vec<EntryToml> {
        match pool {
            Pool::Domains => &mut self.domains,
            Pool::AutomationKeys => &mut self.automation_keys,
            Pool::AutomationModes => &mut self.automation_modes,
            Pool::Triggers => &mut self.triggers,
            Pool::Conditions => &mut self.conditions,
            Pool::Services => &mut self.services,
            Pool::ActionKeys => &mut self.action_keys,
            Pool::CommonKeys => &mut self.common_keys,
            Pool::EscapeTags => &mut self.escape_tags,
            Pool::SensorPlatforms => &mut self.sensor_platforms,
        }
    }
}

fn convert_entries(pool: Pool, entries: Vec<EntryToml>) -> Result<Vec<PoolEntry>, SchemaError> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            if entry.text.trim().is_empty() {
                return Err(SchemaError::EmptyText {
                    pool: pool.name(),
                    index,
                });
            }
            Ok(PoolEntry {
                text: entry.text.into(),
                kind: pool.kind(),
                description: entry.description.map(SmolStr::from),
            })
        })
        .collect()
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
