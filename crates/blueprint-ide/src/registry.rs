//! Entity registry snapshots.
//!
//! The host refreshes the registry from Home Assistant whenever it likes.
//! Each completion request works on the snapshot it captured, so a refresh
//! never changes a request in flight.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::Deserialize;
use smol_str::SmolStr;
use tracing::{debug, warn};

/// A known Home Assistant entity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "EntityPayload")]
pub struct EntityRecord {
    /// Entity id, `domain.object`.
    pub id: SmolStr,
    /// Friendly name.
    pub display_name: Option<SmolStr>,
    /// Icon, e.g. `mdi:lightbulb`.
    pub icon: Option<SmolStr>,
}

impl EntityRecord {
    /// Creates a record with only an id.
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            icon: None,
        }
    }

    /// Sets the friendly name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Sets the icon.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<SmolStr>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

// Shape of one entry of the Home Assistant entity listing. Unknown fields
// such as `state` are ignored.
#[derive(Debug, Deserialize)]
struct EntityPayload {
    #[serde(alias = "entity_id")]
    id: String,
    #[serde(default, alias = "friendly_name")]
    display_name: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

impl From<EntityPayload> for EntityRecord {
    fn from(payload: EntityPayload) -> Self {
        Self {
            id: payload.id.into(),
            display_name: payload.display_name.map(SmolStr::from),
            icon: payload.icon.map(SmolStr::from),
        }
    }
}

/// Returns true when `id` has the form `domain.object` with both halves made
/// of `[a-z0-9_]`.
#[must_use]
pub fn is_entity_id(id: &str) -> bool {
    let Some((domain, object)) = id.split_once('.') else {
        return false;
    };
    let valid = |part: &str| {
        !part.is_empty()
            && part
                .bytes()
                .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_')
    };
    valid(domain) && valid(object)
}

/// Shared, replaceable set of entity records.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    records: Arc<[EntityRecord]>,
}

impl EntityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry from `records`, see [`EntityRegistry::replace`].
    pub fn from_records(records: impl IntoIterator<Item = EntityRecord>) -> Self {
        let mut registry = Self::new();
        registry.replace(records);
        registry
    }

    /// Swaps in a new record set and returns how many records were kept.
    ///
    /// Malformed ids are dropped. Of duplicate ids the first one wins.
    pub fn replace(&mut self, records: impl IntoIterator<Item = EntityRecord>) -> usize {
        let mut seen = FxHashSet::default();
        let mut kept = Vec::new();
        let mut dropped = 0usize;
        for record in records {
            if !is_entity_id(&record.id) {
                warn!(id = %record.id, "dropping malformed entity id");
                dropped += 1;
                continue;
            }
            if seen.insert(record.id.clone()) {
                kept.push(record);
            }
        }
        debug!(kept = kept.len(), dropped, "entity registry replaced");
        let count = kept.len();
        self.records = kept.into();
        count
    }

    /// Cheap handle on the current records.
    #[must_use]
    pub fn snapshot(&self) -> Arc<[EntityRecord]> {
        Arc::clone(&self.records)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
