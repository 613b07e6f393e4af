//! Candidate selection at the cursor.
//!
//! A fixed list of rules is tried in order and the first match wins:
//! entity ids, escape tags, snippet triggers, top-level domains and finally
//! the section-specific pools. Everything except entity ids and snippets is
//! ordered by [`rank`](crate::ranking::rank).

use std::sync::Arc;

use smol_str::SmolStr;
use tracing::{debug, trace};

use blueprint_syntax::lexer::indentation;

use crate::context::{infer_context, Section, YamlContext};
use crate::ranking::{rank, rank_by, MAX_RESULTS};
use crate::registry::EntityRecord;
use crate::schema::{Pool, PoolEntry, Schema};
use crate::snippet::Snippet;

/// The kind of completion item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    /// A top-level integration key.
    Domain,
    /// A mapping key.
    Key,
    /// A scalar value.
    Value,
    /// A trigger platform.
    Trigger,
    /// A condition type.
    Condition,
    /// A service call.
    Service,
    /// A YAML escape tag.
    Tag,
    /// A sensor platform.
    Platform,
    /// An entity id.
    Entity,
    /// A multi-line snippet.
    Snippet,
}

impl CompletionKind {
    /// Stable lowercase name, used by the host for styling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CompletionKind::Domain => "domain",
            CompletionKind::Key => "key",
            CompletionKind::Value => "value",
            CompletionKind::Trigger => "trigger",
            CompletionKind::Condition => "condition",
            CompletionKind::Service => "service",
            CompletionKind::Tag => "tag",
            CompletionKind::Platform => "platform",
            CompletionKind::Entity => "entity",
            CompletionKind::Snippet => "snippet",
        }
    }
}

/// Line and byte column in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Zero-based line.
    pub line: u32,
    /// Byte offset within the line.
    pub column: u32,
}

impl Position {
    /// Creates a position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Text replaced when a candidate is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceRange {
    /// Start of the replaced text.
    pub from: Position,
    /// End of the replaced text, the cursor.
    pub to: Position,
}

/// A completion item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    /// Text to insert.
    pub insert_text: SmolStr,
    /// Text shown in the list.
    pub display_text: SmolStr,
    /// The kind of completion.
    pub kind: CompletionKind,
    /// Optional description.
    pub description: Option<SmolStr>,
    /// Additional detail (friendly name, snippet prefix).
    pub detail: Option<SmolStr>,
    /// Icon hint.
    pub icon: Option<SmolStr>,
    /// Range replaced on insertion.
    pub range: ReplaceRange,
}

impl CompletionItem {
    /// Creates a new completion item displayed as its insert text.
    pub fn new(text: impl Into<SmolStr>, kind: CompletionKind) -> Self {
        let insert_text = text.into();
        Self {
            display_text: insert_text.clone(),
            insert_text,
            kind,
            description: None,
            detail: None,
            icon: None,
            range: ReplaceRange::default(),
        }
    }

    /// Sets the display text.
    #[must_use]
    pub fn with_display_text(mut self, text: impl Into<SmolStr>) -> Self {
        self.display_text = text.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<SmolStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the detail text.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<SmolStr>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Sets the icon hint.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<SmolStr>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Candidates for one request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionResult {
    /// Ordered candidates, at most [`MAX_RESULTS`].
    pub items: Vec<CompletionItem>,
    /// Range every candidate replaces.
    pub replace: ReplaceRange,
}

impl CompletionResult {
    fn new(mut items: Vec<CompletionItem>, replace: ReplaceRange) -> Self {
        for item in &mut items {
            item.range = replace;
        }
        Self { items, replace }
    }

    fn empty(at: Position) -> Self {
        Self {
            items: Vec::new(),
            replace: ReplaceRange { from: at, to: at },
        }
    }
}

/// Completion over a fixed schema.
#[derive(Debug, Clone)]
pub struct CompletionEngine {
    schema: Arc<Schema>,
}

impl CompletionEngine {
    /// Creates an engine over `schema`.
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }

    /// The schema candidates are drawn from.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Computes candidates at `cursor`, see [`complete`].
    pub fn complete<S: AsRef<str>>(
        &self,
        document: &[S],
        cursor: Position,
        entities: &[EntityRecord],
    ) -> CompletionResult {
        complete(&self.schema, document, cursor, entities)
    }
}

/// Computes completion candidates at `cursor`.
///
/// `document` holds the lines of the document without terminators. A cursor
/// past the last line yields no candidates; a column past the end of the line
/// is clamped.
pub fn complete<S: AsRef<str>>(
    schema: &Schema,
    document: &[S],
    cursor: Position,
    entities: &[EntityRecord],
) -> CompletionResult {
    let Some(line) = document.get(cursor.line as usize) else {
        return CompletionResult::empty(cursor);
    };
    let line: &str = line.as_ref();
    let column = clamp_column(line, cursor.column as usize);
    let before = &line[..column];
    let cursor = Position::new(cursor.line, to_u32(column));
    let range = |len: usize| ReplaceRange {
        from: Position::new(cursor.line, to_u32(column - len)),
        to: cursor,
    };

    if let Some(prefix) = entity_prefix(before) {
        let items = entity_items(entities, prefix);
        debug!(rule = "entity", prefix, count = items.len(), "completion");
        return CompletionResult::new(items, range(prefix.len()));
    }

    let word = partial_word(before);
    if word.starts_with('!') {
        // Tag names are matched without the leading `!`.
        let pool = schema.pool(Pool::EscapeTags).iter().map(PoolEntry::to_item).collect();
        let items = rank_by(pool, &word[1..], |item| item.insert_text.trim_start_matches('!'));
        debug!(rule = "tag", word, count = items.len(), "completion");
        return CompletionResult::new(items, range(word.len()));
    }

    if let Some(name) = snippet_name(before, word, schema.snippet_sentinel()) {
        let indent = &line[..indentation(line) as usize];
        let needle = name.to_lowercase();
        let items: Vec<_> = schema
            .snippets()
            .iter()
            .filter(|snippet| snippet.prefix.to_lowercase().starts_with(&needle))
            .take(MAX_RESULTS)
            .map(|snippet| snippet_item(snippet, indent))
            .collect();
        debug!(rule = "snippet", name, count = items.len(), "completion");
        return CompletionResult::new(items, range(word.len()));
    }

    let context = infer_context(document, cursor.line as usize);
    trace!(?context, "inferred context");
    let at_line_start = before.trim() == word;
    let pools: &[Pool] = if at_line_start && context.indent == 0 {
        &[Pool::Domains]
    } else {
        section_pools(&context, before, word)
    };
    let candidates: Vec<_> = pools
        .iter()
        .flat_map(|pool| schema.pool(*pool))
        .map(|entry| entry.to_item())
        .collect();
    let pool_size = candidates.len();
    let items = rank(candidates, word);
    debug!(
        rule = "pool",
        ?pools,
        pool_size,
        word,
        count = items.len(),
        "completion"
    );
    CompletionResult::new(items, range(word.len()))
}

fn section_pools(context: &YamlContext, before: &str, word: &str) -> &'static [Pool] {
    match context.section {
        Section::Automation => {
            if is_mode_value(before, word) {
                &[Pool::AutomationModes]
            } else if context.in_trigger {
                &[Pool::Triggers]
            } else if context.in_condition {
                &[Pool::Conditions]
            } else if context.in_action {
                &[Pool::Services, Pool::ActionKeys]
            } else {
                &[Pool::AutomationKeys]
            }
        }
        Section::Sensor | Section::BinarySensor => {
            if context.in_platform {
                &[Pool::SensorPlatforms]
            } else {
                &[Pool::CommonKeys]
            }
        }
        Section::Script | Section::None => &[Pool::CommonKeys, Pool::Domains],
    }
}

/// True when the cursor sits in the value of a `mode:` key.
fn is_mode_value(before: &str, word: &str) -> bool {
    let head = before[..before.len() - word.len()].trim();
    let head = head.strip_prefix('-').map_or(head, str::trim_start);
    head == "mode:"
}

fn entity_items(entities: &[EntityRecord], prefix: &str) -> Vec<CompletionItem> {
    let mut matches: Vec<&EntityRecord> = entities
        .iter()
        .filter(|record| record.id.starts_with(prefix))
        .collect();
    matches.sort_by(|left, right| left.id.cmp(&right.id));
    matches
        .into_iter()
        .take(MAX_RESULTS)
        .map(|record| {
            let mut item = CompletionItem::new(record.id.clone(), CompletionKind::Entity);
            if let Some(name) = &record.display_name {
                item = item.with_detail(name.clone());
            }
            if let Some(icon) = &record.icon {
                item = item.with_icon(icon.clone());
            }
            item
        })
        .collect()
}

fn snippet_item(snippet: &Snippet, indent: &str) -> CompletionItem {
    let item = CompletionItem::new(snippet.expand(indent), CompletionKind::Snippet)
        .with_display_text(snippet.label.clone())
        .with_detail(snippet.prefix.clone());
    match &snippet.description {
        Some(description) => item.with_description(description.clone()),
        None => item,
    }
}

/// Entity id being typed at the end of `before`, e.g. `light.k`.
fn entity_prefix(before: &str) -> Option<&str> {
    let bytes = before.as_bytes();
    let mut dot = bytes.len();
    while dot > 0 && is_entity_byte(bytes[dot - 1]) {
        dot -= 1;
    }
    if dot == 0 || bytes[dot - 1] != b'.' {
        return None;
    }
    let dot = dot - 1;
    let mut start = dot;
    while start > 0 && is_entity_byte(bytes[start - 1]) {
        start -= 1;
    }
    if start == dot {
        return None;
    }
    if start > 0 {
        let previous = bytes[start - 1];
        if previous.is_ascii_alphanumeric() || previous == b'_' || previous == b'.' {
            return None;
        }
    }
    Some(&before[start..])
}

fn is_entity_byte(byte: u8) -> bool {
    byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_'
}

/// Maximal run before the cursor that is not whitespace or YAML punctuation.
fn partial_word(before: &str) -> &str {
    let start = before
        .char_indices()
        .rev()
        .find(|&(_, ch)| ch.is_whitespace() || matches!(ch, '"' | '\'' | '[' | ']' | '{' | '}' | ','))
        .map_or(0, |(index, ch)| index + ch.len_utf8());
    &before[start..]
}

/// Snippet name typed after `<sentinel>:`, when `word` is a snippet trigger.
fn snippet_name<'a>(before: &str, word: &'a str, sentinel: &str) -> Option<&'a str> {
    let name = word.strip_prefix(sentinel)?.strip_prefix(':')?;
    let start = before.len() - word.len();
    let standalone = before[..start]
        .chars()
        .next_back()
        .map_or(true, char::is_whitespace);
    let valid = name
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    (standalone && valid).then_some(name)
}

fn clamp_column(line: &str, column: usize) -> usize {
    let mut column = column.min(line.len());
    while !line.is_char_boundary(column) {
        column -= 1;
    }
    column
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
