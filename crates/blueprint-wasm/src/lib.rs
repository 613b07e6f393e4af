//! Browser/WASM adapter for the Blueprint editor core.
//!
//! The host editor talks JSON. Columns on the wire are UTF-16 code units,
//! the convention of browser text APIs; the core works in byte offsets.

#![forbid(unsafe_code)]
#![allow(missing_docs)]

use std::sync::Arc;

use blueprint_ide::{
    CompletionEngine, CompletionResult, EntityRecord, EntityRegistry, Schema, SchemaError,
};
use blueprint_syntax::{classify, LexState};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
use wasm_bindgen::prelude::wasm_bindgen;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid {context} json: {source}")]
    InvalidJson {
        context: &'static str,
        source: serde_json::Error,
    },
    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),
    #[error("position {line}:{character} is outside the document")]
    OutOfRange { line: u32, character: u32 },
}

type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpanItem {
    pub start: u32,
    pub end: u32,
    pub category: String,
    pub marker: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifyResult {
    pub spans: Vec<SpanItem>,
    pub state: LexState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionRequest {
    pub text: String,
    pub position: Position,
    pub sequence: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionItem {
    pub insert_text: String,
    pub display_text: String,
    pub kind: String,
    pub class_name: String,
    pub description: Option<String>,
    pub detail: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionResponse {
    pub items: Vec<CompletionItem>,
    pub replace: Range,
    pub sequence: Option<u64>,
    pub stale: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntitiesResult {
    pub accepted: usize,
    pub dropped: usize,
}

/// Entity list as posted by the host: either a bare array or the
/// `{"entities": [...]}` body of the entities endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EntitiesPayload {
    List(Vec<EntityRecord>),
    Wrapped { entities: Vec<EntityRecord> },
}

impl EntitiesPayload {
    fn into_records(self) -> Vec<EntityRecord> {
        match self {
            Self::List(records) | Self::Wrapped { entities: records } => records,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaStatus {
    pub snippet_count: usize,
    pub snippet_sentinel: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineStatus {
    pub entity_count: usize,
    pub snippet_count: usize,
    pub snippet_sentinel: String,
    pub last_sequence: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct BrowserEditorEngine {
    completion: CompletionEngine,
    registry: EntityRegistry,
    last_sequence: Option<u64>,
}

impl BrowserEditorEngine {
    /// Creates an engine over the built-in Home Assistant schema.
    pub fn new() -> EngineResult<Self> {
        Ok(Self::with_schema(Schema::builtin()?))
    }

    pub fn with_schema(schema: Schema) -> Self {
        Self {
            completion: CompletionEngine::new(Arc::new(schema)),
            registry: EntityRegistry::new(),
            last_sequence: None,
        }
    }

    pub fn classify_line(&self, line: &str, state: &LexState) -> ClassifyResult {
        let (spans, state) = classify(line, state);
        let spans = spans
            .into_iter()
            .map(|span| SpanItem {
                start: column_to_character(line, u32::from(span.range.start()) as usize),
                end: column_to_character(line, u32::from(span.range.end()) as usize),
                category: span.category.as_str().to_string(),
                marker: span.marker.map(|marker| marker.as_str().to_string()),
            })
            .collect();
        ClassifyResult { spans, state }
    }

    pub fn completion(&mut self, request: CompletionRequest) -> EngineResult<CompletionResponse> {
        let lines: Vec<&str> = request
            .text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        let Some(line) = lines.get(request.position.line as usize) else {
            return Err(EngineError::OutOfRange {
                line: request.position.line,
                character: request.position.character,
            });
        };

        if let Some(sequence) = request.sequence {
            if self.last_sequence.is_some_and(|last| sequence < last) {
                debug!(sequence, last = ?self.last_sequence, "dropping superseded completion request");
                let at = request.position;
                return Ok(CompletionResponse {
                    items: Vec::new(),
                    replace: Range { start: at, end: at },
                    sequence: Some(sequence),
                    stale: true,
                });
            }
            self.last_sequence = Some(sequence);
        }

        let column = position_to_column(line, request.position.character);
        let cursor = blueprint_ide::Position::new(request.position.line, to_u32(column));
        let entities = self.registry.snapshot();
        let result = self.completion.complete(&lines, cursor, &entities);
        Ok(completion_response(&lines, result, request.sequence))
    }

    pub fn set_entities(&mut self, records: Vec<EntityRecord>) -> EntitiesResult {
        let total = records.len();
        let accepted = self.registry.replace(records);
        EntitiesResult {
            accepted,
            dropped: total - accepted,
        }
    }

    pub fn load_schema(&mut self, text: &str) -> EngineResult<SchemaStatus> {
        let schema = Schema::from_toml(text)?;
        self.completion = CompletionEngine::new(Arc::new(schema));
        Ok(self.schema_status())
    }

    pub fn status(&self) -> EngineStatus {
        let schema = self.schema_status();
        EngineStatus {
            entity_count: self.registry.len(),
            snippet_count: schema.snippet_count,
            snippet_sentinel: schema.snippet_sentinel,
            last_sequence: self.last_sequence,
        }
    }

    fn schema_status(&self) -> SchemaStatus {
        let schema = self.completion.schema();
        SchemaStatus {
            snippet_count: schema.snippets().len(),
            snippet_sentinel: schema.snippet_sentinel().to_string(),
        }
    }
}

#[cfg_attr(all(target_arch = "wasm32", feature = "wasm"), wasm_bindgen)]
pub struct WasmEditorEngine {
    inner: BrowserEditorEngine,
}

#[cfg_attr(all(target_arch = "wasm32", feature = "wasm"), wasm_bindgen)]
impl WasmEditorEngine {
    #[cfg_attr(
        all(target_arch = "wasm32", feature = "wasm"),
        wasm_bindgen(constructor)
    )]
    pub fn new() -> Result<WasmEditorEngine, String> {
        Ok(Self {
            inner: BrowserEditorEngine::new()?,
        })
    }

    #[cfg_attr(
        all(target_arch = "wasm32", feature = "wasm"),
        wasm_bindgen(js_name = classifyLineJson)
    )]
    pub fn classify_line_json(&self, line: &str, state_json: &str) -> Result<String, String> {
        let state = if state_json.trim().is_empty() {
            LexState::default()
        } else {
            parse_json::<Option<LexState>>("lexer state", state_json)?.unwrap_or_default()
        };
        json_string(&self.inner.classify_line(line, &state))
    }

    #[cfg_attr(
        all(target_arch = "wasm32", feature = "wasm"),
        wasm_bindgen(js_name = completionJson)
    )]
    pub fn completion_json(&mut self, request_json: &str) -> Result<String, String> {
        let request: CompletionRequest = parse_json("completion request", request_json)?;
        let result = self.inner.completion(request)?;
        json_string(&result)
    }

    #[cfg_attr(
        all(target_arch = "wasm32", feature = "wasm"),
        wasm_bindgen(js_name = setEntitiesJson)
    )]
    pub fn set_entities_json(&mut self, entities_json: &str) -> Result<String, String> {
        let payload: EntitiesPayload = parse_json("entities", entities_json)?;
        json_string(&self.inner.set_entities(payload.into_records()))
    }

    #[cfg_attr(
        all(target_arch = "wasm32", feature = "wasm"),
        wasm_bindgen(js_name = loadSchemaToml)
    )]
    pub fn load_schema_toml(&mut self, text: &str) -> Result<String, String> {
        let result = self.inner.load_schema(text)?;
        json_string(&result)
    }

    #[cfg_attr(
        all(target_arch = "wasm32", feature = "wasm"),
        wasm_bindgen(js_name = statusJson)
    )]
    pub fn status_json(&self) -> Result<String, String> {
        json_string(&self.inner.status())
    }
}

impl From<EngineError> for String {
    fn from(value: EngineError) -> Self {
        value.to_string()
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(
    context: &'static str,
    text: &str,
) -> EngineResult<T> {
    serde_json::from_str(text).map_err(|source| EngineError::InvalidJson { context, source })
}

fn json_string<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|err| format!("json serialization failed: {err}"))
}

fn completion_response(
    lines: &[&str],
    result: CompletionResult,
    sequence: Option<u64>,
) -> CompletionResponse {
    let wire = |position: blueprint_ide::Position| {
        let line = lines.get(position.line as usize).copied().unwrap_or_default();
        Position {
            line: position.line,
            character: column_to_character(line, position.column as usize),
        }
    };
    let items = result
        .items
        .into_iter()
        .map(|item| CompletionItem {
            insert_text: item.insert_text.to_string(),
            display_text: item.display_text.to_string(),
            kind: item.kind.as_str().to_string(),
            class_name: format!("ha-hint-{}", item.kind.as_str()),
            description: item.description.map(|value| value.to_string()),
            detail: item.detail.map(|value| value.to_string()),
            icon: item.icon.map(|value| value.to_string()),
        })
        .collect();
    CompletionResponse {
        items,
        replace: Range {
            start: wire(result.replace.from),
            end: wire(result.replace.to),
        },
        sequence,
        stale: false,
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// UTF-16 width of `line[..column]`.
fn column_to_character(line: &str, column: usize) -> u32 {
    let clamped = column.min(line.len());
    let mut character = 0u32;
    for (index, ch) in line.char_indices() {
        if index >= clamped {
            break;
        }
        character = character.saturating_add(ch.len_utf16() as u32);
    }
    character
}

/// Byte column of a UTF-16 `character` in `line`.
///
/// Positions inside a surrogate pair snap to the start of the character;
/// positions past the end clamp to the line length.
fn position_to_column(line: &str, character: u32) -> usize {
    let mut current = 0u32;
    for (index, ch) in line.char_indices() {
        if current == character {
            return index;
        }
        let width = ch.len_utf16() as u32;
        if current.saturating_add(width) > character {
            return index;
        }
        current = current.saturating_add(width);
    }
    line.len()
}
