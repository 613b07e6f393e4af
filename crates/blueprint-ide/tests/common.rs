#![allow(dead_code)]

use std::fmt::Write as _;
use std::sync::Arc;

use blueprint_ide::{CompletionEngine, CompletionResult, EntityRecord, Position, Schema};

pub fn engine() -> CompletionEngine {
    CompletionEngine::new(Arc::new(Schema::builtin().expect("built-in schema")))
}

pub fn entities() -> Vec<EntityRecord> {
    vec![
        EntityRecord::new("light.kitchen").with_display_name("Kitchen"),
        EntityRecord::new("light.living_room").with_display_name("Living Room"),
        EntityRecord::new("switch.fan").with_icon("mdi:fan"),
    ]
}

/// Completes at the end of the last line of `document`.
pub fn complete_at_end(engine: &CompletionEngine, document: &[&str]) -> CompletionResult {
    let line = document.len() - 1;
    let column = document[line].len();
    engine.complete(document, Position::new(line as u32, column as u32), &entities())
}

pub fn dump(result: &CompletionResult) -> String {
    let mut out = String::new();
    let from = result.replace.from;
    let to = result.replace.to;
    let _ = writeln!(
        out,
        "replace {}:{}..{}:{}",
        from.line, from.column, to.line, to.column
    );
    for item in &result.items {
        let _ = writeln!(out, "{} {:?}", item.kind.as_str(), item.insert_text.as_str());
    }
    out
}

pub fn labels(result: &CompletionResult) -> String {
    result
        .items
        .iter()
        .map(|item| item.insert_text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
