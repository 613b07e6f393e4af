#![no_main]

use std::sync::Arc;

use blueprint_ide::{CompletionEngine, EntityRecord, Position, Schema, MAX_RESULTS};
use libfuzzer_sys::fuzz_target;

const MAX_SOURCE_BYTES: usize = 4096;

fuzz_target!(|data: &[u8]| {
    let Ok(schema) = Schema::builtin() else {
        return;
    };
    let engine = CompletionEngine::new(Arc::new(schema));
    let entities = [
        EntityRecord::new("light.kitchen"),
        EntityRecord::new("sensor.outside_temperature"),
        EntityRecord::new("switch.fan"),
    ];

    let capped = &data[..data.len().min(MAX_SOURCE_BYTES)];
    let source = String::from_utf8_lossy(capped);
    let lines: Vec<&str> = source.split('\n').collect();
    let seed = data.first().copied().unwrap_or(0);
    let line = usize::from(seed) % lines.len();
    let column = data.get(1).copied().unwrap_or(0);

    let cursor = Position::new(line as u32, u32::from(column));
    let first = engine.complete(&lines, cursor, &entities);
    let second = engine.complete(&lines, cursor, &entities);
    assert_eq!(first, second);
    assert!(first.items.len() <= MAX_RESULTS);
    assert!(first.replace.from <= first.replace.to);
});
