#![no_main]

use blueprint_syntax::{classify, Highlighter, LexState};
use libfuzzer_sys::fuzz_target;

const MAX_SOURCE_BYTES: usize = 4096;

fuzz_target!(|data: &[u8]| {
    let capped = &data[..data.len().min(MAX_SOURCE_BYTES)];
    let source = String::from_utf8_lossy(capped);

    let mut state = LexState::default();
    for line in source.split('\n') {
        let (spans, next) = classify(line, &state);
        let rebuilt: String = spans.iter().map(|span| span.text(line)).collect();
        assert_eq!(rebuilt, line);
        state = next;
    }

    // Editing one line and relexing incrementally must match a full pass.
    let mut highlighter = Highlighter::with_text(&source);
    if let Some(&seed) = data.first() {
        let at = usize::from(seed) % highlighter.line_count();
        highlighter.edit(at, 1, &["{{ x"]);
        let mut state = LexState::default();
        for index in 0..highlighter.line_count() {
            let text = highlighter.line_text(index).unwrap_or_default().to_string();
            let (spans, next) = classify(&text, &state);
            assert_eq!(highlighter.spans(index), Some(spans.as_slice()));
            state = next;
        }
    }
});
