//! Shared helpers for lexer tests.
#![allow(dead_code)]

use blueprint_syntax::lexer::{classify, LexState, Span};

/// Formats the spans of consecutive lines for snapshot testing.
pub fn dump_lines(lines: &[&str]) -> String {
    let mut state = LexState::default();
    let mut output = String::new();
    for (index, line) in lines.iter().enumerate() {
        let (spans, next) = classify(line, &state);
        for span in &spans {
            output.push_str(&format!("{index}: {} {:?}\n", label(span), span.text(line)));
        }
        state = next;
    }
    output
}

fn label(span: &Span) -> String {
    match span.marker {
        Some(marker) => format!("{}[{}]", span.category.as_str(), marker.as_str()),
        None => span.category.as_str().to_string(),
    }
}

/// Concatenates span texts, which must rebuild the line.
pub fn rebuild(line: &str, spans: &[Span]) -> String {
    spans.iter().map(|span| span.text(line)).collect()
}
