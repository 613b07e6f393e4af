//! `blueprint-syntax` - Line classification for Home Assistant YAML with embedded Jinja.
//!
//! This crate provides the colorization half of the editor core:
//!
//! - **Structural sub-lexer**: Shallow YAML tokens (keys, comments, tags, quotes, block scalars)
//! - **Expression tokens**: Jinja template tokens inside `{{ }}`, `{% %}` and `{# #}`
//! - **Composite lexer**: Line-at-a-time classification with a copyable state
//! - **Highlighter**: Per-line state cache for incremental re-rendering
//!
//! # Design Principles
//!
//! - **Lossless**: Every byte of a line lands in exactly one span
//! - **Error-tolerant**: Unrecognized input is classified as plain text, never rejected
//! - **Restartable**: Lexing a line only depends on the state left by the previous line
//!
//! # Example
//!
//! ```
//! use blueprint_syntax::lexer::{classify, Category, LexState, Marker};
//!
//! let (spans, state) = classify("automation:", &LexState::default());
//! assert_eq!(spans[0].category, Category::StructuralKey);
//! assert_eq!(spans[0].marker, Some(Marker::Domain));
//! assert!(!state.in_expression());
//!
//! let (spans, state) = classify("  value_template: \"{{ is_state('sun.sun', 'above_horizon')", &state);
//! assert!(spans.iter().any(|span| span.category == Category::ExpressionDelimiter));
//! assert!(state.in_expression());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod highlight;
pub mod lexer;

pub use highlight::Highlighter;
pub use lexer::{classify, Category, DelimiterKind, LexState, Marker, Mode, Span};
