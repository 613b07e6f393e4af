//! `blueprint-ide` - Autocomplete for Home Assistant configuration files.
//!
//! This crate provides the completion half of the editor core:
//!
//! - **Schema**: Static candidate pools and snippets, loaded once from TOML
//! - **Registry**: Snapshot of the entity ids known to Home Assistant
//! - **Context**: Indentation-based inference of the enclosing section
//! - **Completion**: Rule-based candidate selection at the cursor
//! - **Ranking**: Filtering and ordering of candidate pools
//!
//! # Architecture
//!
//! Every feature is a pure function of a document snapshot, a cursor position
//! and a registry snapshot. The schema is constructed explicitly and handed to
//! a [`CompletionEngine`]; there is no global state.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use blueprint_ide::{CompletionEngine, EntityRecord, Position, Schema};
//!
//! let engine = CompletionEngine::new(Arc::new(Schema::builtin().unwrap()));
//! let entities = [EntityRecord::new("light.kitchen"), EntityRecord::new("switch.fan")];
//! let document = ["  entity_id: light.k"];
//! let result = engine.complete(&document, Position::new(0, 20), &entities);
//!
//! assert_eq!(result.items[0].insert_text, "light.kitchen");
//! assert_eq!(result.replace.from, Position::new(0, 13));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod completion;
pub mod context;
pub mod ranking;
pub mod registry;
pub mod schema;
pub mod snippet;

pub use completion::{
    complete, CompletionEngine, CompletionItem, CompletionKind, CompletionResult, Position,
    ReplaceRange,
};
pub use context::{infer_context, Section, YamlContext};
pub use ranking::{rank, MAX_RESULTS};
pub use registry::{is_entity_id, EntityRecord, EntityRegistry};
pub use schema::{Pool, PoolEntry, Schema, SchemaError};
pub use snippet::Snippet;
