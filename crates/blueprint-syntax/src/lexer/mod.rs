//! Composite lexer for Home Assistant YAML with embedded Jinja templates.
//!
//! The lexer classifies one line at a time. Outside a template it looks for a
//! template opener first and otherwise lets the structural sub-lexer consume a
//! single token, which is then re-classified against the Home Assistant
//! vocabulary (domains, control keys, escape tags). Inside a template it looks
//! for the matching closer first and otherwise consumes one Jinja token.
//!
//! The state between lines is a small `Copy` value, so a caller can keep the
//! state of every line and restart from any of them.

mod expression;
mod structural;

pub use expression::{DelimiterKind, ExprToken};
pub use structural::{indentation, StructuralClass, StructuralState, StructuralToken};

use text_size::{TextRange, TextSize};

/// Top-level keys rendered as domain keywords when they start a line.
pub const DOMAIN_KEYWORDS: &[&str] = &[
    "automation",
    "script",
    "sensor",
    "binary_sensor",
    "template",
    "input_boolean",
    "input_number",
    "input_select",
    "input_text",
    "input_datetime",
    "light",
    "switch",
    "climate",
    "cover",
    "scene",
    "group",
    "zone",
    "person",
];

/// Keys rendered as control keywords wherever they appear.
pub const CONTROL_KEYWORDS: &[&str] = &[
    "trigger",
    "triggers",
    "condition",
    "conditions",
    "action",
    "actions",
    "service",
    "entity_id",
    "platform",
    "device_id",
    "area_id",
];

/// Reserved escape tags and the marker each one is rendered with.
pub const ESCAPE_TAGS: &[(&str, Marker)] = &[
    ("!include", Marker::Include),
    ("!include_dir_list", Marker::Include),
    ("!include_dir_named", Marker::Include),
    ("!include_dir_merge_list", Marker::Include),
    ("!include_dir_merge_named", Marker::Include),
    ("!secret", Marker::Secret),
    ("!env_var", Marker::EnvVar),
    ("!input", Marker::Input),
];

/// Classification of a span of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// YAML comment or Jinja `{# #}` comment body.
    Comment,
    /// A mapping key including its colon.
    StructuralKey,
    /// A reserved escape tag such as `!secret`.
    StructuralTag,
    /// `{{`, `}}`, `{%`, `%}`, `{#`, `#}` and their whitespace-control forms.
    ExpressionDelimiter,
    /// Reserved Jinja word.
    ExpressionKeyword,
    /// Jinja string, number, boolean or none.
    ExpressionLiteral,
    /// Jinja identifier.
    ExpressionIdentifier,
    /// Jinja operator or punctuation.
    ExpressionOperator,
    /// Everything else.
    Plain,
}

impl Category {
    /// Stable name used by renderers.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::StructuralKey => "structural-key",
            Self::StructuralTag => "structural-tag",
            Self::ExpressionDelimiter => "expression-delimiter",
            Self::ExpressionKeyword => "expression-keyword",
            Self::ExpressionLiteral => "expression-literal",
            Self::ExpressionIdentifier => "expression-identifier",
            Self::ExpressionOperator => "expression-operator",
            Self::Plain => "plain",
        }
    }
}

/// Secondary classification attached to structural keys and tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// A top-level integration domain (`automation:`).
    Domain,
    /// A trigger/condition/action style key (`platform:`).
    Control,
    /// `!include` and its directory variants.
    Include,
    /// `!secret`
    Secret,
    /// `!env_var`
    EnvVar,
    /// `!input`
    Input,
}

impl Marker {
    /// Stable name used by renderers.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Control => "control",
            Self::Include => "include",
            Self::Secret => "secret",
            Self::EnvVar => "env-var",
            Self::Input => "input",
        }
    }
}

/// A classified span of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte range within the line.
    pub range: TextRange,
    /// Primary classification.
    pub category: Category,
    /// Secondary classification, if any.
    pub marker: Option<Marker>,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub fn new(range: TextRange, category: Category, marker: Option<Marker>) -> Self {
        Self {
            range,
            category,
            marker,
        }
    }

    /// Returns the text of this span within `line`.
    #[must_use]
    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        &line[self.range]
    }
}

/// Which language the lexer is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Mode {
    /// Plain YAML.
    #[default]
    Structural,
    /// Inside `{{ ... }}`.
    ExpressionValue,
    /// Inside `{% ... %}`.
    ExpressionStatement,
    /// Inside `{# ... #}`.
    ExpressionComment,
}

impl Mode {
    /// The delimiter kind that opened the current expression, if any.
    #[must_use]
    pub fn delimiter(self) -> Option<DelimiterKind> {
        match self {
            Self::Structural => None,
            Self::ExpressionValue => Some(DelimiterKind::Value),
            Self::ExpressionStatement => Some(DelimiterKind::Statement),
            Self::ExpressionComment => Some(DelimiterKind::Comment),
        }
    }
}

impl From<DelimiterKind> for Mode {
    fn from(kind: DelimiterKind) -> Self {
        match kind {
            DelimiterKind::Value => Self::ExpressionValue,
            DelimiterKind::Statement => Self::ExpressionStatement,
            DelimiterKind::Comment => Self::ExpressionComment,
        }
    }
}

/// Lexer state carried from one line to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct LexState {
    /// State of the structural sub-lexer.
    pub structural: StructuralState,
    /// Current language mode.
    pub mode: Mode,
}

impl LexState {
    /// Returns `true` while inside a template delimiter pair.
    #[must_use]
    pub fn in_expression(&self) -> bool {
        self.mode != Mode::Structural
    }

    /// The delimiter kind of the open template, if any.
    #[must_use]
    pub fn delimiter(&self) -> Option<DelimiterKind> {
        self.mode.delimiter()
    }
}

/// Classifies one line, starting from `state`.
///
/// Returns spans covering the whole line and the state for the next line. The
/// input state is never modified.
#[must_use]
pub fn classify(line: &str, state: &LexState) -> (Vec<Span>, LexState) {
    let mut state = *state;
    state.structural.begin_line(line);

    let logical_start = indentation(line) as usize;
    let mut spans = Vec::new();
    let mut pos = 0usize;

    while pos < line.len() {
        let rest = &line[pos..];
        let (len, category, marker) = match state.mode.delimiter() {
            None => {
                if let Some((kind, len)) = DelimiterKind::open_at(rest) {
                    state.mode = Mode::from(kind);
                    (len, Category::ExpressionDelimiter, None)
                } else {
                    let token = state.structural.next_token(line, pos);
                    let text = &rest[..token.len];
                    let (category, marker) = reclassify(text, token.class, pos == logical_start);
                    (token.len, category, marker)
                }
            }
            Some(kind) => {
                if let Some(len) = kind.close_at(rest) {
                    state.mode = Mode::Structural;
                    (len, Category::ExpressionDelimiter, None)
                } else if kind == DelimiterKind::Comment {
                    (expression::comment_run(rest), Category::Comment, None)
                } else {
                    let (token, len) = expression::next_token(rest);
                    (len, token.category(), None)
                }
            }
        };

        let range = TextRange::new(
            TextSize::from(pos as u32),
            TextSize::from((pos + len) as u32),
        );
        spans.push(Span::new(range, category, marker));
        pos += len;
    }

    (spans, state)
}

/// Classifies consecutive lines starting from the default state.
#[must_use]
pub fn classify_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<Vec<Span>> {
    let mut state = LexState::default();
    lines
        .into_iter()
        .map(|line| {
            let (spans, next) = classify(line, &state);
            state = next;
            spans
        })
        .collect()
}

fn reclassify(text: &str, class: StructuralClass, at_line_start: bool) -> (Category, Option<Marker>) {
    match class {
        StructuralClass::Comment => (Category::Comment, None),
        StructuralClass::Tag => match escape_tag_marker(text) {
            Some(marker) => (Category::StructuralTag, Some(marker)),
            None => (Category::Plain, None),
        },
        StructuralClass::Key => {
            let name = text.trim_end_matches(':');
            if at_line_start && DOMAIN_KEYWORDS.contains(&name) {
                (Category::StructuralKey, Some(Marker::Domain))
            } else if CONTROL_KEYWORDS.contains(&name) {
                (Category::StructuralKey, Some(Marker::Control))
            } else {
                (Category::StructuralKey, None)
            }
        }
        StructuralClass::Plain => (Category::Plain, None),
    }
}

/// Returns the marker of a reserved escape tag.
#[must_use]
pub fn escape_tag_marker(text: &str) -> Option<Marker> {
    ESCAPE_TAGS
        .iter()
        .find(|(tag, _)| *tag == text)
        .map(|(_, marker)| *marker)
}
