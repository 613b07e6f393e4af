//! Structural (YAML) sub-lexer.
//!
//! The composite lexer hands this module exactly one token's worth of input at
//! a time. It only knows enough YAML to find mapping keys, comments, tags,
//! quoted scalars and block scalars; everything else comes back as plain text.

use logos::Logos;

/// Raw structural tokens, before any context is applied.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
enum YamlToken {
    #[regex(r"[ \t]+")]
    Whitespace,

    /// `# ...` up to the end of the line.
    #[regex(r"#[^\r\n]*", allow_greedy = true)]
    Comment,

    #[token("-")]
    Dash,

    #[token(":")]
    Colon,

    /// `!tag`, `!!str`
    #[regex(r"![!A-Za-z0-9_\-]*")]
    Tag,

    #[regex(r"&[A-Za-z0-9_\-]+")]
    Anchor,

    #[regex(r"\*[A-Za-z0-9_\-]+")]
    Alias,

    /// Plain scalar word; may contain dots and slashes (`light.kitchen`, `a/b`).
    #[regex(r"[A-Za-z0-9_][A-Za-z0-9_\-./]*")]
    Word,

    #[token("\"")]
    DoubleQuote,

    #[token("'")]
    SingleQuote,

    /// `|`, `>-`, `|+2`
    #[regex(r"[|>][+\-]?[0-9]?")]
    BlockScalarHeader,

    #[regex(r"[\[\]{},?]")]
    FlowIndicator,

    #[default]
    Error,
}

/// What the structural sub-lexer recognized, before domain re-classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralClass {
    /// A YAML comment.
    Comment,
    /// A mapping key including its trailing colon.
    Key,
    /// A `!tag`.
    Tag,
    /// Anything else.
    Plain,
}

/// One token consumed by the structural sub-lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralToken {
    /// Classification of the token.
    pub class: StructuralClass,
    /// Length of the token in bytes (never zero).
    pub len: usize,
}

impl StructuralToken {
    fn new(class: StructuralClass, len: usize) -> Self {
        Self { class, len }
    }

    fn plain(len: usize) -> Self {
        Self::new(StructuralClass::Plain, len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
enum Quote {
    Single,
    Double,
}

/// Opaque state of the structural sub-lexer carried from line to line.
///
/// Only block scalars survive a line break. Quoted scalars are tracked so that
/// an embedded expression can interrupt a string and hand it back, but they are
/// reset at every line start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct StructuralState {
    /// Indentation of the line holding a `|`/`>` header, waiting for the next line.
    pending_block_scalar: Option<u32>,
    /// Indentation of the header line of the block scalar being lexed.
    block_scalar: Option<u32>,
    quote: Option<Quote>,
}

impl StructuralState {
    /// Returns `true` if the current line is block scalar content.
    #[must_use]
    pub fn in_block_scalar(&self) -> bool {
        self.block_scalar.is_some()
    }

    /// Prepares the state for a new line.
    pub(crate) fn begin_line(&mut self, line: &str) {
        self.quote = None;
        if let Some(parent) = self.pending_block_scalar.take() {
            self.block_scalar = Some(parent);
        }
        if let Some(parent) = self.block_scalar {
            if !line.trim().is_empty() && indentation(line) <= parent {
                self.block_scalar = None;
            }
        }
    }

    /// Consumes one token of `line` starting at byte offset `pos`.
    pub(crate) fn next_token(&mut self, line: &str, pos: usize) -> StructuralToken {
        let rest = &line[pos..];
        if self.block_scalar.is_some() {
            return StructuralToken::plain(scalar_run(rest));
        }
        if let Some(quote) = self.quote {
            return self.quoted(rest, quote);
        }

        let mut lexer = YamlToken::lexer(rest);
        let kind = match lexer.next() {
            Some(Ok(kind)) => kind,
            Some(Err(())) | None => YamlToken::Error,
        };
        let len = match kind {
            YamlToken::Error => first_char_len(rest),
            _ => lexer.span().end,
        };
        let previous = line[..pos].chars().next_back();

        match kind {
            YamlToken::Comment => {
                if previous.is_none_or(|ch| ch == ' ' || ch == '\t') {
                    StructuralToken::new(StructuralClass::Comment, len)
                } else {
                    StructuralToken::plain(1)
                }
            }
            YamlToken::Word => {
                let after = rest[len..].as_bytes();
                let is_key = after.first() == Some(&b':')
                    && matches!(after.get(1), None | Some(b' ' | b'\t'));
                if is_key {
                    StructuralToken::new(StructuralClass::Key, len + 1)
                } else {
                    StructuralToken::plain(len)
                }
            }
            YamlToken::Tag => StructuralToken::new(StructuralClass::Tag, len),
            YamlToken::DoubleQuote | YamlToken::SingleQuote => {
                if previous.is_none_or(opens_scalar) {
                    self.quote = Some(if kind == YamlToken::DoubleQuote {
                        Quote::Double
                    } else {
                        Quote::Single
                    });
                }
                StructuralToken::plain(len)
            }
            YamlToken::BlockScalarHeader => {
                let after = rest[len..].trim_start();
                if after.is_empty() || after.starts_with('#') {
                    self.pending_block_scalar = Some(indentation(line));
                }
                StructuralToken::plain(len)
            }
            YamlToken::Whitespace
            | YamlToken::Dash
            | YamlToken::Colon
            | YamlToken::Anchor
            | YamlToken::Alias
            | YamlToken::FlowIndicator
            | YamlToken::Error => StructuralToken::plain(len),
        }
    }

    fn quoted(&mut self, rest: &str, quote: Quote) -> StructuralToken {
        let bytes = rest.as_bytes();
        let close = match quote {
            Quote::Single => b'\'',
            Quote::Double => b'"',
        };

        if bytes[0] == close {
            if quote == Quote::Single && bytes.get(1) == Some(&b'\'') {
                return StructuralToken::plain(2);
            }
            self.quote = None;
            return StructuralToken::plain(1);
        }

        // Stops only on ASCII bytes, so the returned length is a char boundary.
        let mut i = 0usize;
        while i < bytes.len() {
            let byte = bytes[i];
            if byte == close || (byte == b'{' && i > 0) {
                break;
            }
            if quote == Quote::Double && byte == b'\\' {
                i += 1;
                if i < bytes.len() && bytes[i].is_ascii() {
                    i += 1;
                }
                continue;
            }
            i += 1;
        }
        StructuralToken::plain(i.max(first_char_len(rest)))
    }
}

/// Counts leading spaces and tabs.
#[must_use]
pub fn indentation(line: &str) -> u32 {
    line.bytes()
        .take_while(|byte| matches!(byte, b' ' | b'\t'))
        .count() as u32
}

fn opens_scalar(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '[' | '{' | ',')
}

/// Plain text up to the next `{`, so expression openers are still found.
fn scalar_run(rest: &str) -> usize {
    let first = first_char_len(rest);
    match rest[first..].find('{') {
        Some(index) => first + index,
        None => rest.len(),
    }
}

fn first_char_len(rest: &str) -> usize {
    rest.chars().next().map_or(1, char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str, state: &mut StructuralState) -> Vec<(StructuralClass, String)> {
        state.begin_line(line);
        let mut pos = 0;
        let mut out = Vec::new();
        while pos < line.len() {
            let token = state.next_token(line, pos);
            out.push((token.class, line[pos..pos + token.len].to_string()));
            pos += token.len;
        }
        out
    }

    #[test]
    fn test_key_requires_space_after_colon() {
        let mut state = StructuralState::default();
        let out = tokens("url: http://example.com", &mut state);
        assert_eq!(out[0], (StructuralClass::Key, "url:".to_string()));
        assert!(out[1..]
            .iter()
            .all(|(class, _)| *class == StructuralClass::Plain));
    }

    #[test]
    fn test_hash_inside_word_is_not_comment() {
        let mut state = StructuralState::default();
        let out = tokens("color: a#b # note", &mut state);
        let comments: Vec<_> = out
            .iter()
            .filter(|(class, _)| *class == StructuralClass::Comment)
            .collect();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].1, "# note");
    }

    #[test]
    fn test_quoted_text_hides_keys_and_comments() {
        let mut state = StructuralState::default();
        let out = tokens("name: \"a: # b\"", &mut state);
        assert_eq!(out[0].0, StructuralClass::Key);
        assert!(out[1..]
            .iter()
            .all(|(class, _)| *class == StructuralClass::Plain));
        assert_eq!(state.quote, None);
    }

    #[test]
    fn test_single_quote_escape() {
        let mut state = StructuralState::default();
        let out = tokens("x: 'it''s' # c", &mut state);
        assert_eq!(out.last().map(|(class, _)| *class), Some(StructuralClass::Comment));
    }

    #[test]
    fn test_apostrophe_inside_word_does_not_open_quote() {
        let mut state = StructuralState::default();
        let out = tokens("alias: don't # c", &mut state);
        assert_eq!(out.last().map(|(class, _)| *class), Some(StructuralClass::Comment));
    }

    #[test]
    fn test_block_scalar_lifecycle() {
        let mut state = StructuralState::default();
        tokens("  value_template: >", &mut state);
        assert!(!state.in_block_scalar());

        let body = tokens("    key: not a key", &mut state);
        assert!(state.in_block_scalar());
        assert!(body.iter().all(|(class, _)| *class == StructuralClass::Plain));

        tokens("", &mut state);
        assert!(state.in_block_scalar());

        let next = tokens("  name: x", &mut state);
        assert!(!state.in_block_scalar());
        assert_eq!(next[1].0, StructuralClass::Key);
    }

    #[test]
    fn test_non_ascii_is_plain() {
        let mut state = StructuralState::default();
        let out = tokens("name: Küche", &mut state);
        let rebuilt: String = out.iter().map(|(_, text)| text.as_str()).collect();
        assert_eq!(rebuilt, "name: Küche");
    }
}
