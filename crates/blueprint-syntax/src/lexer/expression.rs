//! Jinja expression tokens and template delimiters.

use logos::Logos;

use super::Category;

/// Which kind of template delimiter opened the current expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelimiterKind {
    /// `{{ ... }}`
    Value,
    /// `{% ... %}`
    Statement,
    /// `{# ... #}`
    Comment,
}

impl DelimiterKind {
    /// Matches an opening delimiter at the start of `text`.
    ///
    /// Returns the delimiter kind and the byte length of the opener, including
    /// a whitespace-control `-` or `+` on value and statement openers.
    #[must_use]
    pub fn open_at(text: &str) -> Option<(Self, usize)> {
        let kind = if text.starts_with("{{") {
            Self::Value
        } else if text.starts_with("{%") {
            Self::Statement
        } else if text.starts_with("{#") {
            Self::Comment
        } else {
            return None;
        };
        let len = match (kind, text.as_bytes().get(2)) {
            (Self::Value | Self::Statement, Some(b'-' | b'+')) => 3,
            _ => 2,
        };
        Some((kind, len))
    }

    /// Matches the closer of this delimiter kind at the start of `text`.
    #[must_use]
    pub fn close_at(self, text: &str) -> Option<usize> {
        let closer = self.closer();
        if text.starts_with(closer) {
            return Some(closer.len());
        }
        if self != Self::Comment
            && (text.starts_with('-') || text.starts_with('+'))
            && text[1..].starts_with(closer)
        {
            return Some(closer.len() + 1);
        }
        None
    }

    /// The canonical opener text.
    #[must_use]
    pub fn opener(self) -> &'static str {
        match self {
            Self::Value => "{{",
            Self::Statement => "{%",
            Self::Comment => "{#",
        }
    }

    /// The canonical closer text.
    #[must_use]
    pub fn closer(self) -> &'static str {
        match self {
            Self::Value => "}}",
            Self::Statement => "%}",
            Self::Comment => "#}",
        }
    }
}

/// Tokens of the Jinja expression language.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExprToken {
    /// Spaces and tabs.
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    /// Reserved statement and control-flow words.
    #[token("if")]
    #[token("elif")]
    #[token("else")]
    #[token("endif")]
    #[token("for")]
    #[token("endfor")]
    #[token("in")]
    #[token("is")]
    #[token("not")]
    #[token("and")]
    #[token("or")]
    #[token("set")]
    #[token("endset")]
    #[token("macro")]
    #[token("endmacro")]
    #[token("call")]
    #[token("endcall")]
    #[token("filter")]
    #[token("endfilter")]
    #[token("block")]
    #[token("endblock")]
    #[token("extends")]
    #[token("include")]
    #[token("import")]
    #[token("from")]
    #[token("as")]
    #[token("with")]
    #[token("endwith")]
    #[token("raw")]
    #[token("endraw")]
    #[token("recursive")]
    #[token("break")]
    #[token("continue")]
    #[token("do")]
    Keyword,

    /// `true`, `false`, `none` in either Jinja spelling.
    #[token("true")]
    #[token("false")]
    #[token("none")]
    #[token("True")]
    #[token("False")]
    #[token("None")]
    Constant,

    /// Single- or double-quoted string with backslash escapes.
    #[regex(r#"'([^'\\\r\n]|\\[^\r\n])*'"#)]
    #[regex(r#""([^"\\\r\n]|\\[^\r\n])*""#)]
    String,

    /// Integer or decimal number.
    #[regex(r"[0-9][0-9_]*(\.[0-9]+)?")]
    Number,

    /// Identifier: variable, function, filter or test name.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    /// Operators and punctuation.
    #[token("==")]
    #[token("!=")]
    #[token("<=")]
    #[token(">=")]
    #[token("<")]
    #[token(">")]
    #[token("=")]
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("**")]
    #[token("/")]
    #[token("//")]
    #[token("%")]
    #[token("~")]
    #[token("|")]
    #[token(".")]
    #[token(",")]
    #[token(":")]
    #[token("(")]
    #[token(")")]
    #[token("[")]
    #[token("]")]
    #[token("{")]
    #[token("}")]
    Operator,

    /// Unrecognized character.
    #[default]
    Error,
}

impl ExprToken {
    /// The span category this token is rendered with.
    #[must_use]
    pub fn category(self) -> Category {
        match self {
            Self::Keyword => Category::ExpressionKeyword,
            Self::Constant | Self::String | Self::Number => Category::ExpressionLiteral,
            Self::Ident => Category::ExpressionIdentifier,
            Self::Operator => Category::ExpressionOperator,
            Self::Whitespace | Self::Error => Category::Plain,
        }
    }
}

/// Lexes one expression token at the start of `text`.
///
/// Unrecognized input yields [`ExprToken::Error`] covering a single character.
pub(crate) fn next_token(text: &str) -> (ExprToken, usize) {
    let mut lexer = ExprToken::lexer(text);
    match lexer.next() {
        Some(Ok(kind)) if kind != ExprToken::Error => (kind, lexer.span().end),
        _ => (ExprToken::Error, text.chars().next().map_or(1, char::len_utf8)),
    }
}

/// Length of comment text before the `#}` closer (or the rest of the line).
pub(crate) fn comment_run(text: &str) -> usize {
    text.find(DelimiterKind::Comment.closer())
        .filter(|&index| index > 0)
        .unwrap_or(text.len())
}
