//! Multi-line snippet templates.

use smol_str::SmolStr;

/// A named multi-line template inserted through the snippet trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// Name typed after the sentinel, e.g. `automation` in `snip:automation`.
    pub prefix: SmolStr,
    /// Label shown in the candidate list.
    pub label: SmolStr,
    /// Template text. Lines are separated by `\n`.
    pub body: String,
    /// Optional description.
    pub description: Option<SmolStr>,
}

impl Snippet {
    /// Creates a snippet whose label is its prefix.
    pub fn new(prefix: impl Into<SmolStr>, body: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            label: prefix.clone(),
            prefix,
            body: body.into(),
            description: None,
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<SmolStr>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<SmolStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the body with every line after the first prefixed by `indent`.
    ///
    /// The first line lands at the cursor, which already sits after the
    /// indentation. Blank lines get no trailing whitespace.
    #[must_use]
    pub fn expand(&self, indent: &str) -> String {
        let mut text = String::with_capacity(self.body.len() + indent.len() * 8);
        for (index, line) in self.body.split('\n').enumerate() {
            if index > 0 {
                text.push('\n');
                if !line.trim().is_empty() {
                    text.push_str(indent);
                }
            }
            text.push_str(line);
        }
        text
    }
}
