//! Context inference from indentation.
//!
//! There is no YAML parse tree. The enclosing scope of a line is guessed by
//! walking backwards through progressively shallower lines and looking for
//! well-known keys. Inconsistent indentation or flow-style mappings can fool
//! it; that is accepted.

use blueprint_syntax::lexer::indentation;

/// Top-level section the cursor is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    /// No recognized section.
    #[default]
    None,
    /// `automation:`
    Automation,
    /// `script:`
    Script,
    /// `sensor:`
    Sensor,
    /// `binary_sensor:`
    BinarySensor,
}

/// Inferred scope of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct YamlContext {
    /// Indentation of the target line.
    pub indent: u32,
    /// Enclosing top-level section.
    pub section: Section,
    /// Below a `trigger:` key.
    pub in_trigger: bool,
    /// Below a `condition:` key.
    pub in_condition: bool,
    /// Below an `action:` key.
    pub in_action: bool,
    /// Below a `platform:` key.
    pub in_platform: bool,
}

const SECTION_MARKERS: &[(&str, Section)] = &[
    ("automation", Section::Automation),
    ("script", Section::Script),
    ("sensor", Section::Sensor),
    ("binary_sensor", Section::BinarySensor),
];

#[derive(Clone, Copy)]
enum Subsection {
    Trigger,
    Condition,
    Action,
    Platform,
}

const SUBSECTION_MARKERS: &[(&str, Subsection)] = &[
    ("trigger", Subsection::Trigger),
    ("triggers", Subsection::Trigger),
    ("condition", Subsection::Condition),
    ("conditions", Subsection::Condition),
    ("action", Subsection::Action),
    ("actions", Subsection::Action),
    ("platform", Subsection::Platform),
];

impl YamlContext {
    fn observe(&mut self, line: &str) {
        if self.section == Section::None {
            let last = SECTION_MARKERS
                .iter()
                .filter_map(|(name, section)| last_marker(line, name).map(|at| (at, *section)))
                .max_by_key(|(at, _)| *at);
            if let Some((_, section)) = last {
                self.section = section;
            }
        }

        for (name, subsection) in SUBSECTION_MARKERS {
            if last_marker(line, name).is_none() {
                continue;
            }
            match subsection {
                Subsection::Trigger => self.in_trigger = true,
                Subsection::Condition => self.in_condition = true,
                Subsection::Action => self.in_action = true,
                Subsection::Platform => self.in_platform = true,
            }
        }
    }
}

/// Infers the context of line `target` from the lines above it.
///
/// A target at indentation 0, or past the end of the document, yields a
/// context without section or subsection.
pub fn infer_context<S: AsRef<str>>(lines: &[S], target: usize) -> YamlContext {
    let Some(current) = lines.get(target) else {
        return YamlContext::default();
    };
    let indent = indentation(current.as_ref());
    let mut context = YamlContext {
        indent,
        ..YamlContext::default()
    };
    if indent == 0 {
        return context;
    }

    let mut boundary = indent;
    for line in lines[..target].iter().rev() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let line_indent = indentation(line);
        if line_indent >= boundary {
            continue;
        }
        context.observe(line);
        boundary = line_indent;
        if line_indent == 0 {
            break;
        }
    }
    context
}

/// Byte offset of the last whole-word `name:` in `line`.
fn last_marker(line: &str, name: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut found = None;
    let mut from = 0;
    while let Some(offset) = line[from..].find(name) {
        let start = from + offset;
        let end = start + name.len();
        let word_start = start == 0 || !is_word_byte(bytes[start - 1]);
        if word_start && bytes.get(end) == Some(&b':') {
            found = Some(start);
        }
        from = end;
    }
    found
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_marker_is_whole_word() {
        assert_eq!(last_marker("binary_sensor:", "sensor"), None);
        assert_eq!(last_marker("binary_sensor:", "binary_sensor"), Some(0));
        assert_eq!(last_marker("  - platform: x", "platform"), Some(4));
        assert_eq!(last_marker("conditions:", "condition"), None);
        assert_eq!(last_marker("sensor: {sensor: 1}", "sensor"), Some(9));
    }

    #[test]
    fn test_same_line_last_match_wins() {
        let mut context = YamlContext::default();
        context.observe("script: {automation: x}");
        assert_eq!(context.section, Section::Automation);
    }

    #[test]
    fn test_section_not_overwritten() {
        let mut context = YamlContext::default();
        context.observe("  sensor:");
        context.observe("automation:");
        assert_eq!(context.section, Section::Sensor);
    }
}
