mod common;

use blueprint_syntax::lexer::{classify, Category, LexState, Mode};
use common::dump_lines;
use expect_test::expect;

#[test]
fn template_inside_quoted_value() {
    let actual = dump_lines(&[r#"  message: "{{ states('sensor.temp') | float }}°C" # note"#]);
    expect![[r##"
        0: plain "  "
        0: structural-key "message:"
        0: plain " "
        0: plain "\""
        0: expression-delimiter "{{"
        0: plain " "
        0: expression-identifier "states"
        0: expression-operator "("
        0: expression-literal "'sensor.temp'"
        0: expression-operator ")"
        0: plain " "
        0: expression-operator "|"
        0: plain " "
        0: expression-identifier "float"
        0: plain " "
        0: expression-delimiter "}}"
        0: plain "°C"
        0: plain "\""
        0: plain " "
        0: comment "# note"
    "##]]
    .assert_eq(&actual);
}

#[test]
fn comment_and_statement_across_lines() {
    let actual = dump_lines(&[
        "{# a note",
        "   spanning #} {%- if is_state('sun.sun', 'above_horizon') -%}",
    ]);
    expect![[r##"
        0: expression-delimiter "{#"
        0: comment " a note"
        1: comment "   spanning "
        1: expression-delimiter "#}"
        1: plain " "
        1: expression-delimiter "{%-"
        1: plain " "
        1: expression-keyword "if"
        1: plain " "
        1: expression-identifier "is_state"
        1: expression-operator "("
        1: expression-literal "'sun.sun'"
        1: expression-operator ","
        1: plain " "
        1: expression-literal "'above_horizon'"
        1: expression-operator ")"
        1: plain " "
        1: expression-delimiter "-%}"
    "##]]
    .assert_eq(&actual);
}

#[test]
fn home_assistant_markers() {
    let actual = dump_lines(&[
        "automation:",
        "  - trigger:",
        "      - platform: state",
        "        entity_id: !secret door",
    ]);
    expect![[r#"
        0: structural-key[domain] "automation:"
        1: plain "  "
        1: plain "-"
        1: plain " "
        1: structural-key[control] "trigger:"
        2: plain "      "
        2: plain "-"
        2: plain " "
        2: structural-key[control] "platform:"
        2: plain " "
        2: plain "state"
        3: plain "        "
        3: structural-key[control] "entity_id:"
        3: plain " "
        3: structural-tag[secret] "!secret"
        3: plain " "
        3: plain "door"
    "#]]
    .assert_eq(&actual);
}

#[test]
fn block_scalar_keeps_templates() {
    let lines = [
        "    value_template: >",
        "      {{ x }} key: y",
        "    name: z",
    ];
    let mut state = LexState::default();
    let mut all = Vec::new();
    for line in lines {
        let (spans, next) = classify(line, &state);
        all.push(spans);
        state = next;
    }

    // Body line: template recognized, `key:` left as plain text.
    assert_eq!(all[1][1].category, Category::ExpressionDelimiter);
    assert!(!all[1].iter().any(|span| span.category == Category::StructuralKey));
    // Dedent ends the block scalar.
    assert!(all[2].iter().any(|span| span.category == Category::StructuralKey));
    assert_eq!(state.mode, Mode::Structural);
}

#[test]
fn unclosed_value_expression_spans_lines() {
    let (_, state) = classify("msg: >-", &LexState::default());
    let (_, state) = classify("  {{ 'a' ~", &state);
    assert_eq!(state.mode, Mode::ExpressionValue);
    let (spans, state) = classify("  'b' }} done", &state);
    assert_eq!(spans[1].category, Category::ExpressionLiteral);
    assert_eq!(spans[3].category, Category::ExpressionDelimiter);
    assert_eq!(state.mode, Mode::Structural);
}
