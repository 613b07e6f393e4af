mod common;

use std::sync::Arc;

use blueprint_ide::{rank, CompletionEngine, CompletionItem, CompletionKind, Position, Schema};
use common::{complete_at_end, dump, engine, entities, labels};
use expect_test::expect;

#[test]
fn entity_prefix_completion() {
    let result = complete_at_end(&engine(), &["  entity_id: light.k"]);
    expect![[r#"
        replace 0:13..0:20
        entity "light.kitchen"
    "#]]
    .assert_eq(&dump(&result));
    assert_eq!(result.items[0].detail.as_deref(), Some("Kitchen"));
}

#[test]
fn entity_completion_inside_template() {
    let result = complete_at_end(&engine(), &["  value_template: \"{{ is_state('light."]);
    expect![[r#"
        replace 0:32..0:38
        entity "light.kitchen"
        entity "light.living_room"
    "#]]
    .assert_eq(&dump(&result));
}

#[test]
fn entity_completion_carries_icon() {
    let result = complete_at_end(&engine(), &["target: switch."]);
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].icon.as_deref(), Some("mdi:fan"));
    assert_eq!(result.items[0].range, result.replace);
}

#[test]
fn escape_tag_completion() {
    let result = complete_at_end(&engine(), &["  password: !se"]);
    assert_eq!(labels(&result), "!secret ");
    assert_eq!(result.replace.from, Position::new(0, 12));
    assert_eq!(result.items[0].kind, CompletionKind::Tag);
}

#[test]
fn escape_tag_matches_inside_the_name() {
    let result = complete_at_end(&engine(), &["  x: !dir"]);
    let texts: Vec<&str> = result.items.iter().map(|item| item.insert_text.as_str()).collect();
    assert_eq!(
        texts,
        [
            "!include_dir_list ",
            "!include_dir_merge_list ",
            "!include_dir_merge_named ",
            "!include_dir_named ",
        ]
    );
    assert_eq!(result.replace.from, Position::new(0, 5));
    assert_eq!(result.replace.to, Position::new(0, 9));
}

#[test]
fn escape_tag_prefix_matches_rank_first() {
    let result = complete_at_end(&engine(), &["!in"]);
    let texts: Vec<&str> = result.items.iter().map(|item| item.insert_text.as_str()).collect();
    assert_eq!(
        texts,
        [
            "!include ",
            "!include_dir_list ",
            "!include_dir_merge_list ",
            "!include_dir_merge_named ",
            "!include_dir_named ",
            "!input ",
        ]
    );
}

#[test]
fn bare_bang_lists_every_tag() {
    let result = complete_at_end(&engine(), &["!"]);
    assert_eq!(result.items.len(), 8);
    assert!(result.items.iter().all(|item| item.kind == CompletionKind::Tag));
}

#[test]
fn top_level_domains() {
    let result = complete_at_end(&engine(), &["home"]);
    insta::assert_snapshot!(labels(&result), @"homeassistant:");
}

#[test]
fn top_level_domains_rank_prefix_first() {
    let result = complete_at_end(&engine(), &["in"]);
    expect![[r#"
        replace 0:0..0:2
        domain "input_boolean:"
        domain "input_button:"
        domain "input_datetime:"
        domain "input_number:"
        domain "input_select:"
        domain "input_text:"
        domain "binary_sensor:"
        domain "shopping_list:"
    "#]]
    .assert_eq(&dump(&result));
}

#[test]
fn automation_trigger_pool() {
    let document = [
        "automation:",
        "  - alias: Lights",
        "    trigger:",
        "      - pla",
    ];
    let result = complete_at_end(&engine(), &document);
    expect![[r#"
        replace 3:8..3:11
        trigger "platform: calendar"
        trigger "platform: conversation"
        trigger "platform: event"
        trigger "platform: geo_location"
        trigger "platform: homeassistant"
        trigger "platform: mqtt"
        trigger "platform: numeric_state"
        trigger "platform: state"
        trigger "platform: sun"
        trigger "platform: tag"
        trigger "platform: template"
        trigger "platform: time"
        trigger "platform: time_pattern"
        trigger "platform: webhook"
        trigger "platform: zone"
    "#]]
    .assert_eq(&dump(&result));
}

#[test]
fn automation_action_pool_is_bounded() {
    let document = ["automation:", "  - alias: Lights", "    action:", "      - ser"];
    let result = complete_at_end(&engine(), &document);
    assert_eq!(result.items.len(), 20);
    assert_eq!(result.items[0].insert_text, "service: automation.reload");
    assert_eq!(result.items[19].insert_text, "service: input_boolean.toggle");
}

#[test]
fn automation_condition_pool() {
    let document = ["automation:", "  - condition:", "      - st"];
    let result = complete_at_end(&engine(), &document);
    insta::assert_snapshot!(labels(&result), @r"
    condition: numeric_state
    condition: state
    ");
}

#[test]
fn automation_keys_without_subsection() {
    let document = ["automation:", "  - alias: Lights", "    co"];
    let result = complete_at_end(&engine(), &document);
    insta::assert_snapshot!(labels(&result), @"condition:");
}

#[test]
fn automation_mode_values() {
    let document = ["automation:", "  - alias: Lights", "    mode: "];
    let result = complete_at_end(&engine(), &document);
    expect![[r#"
        replace 2:10..2:10
        value "parallel"
        value "queued"
        value "restart"
        value "single"
    "#]]
    .assert_eq(&dump(&result));
}

#[test]
fn sensor_platform_pool() {
    let document = ["sensor:", "  - platform: mqtt", "    name: Outside", "    "];
    let result = complete_at_end(&engine(), &document);
    assert_eq!(result.items.len(), 13);
    assert_eq!(result.items[0].insert_text, "platform: command_line");
    assert!(result.items.iter().all(|item| item.kind == CompletionKind::Platform));
}

#[test]
fn generic_section_mixes_keys_and_domains() {
    let result = complete_at_end(&engine(), &["homeassistant:", "  te"]);
    expect![[r#"
        replace 1:2..1:4
        domain "template:"
        key "attributes:"
        key "availability_template:"
        domain "climate:"
        domain "counter:"
        domain "frontend:"
        domain "input_datetime:"
        domain "input_text:"
        key "state:"
        key "state_topic:"
        domain "system_health:"
        key "value_template:"
    "#]]
    .assert_eq(&dump(&result));
}

#[test]
fn snippet_expands_at_line_indentation() {
    let schema = Schema::from_toml(
        r#"
[[snippets]]
prefix = "pair"
label = "Pair"
body = "- first: 1\n  second: 2"
"#,
    )
    .unwrap();
    let engine = CompletionEngine::new(Arc::new(schema));
    let result = complete_at_end(&engine, &["script:", "    snip:pa"]);
    expect![[r#"
        replace 1:4..1:11
        snippet "- first: 1\n      second: 2"
    "#]]
    .assert_eq(&dump(&result));
    assert_eq!(result.items[0].display_text, "Pair");
}

#[test]
fn builtin_snippet_trigger() {
    let result = complete_at_end(&engine(), &["automation:", "  snip:auto"]);
    assert_eq!(result.items.len(), 1);
    let text = result.items[0].insert_text.as_str();
    assert!(text.starts_with("- alias: New automation\n    description:"));
    assert!(text.lines().skip(1).all(|line| line.starts_with("  ")));
}

#[test]
fn custom_snippet_sentinel() {
    let schema = Schema::from_toml(
        "snippet_sentinel = \"tpl\"\n[[snippets]]\nprefix = \"x\"\nbody = \"x: 1\"\n",
    )
    .unwrap();
    let engine = CompletionEngine::new(Arc::new(schema));
    assert_eq!(complete_at_end(&engine, &["tpl:"]).items.len(), 1);
    assert!(complete_at_end(&engine, &["snip:"]).items.is_empty());
}

#[test]
fn cursor_past_last_line_is_empty() {
    let result = engine().complete(&["a: 1"], Position::new(4, 0), &entities());
    assert!(result.items.is_empty());
    assert_eq!(result.replace.from, Position::new(4, 0));
}

#[test]
fn cursor_column_is_clamped() {
    let engine = engine();
    let clamped = engine.complete(&["home"], Position::new(0, 99), &entities());
    let exact = engine.complete(&["home"], Position::new(0, 4), &entities());
    assert_eq!(clamped, exact);
}

#[test]
fn completion_is_deterministic() {
    let engine = engine();
    let document = ["automation:", "  - trigger:", "      - platform: state", "        "];
    let first = engine.complete(&document, Position::new(3, 8), &entities());
    let second = engine.complete(&document, Position::new(3, 8), &entities());
    assert_eq!(first, second);
}

#[test]
fn repeated_candidates_are_not_collapsed() {
    let pool = vec![CompletionItem::new("alias:", CompletionKind::Key); 500];
    assert_eq!(rank(pool, "al").len(), 20);
}

#[test]
fn ranking_tie_break_is_lexicographic() {
    let pool = vec![
        CompletionItem::new("switch.fanlight", CompletionKind::Entity),
        CompletionItem::new("switch.fan", CompletionKind::Entity),
    ];
    let ranked = rank(pool, "fan");
    assert_eq!(ranked[0].insert_text, "switch.fan");
    assert_eq!(ranked[1].insert_text, "switch.fanlight");
}

#[test]
fn large_pool_is_truncated() {
    let mut table = String::new();
    for index in 0..500 {
        table.push_str(&format!("[[domains]]\ntext = \"domain_{index:03}:\"\n"));
    }
    let engine = CompletionEngine::new(Arc::new(Schema::from_toml(&table).unwrap()));
    let result = engine.complete(&[""], Position::new(0, 0), &entities());
    assert_eq!(result.items.len(), 20);
    assert_eq!(result.items[0].insert_text, "domain_000:");
}
