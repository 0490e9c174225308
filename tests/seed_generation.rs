//! End-to-end generation from fragment files on disk.

use lesson_seed::{generate, SeedConfig};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn lesson(title: &str, prompt: &str) -> serde_json::Value {
    json!({
        "title": title,
        "description": format!("{} description", title),
        "est_minutes": 5,
        "xp_award": 25,
        "items": [{
            "base_prompt": prompt,
            "difficulty": 1,
            "variant": {
                "prompt_richtext": prompt,
                "options_json": ["Yes", "No"],
                "correct_answer_json": { "index": 0 },
                "explanation_richtext": "It is."
            }
        }]
    })
}

fn write_json(dir: &Path, name: &str, value: serde_json::Value) {
    fs::write(dir.join(name), serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

/// Two fragments with one lesson each, plus a config pointing at them.
fn two_fragment_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_json(
        dir.path(),
        "basics.json",
        json!({ "module": { "lessons": [lesson("The Pitch", "Is the pitch rectangular?")] } }),
    );
    write_json(
        dir.path(),
        "part2.json",
        json!({ "additional_lessons": [lesson("Offside", "Is it offside?")] }),
    );
    fs::write(
        dir.path().join("seed.toml"),
        r#"
        [[fragments]]
        path = "basics.json"
        pointer = "/module/lessons"

        [[fragments]]
        path = "part2.json"
        pointer = "/additional_lessons"
        "#,
    )
    .unwrap();
    dir
}

fn tables_in_order(script: &str) -> Vec<&str> {
    script
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix("INSERT INTO "))
        .filter_map(|rest| rest.split_whitespace().next())
        .collect()
}

#[test]
fn test_two_fragments_produce_ordered_batch() {
    let dir = two_fragment_workspace();
    let config = SeedConfig::load(&dir.path().join("seed.toml")).unwrap();
    let script = generate(&config).unwrap();

    assert_eq!(
        tables_in_order(&script),
        vec![
            "sports",
            "modules",
            "lessons",
            "items",
            "item_variants",
            "lessons",
            "items",
            "item_variants",
        ]
    );

    assert!(script.contains("-- Lesson 1: The Pitch"));
    assert!(script.contains("-- Lesson 2: Offside"));

    let lesson_values: Vec<&str> = script
        .lines()
        .filter(|line| line.starts_with("VALUES ('00000001-"))
        .collect();
    assert_eq!(lesson_values.len(), 2);
    assert!(lesson_values[0].contains(", 1, 5, 25, false, now(), now())"));
    assert!(lesson_values[1].contains(", 2, 5, 25, true, now(), now())"));
}

#[test]
fn test_generation_is_byte_identical_across_runs() {
    let dir = two_fragment_workspace();
    let config = SeedConfig::load(&dir.path().join("seed.toml")).unwrap();

    let first = generate(&config).unwrap();
    let second = generate(&config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_fragment_aborts_generation() {
    let dir = two_fragment_workspace();
    fs::remove_file(dir.path().join("part2.json")).unwrap();

    let config = SeedConfig::load(&dir.path().join("seed.toml")).unwrap();
    let err = generate(&config).unwrap_err();
    assert!(format!("{:#}", err).contains("part2.json"));
}

#[test]
fn test_malformed_lesson_aborts_with_location() {
    let dir = two_fragment_workspace();
    let mut broken = lesson("Broken", "?");
    broken.as_object_mut().unwrap().remove("title");
    write_json(
        dir.path(),
        "part2.json",
        json!({ "additional_lessons": [lesson("Fine", "?"), broken] }),
    );

    let config = SeedConfig::load(&dir.path().join("seed.toml")).unwrap();
    let message = format!("{:#}", generate(&config).unwrap_err());
    assert!(message.contains("lesson 2"), "{}", message);
    assert!(message.contains("part2.json"), "{}", message);
    assert!(message.contains("title"), "{}", message);
}

#[test]
fn test_custom_target_keys_are_used() {
    let dir = two_fragment_workspace();
    let mut config = SeedConfig::load(&dir.path().join("seed.toml")).unwrap();
    config.module.id = "33333333-3333-3333-3333-333333333333".parse().unwrap();
    config.author_expr = "'44444444-4444-4444-4444-444444444444'".to_string();

    let script = generate(&config).unwrap();
    assert!(script.contains("VALUES ('00000001-0000-0000-0000-000000000001', '33333333-3333-3333-3333-333333333333'"));
    assert!(script.contains("'live', '44444444-4444-4444-4444-444444444444', now(), now())"));
    assert!(!script.contains("SELECT id FROM users"));
}
