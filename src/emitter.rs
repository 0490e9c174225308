//! Builds the ordered upsert batch for a module's lessons.
//!
//! The batch is assembled in memory first ([`build_batch`]) and only then
//! rendered to text, so a failure part-way through never produces output.
//!
//! Conflict clauses re-assert authored content only. Lock state, ordering,
//! versions, lifecycle status, authorship and audit timestamps are written on
//! insert and left alone on every later run.

use crate::config::SeedConfig;
use crate::content::{ItemRecord, LessonRecord};
use crate::ids;
use crate::literal;
use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::info;

pub const ITEM_TYPE: &str = "mcq";
pub const ITEM_STATUS: &str = "live";
pub const VARIANT_VERSION: i32 = 1;

const NOW: &str = "now()";

pub const SPORT_UPDATES: &[&str] = &["name"];
pub const MODULE_UPDATES: &[&str] = &["title", "description"];
pub const LESSON_UPDATES: &[&str] = &["title", "description", "est_minutes", "xp_award"];
pub const ITEM_UPDATES: &[&str] = &["base_prompt", "answer_schema_json"];
pub const VARIANT_UPDATES: &[&str] = &[
    "prompt_richtext",
    "options_json",
    "correct_answer_json",
    "explanation_richtext",
];

/// One `INSERT ... ON CONFLICT ... DO UPDATE` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Upsert {
    pub table: &'static str,
    /// Column names paired with already-encoded SQL expressions.
    pub values: Vec<(&'static str, String)>,
    pub conflict: &'static [&'static str],
    pub updates: &'static [&'static str],
}

impl Upsert {
    fn new(
        table: &'static str,
        values: Vec<(&'static str, String)>,
        conflict: &'static [&'static str],
        updates: &'static [&'static str],
    ) -> Self {
        Upsert { table, values, conflict, updates }
    }

    /// The encoded value written for `column`, if any.
    pub fn value(&self, column: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn render(&self, indent: &str) -> String {
        let columns: Vec<&str> = self.values.iter().map(|(column, _)| *column).collect();
        let values: Vec<&str> = self.values.iter().map(|(_, value)| value.as_str()).collect();

        let action = if self.updates.is_empty() {
            "DO NOTHING".to_string()
        } else {
            let assignments: Vec<String> = self
                .updates
                .iter()
                .map(|column| format!("{0} = EXCLUDED.{0}", column))
                .collect();
            format!("DO UPDATE SET {}", assignments.join(", "))
        };

        format!(
            "{indent}INSERT INTO {} ({})\n{indent}VALUES ({})\n{indent}ON CONFLICT ({}) {};\n",
            self.table,
            columns.join(", "),
            values.join(", "),
            self.conflict.join(", "),
            action,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemBlock {
    pub position: usize,
    pub item: Upsert,
    pub variant: Upsert,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LessonBlock {
    pub position: usize,
    pub title: String,
    pub lesson: Upsert,
    pub items: Vec<ItemBlock>,
}

/// The whole seed batch, parents always ahead of their children.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedBatch {
    pub sport_name: String,
    pub module_title: String,
    pub sport: Upsert,
    pub module: Upsert,
    pub lessons: Vec<LessonBlock>,
}

#[derive(Serialize)]
struct AnswerSchema<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    options: &'a [Value],
    correct: usize,
}

impl SeedBatch {
    /// Every statement in emission order.
    pub fn statements(&self) -> Vec<&Upsert> {
        let mut all = vec![&self.sport, &self.module];
        for lesson in &self.lessons {
            all.push(&lesson.lesson);
            for item in &lesson.items {
                all.push(&item.item);
                all.push(&item.variant);
            }
        }
        all
    }

    pub fn item_count(&self) -> usize {
        self.lessons.iter().map(|lesson| lesson.items.len()).sum()
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SeedBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "-- Seed script for module '{}' ({} lessons)",
            single_line(&self.module_title),
            self.lessons.len()
        )?;
        writeln!(f, "-- Safe to re-run: every statement is an upsert")?;
        writeln!(f)?;

        writeln!(f, "-- 1. Ensure sport '{}' exists", single_line(&self.sport_name))?;
        f.write_str(&self.sport.render(""))?;
        writeln!(f)?;

        writeln!(f, "-- 2. Ensure module '{}' exists", single_line(&self.module_title))?;
        f.write_str(&self.module.render(""))?;
        writeln!(f)?;

        writeln!(f, "-- 3. Insert lessons and items")?;
        for lesson in &self.lessons {
            writeln!(f, "-- Lesson {}: {}", lesson.position, single_line(&lesson.title))?;
            f.write_str(&lesson.lesson.render(""))?;

            for item in &lesson.items {
                writeln!(f, "  -- Item {}", item.position)?;
                f.write_str(&item.item.render("  "))?;
                f.write_str(&item.variant.render("  "))?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Keeps titles from breaking out of a `--` comment.
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

fn sport_upsert(config: &SeedConfig) -> Upsert {
    let sport = &config.sport;
    Upsert::new(
        "sports",
        vec![
            ("id", literal::text(&sport.id.to_string())),
            ("slug", literal::text(&sport.slug)),
            ("name", literal::text(&sport.name)),
            ("is_active", literal::boolean(true).to_string()),
            ("order_index", sport.order_index.to_string()),
            ("created_at", NOW.to_string()),
            ("updated_at", NOW.to_string()),
        ],
        &["slug"],
        SPORT_UPDATES,
    )
}

fn module_upsert(config: &SeedConfig) -> Upsert {
    let module = &config.module;
    Upsert::new(
        "modules",
        vec![
            ("id", literal::text(&module.id.to_string())),
            ("sport_id", literal::text(&config.sport.id.to_string())),
            ("title", literal::text(&module.title)),
            ("description", literal::opt_text(module.description.as_deref())),
            ("order_index", module.order_index.to_string()),
            ("min_level", module.min_level.to_string()),
            ("max_level", module.max_level.to_string()),
            ("xp_reward", module.xp_reward.to_string()),
            ("created_at", NOW.to_string()),
            ("updated_at", NOW.to_string()),
        ],
        &["id"],
        MODULE_UPDATES,
    )
}

fn lesson_upsert(config: &SeedConfig, lesson: &LessonRecord, position: usize, lesson_id: &str) -> Upsert {
    Upsert::new(
        "lessons",
        vec![
            ("id", literal::text(lesson_id)),
            ("module_id", literal::text(&config.module.id.to_string())),
            ("title", literal::text(&lesson.title)),
            ("description", literal::opt_text(lesson.description.as_deref())),
            ("order_index", position.to_string()),
            ("est_minutes", lesson.est_minutes.to_string()),
            ("xp_award", lesson.xp_award.to_string()),
            ("is_locked", literal::boolean(position != 1).to_string()),
            ("created_at", NOW.to_string()),
            ("updated_at", NOW.to_string()),
        ],
        &["id"],
        LESSON_UPDATES,
    )
}

fn item_block(
    config: &SeedConfig,
    item: &ItemRecord,
    lesson_position: usize,
    position: usize,
    lesson_id: &str,
) -> anyhow::Result<ItemBlock> {
    let item_id = ids::item_id(lesson_position, position)?;
    let variant_id = ids::variant_id(lesson_position, position)?;
    let variant = &item.variant;

    let schema = AnswerSchema {
        kind: ITEM_TYPE,
        options: &variant.options_json,
        correct: variant.correct_answer_json.index,
    };

    let item_upsert = Upsert::new(
        "items",
        vec![
            ("id", literal::text(&item_id)),
            ("lesson_id", literal::text(lesson_id)),
            ("type", literal::text(ITEM_TYPE)),
            ("base_prompt", literal::text(&item.base_prompt)),
            ("answer_schema_json", literal::json(&schema)?),
            ("difficulty", item.difficulty.to_string()),
            ("status", literal::text(ITEM_STATUS)),
            ("author_id", config.author_expr.clone()),
            ("created_at", NOW.to_string()),
            ("updated_at", NOW.to_string()),
        ],
        &["id"],
        ITEM_UPDATES,
    );

    let variant_upsert = Upsert::new(
        "item_variants",
        vec![
            ("id", literal::text(&variant_id)),
            ("item_id", literal::text(&item_id)),
            ("version", VARIANT_VERSION.to_string()),
            ("prompt_richtext", literal::text(&variant.prompt_richtext)),
            ("options_json", literal::json(&variant.options_json)?),
            ("correct_answer_json", literal::json(&variant.correct_answer_json)?),
            ("explanation_richtext", literal::opt_text(variant.explanation_richtext.as_deref())),
            ("active", literal::boolean(true).to_string()),
            ("created_at", NOW.to_string()),
            ("updated_at", NOW.to_string()),
        ],
        &["item_id", "version"],
        VARIANT_UPDATES,
    );

    Ok(ItemBlock {
        position,
        item: item_upsert,
        variant: variant_upsert,
    })
}

/// Builds the full batch for `lessons`, numbering them from 1 in order.
pub fn build_batch(config: &SeedConfig, lessons: &[LessonRecord]) -> anyhow::Result<SeedBatch> {
    let mut blocks = Vec::with_capacity(lessons.len());

    for (index, lesson) in lessons.iter().enumerate() {
        let position = index + 1;
        let lesson_id = ids::lesson_id(position)?;

        let items = lesson
            .items
            .iter()
            .enumerate()
            .map(|(j, item)| item_block(config, item, position, j + 1, &lesson_id))
            .collect::<anyhow::Result<Vec<_>>>()
            .with_context(|| format!("Failed to build items for lesson {} ('{}')", position, lesson.title))?;

        blocks.push(LessonBlock {
            position,
            title: lesson.title.clone(),
            lesson: lesson_upsert(config, lesson, position, &lesson_id),
            items,
        });
    }

    let batch = SeedBatch {
        sport_name: config.sport.name.clone(),
        module_title: config.module.title.clone(),
        sport: sport_upsert(config),
        module: module_upsert(config),
        lessons: blocks,
    };

    info!(
        "Built seed batch: {} lessons, {} items, {} statements",
        batch.lessons.len(),
        batch.item_count(),
        batch.statements().len()
    );

    Ok(batch)
}

/// Builds and renders the batch in one step.
pub fn emit(config: &SeedConfig, lessons: &[LessonRecord]) -> anyhow::Result<String> {
    Ok(build_batch(config, lessons)?.render())
}
