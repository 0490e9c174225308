use crate::error::SeedError;
use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LessonRecord {
    pub title: String,
    #[serde(deserialize_with = "nullable")]
    pub description: Option<String>,
    pub est_minutes: i32,
    pub xp_award: i32,
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemRecord {
    pub base_prompt: String,
    pub difficulty: i32,
    pub variant: VariantRecord,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VariantRecord {
    pub prompt_richtext: String,
    pub options_json: Vec<Value>,
    pub correct_answer_json: CorrectAnswer,
    #[serde(deserialize_with = "nullable")]
    pub explanation_richtext: Option<String>,
}

/// Index of the correct option of a single-choice item. Any other keys the
/// author put in the object are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectAnswer {
    pub index: usize,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CorrectAnswer {
    pub fn new(index: usize) -> Self {
        CorrectAnswer { index, extra: Map::new() }
    }
}

/// Accepts `null` but, unlike a bare `Option` field, rejects a missing key.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// Anything that can hand over an ordered list of lessons.
pub trait LessonSource {
    /// Human-readable name used in logs and error messages.
    fn name(&self) -> String;

    fn load_lessons(&self) -> anyhow::Result<Vec<LessonRecord>>;
}

/// A JSON content file whose lesson list sits at `pointer` (RFC 6901).
#[derive(Debug, Clone)]
pub struct JsonFragment {
    pub path: PathBuf,
    pub pointer: String,
}

impl JsonFragment {
    pub fn new(path: impl Into<PathBuf>, pointer: impl Into<String>) -> Self {
        JsonFragment {
            path: path.into(),
            pointer: pointer.into(),
        }
    }
}

impl LessonSource for JsonFragment {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn load_lessons(&self) -> anyhow::Result<Vec<LessonRecord>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open content fragment '{}'", self.name()))?;
        let reader = BufReader::new(file);
        let document: Value = serde_json::from_reader(reader)
            .with_context(|| format!("Fragment '{}' is not valid JSON", self.name()))?;

        lessons_at(document, &self.name(), &self.pointer)
    }
}

/// Extracts and parses the lesson list at `pointer` inside `document`.
///
/// Records are parsed one at a time so a bad record is reported by its
/// 1-based position within the fragment.
pub fn lessons_at(mut document: Value, fragment: &str, pointer: &str) -> anyhow::Result<Vec<LessonRecord>> {
    let section = document
        .pointer_mut(pointer)
        .ok_or_else(|| SeedError::MissingSection {
            fragment: fragment.to_string(),
            pointer: pointer.to_string(),
        })?
        .take();

    let Value::Array(raw_lessons) = section else {
        return Err(SeedError::NotALessonList {
            fragment: fragment.to_string(),
            pointer: pointer.to_string(),
        }
        .into());
    };

    raw_lessons
        .into_iter()
        .enumerate()
        .map(|(n, raw)| {
            serde_json::from_value::<LessonRecord>(raw)
                .with_context(|| format!("Malformed lesson {} of fragment '{}'", n + 1, fragment))
        })
        .collect()
}

/// Loads every source in order and concatenates their lessons.
///
/// Any failing source aborts the whole aggregation: dropping a fragment
/// would shift the positions, and so the identities, of every later lesson.
pub fn aggregate<S: LessonSource>(sources: &[S]) -> anyhow::Result<Vec<LessonRecord>> {
    let mut lessons = Vec::new();

    for source in sources {
        let loaded = source
            .load_lessons()
            .with_context(|| format!("Could not load lessons from '{}'", source.name()))?;

        info!("Loaded {} lessons from '{}'", loaded.len(), source.name());
        for lesson in &loaded {
            debug!(title = %lesson.title, items = lesson.items.len(), "lesson");
        }
        lessons.extend(loaded);
    }

    Ok(lessons)
}
