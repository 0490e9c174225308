//! Generates an idempotent SQL seed script for a module's lessons, quiz
//! items and item variants from JSON content fragments.

pub mod apply;
pub mod config;
pub mod content;
pub mod emitter;
pub mod error;
pub mod ids;
pub mod literal;

pub use config::SeedConfig;
pub use content::{aggregate, LessonRecord, LessonSource};
pub use emitter::{build_batch, emit, SeedBatch};
pub use error::SeedError;

/// Loads every configured fragment and renders the complete seed script.
pub fn generate(config: &SeedConfig) -> anyhow::Result<String> {
    let lessons = aggregate(&config.json_fragments())?;
    emit(config, &lessons)
}
