//! Target keys and content layout for a seeding run.
//!
//! The sport, module and author placeholder are fixed rows that already exist
//! in the target database, so they are configuration rather than content.

use crate::content::JsonFragment;
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub sport: SportConfig,
    pub module: ModuleConfig,
    /// SQL expression evaluated by the database to pick an item author.
    pub author_expr: String,
    pub fragments: Vec<FragmentConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SportConfig {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    #[serde(default = "default_order")]
    pub order_index: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModuleConfig {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(default = "default_order")]
    pub order_index: i32,
    #[serde(default = "default_order")]
    pub min_level: i32,
    #[serde(default = "default_max_level")]
    pub max_level: i32,
    #[serde(default)]
    pub xp_reward: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FragmentConfig {
    pub path: PathBuf,
    /// JSON pointer to the lesson array inside the fragment.
    pub pointer: String,
}

fn default_order() -> i32 {
    1
}

fn default_max_level() -> i32 {
    2
}

impl Default for SportConfig {
    fn default() -> Self {
        SportConfig {
            id: Uuid::from_u128(0x0105433b_5bdd_4093_b6b1_157a0c3c515e),
            slug: "football".to_string(),
            name: "Football".to_string(),
            order_index: default_order(),
        }
    }
}

impl Default for ModuleConfig {
    fn default() -> Self {
        ModuleConfig {
            id: Uuid::from_u128(0x11111111_1111_1111_1111_111111111111),
            title: "Football Basics".to_string(),
            description: Some("Master the fundamentals of football".to_string()),
            order_index: default_order(),
            min_level: default_order(),
            max_level: default_max_level(),
            xp_reward: 0,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        let fragment = |path: &str, pointer: &str| FragmentConfig {
            path: PathBuf::from(path),
            pointer: pointer.to_string(),
        };

        SeedConfig {
            sport: SportConfig::default(),
            module: ModuleConfig::default(),
            author_expr: "(SELECT id FROM users LIMIT 1)".to_string(),
            fragments: vec![
                fragment("content/module1_basics.json", "/module/lessons"),
                fragment("content/module1_basics_part2.json", "/additional_lessons"),
                fragment("content/module1_basics_part3.json", "/final_lessons"),
            ],
        }
    }
}

impl SeedConfig {
    /// Parses a TOML config. Missing top-level tables fall back to defaults.
    pub fn from_toml(source: &str) -> anyhow::Result<Self> {
        toml::from_str(source).context("Failed to parse seed configuration")
    }

    /// Reads a TOML config file, resolving relative fragment paths against
    /// the file's directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let mut config = Self::from_toml(&raw)
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;

        if let Some(base) = path.parent() {
            for fragment in &mut config.fragments {
                if fragment.path.is_relative() {
                    fragment.path = base.join(&fragment.path);
                }
            }
        }

        Ok(config)
    }

    pub fn json_fragments(&self) -> Vec<JsonFragment> {
        self.fragments
            .iter()
            .map(|f| JsonFragment::new(f.path.clone(), f.pointer.clone()))
            .collect()
    }
}
