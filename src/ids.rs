//! Positional identifiers for lessons, items and item variants.
//!
//! Every identifier is a UUID-shaped string whose last segment (and, for
//! items and variants, the tail of the first segment) holds zero-padded
//! decimal positions. The leading digit of the first segment separates the
//! namespaces:
//!
//! ```text
//! lesson   00000001-0000-0000-0000-0000000000LL
//! item     100000LL-0000-0000-0000-0000000000II
//! variant  200000LL-0000-0000-0000-0000000000II
//! ```
//!
//! Only positions feed the derivation, so editing a title or prompt never
//! changes an identity.

use crate::error::SeedError;
use std::fmt;

/// Largest position the two-digit segment can hold.
pub const MAX_POSITION: usize = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Lesson,
    Item,
    Variant,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Lesson => "lesson",
            EntityKind::Item => "item",
            EntityKind::Variant => "variant",
        };
        f.write_str(name)
    }
}

fn checked(kind: EntityKind, position: usize) -> Result<usize, SeedError> {
    if position > MAX_POSITION {
        return Err(SeedError::PositionOverflow {
            kind,
            position,
            max: MAX_POSITION,
        });
    }
    Ok(position)
}

/// Identifier of the lesson at 1-based `lesson` in the aggregated sequence.
pub fn lesson_id(lesson: usize) -> Result<String, SeedError> {
    let lesson = checked(EntityKind::Lesson, lesson)?;
    Ok(format!("00000001-0000-0000-0000-0000000000{:02}", lesson))
}

/// Identifier of item `item` inside lesson `lesson`.
pub fn item_id(lesson: usize, item: usize) -> Result<String, SeedError> {
    paired(EntityKind::Item, 1, lesson, item)
}

/// Identifier of the variant belonging to item `item` inside lesson `lesson`.
pub fn variant_id(lesson: usize, item: usize) -> Result<String, SeedError> {
    paired(EntityKind::Variant, 2, lesson, item)
}

fn paired(kind: EntityKind, namespace: u8, lesson: usize, item: usize) -> Result<String, SeedError> {
    // The lesson half overflowing is still reported against the entity being derived.
    let lesson = checked(kind, lesson)?;
    let item = checked(kind, item)?;
    Ok(format!(
        "{}00000{:02}-0000-0000-0000-0000000000{:02}",
        namespace, lesson, item
    ))
}
