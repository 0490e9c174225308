use crate::ids::EntityKind;
use thiserror::Error;

/// Errors raised by the seed generator itself, as opposed to I/O or
/// parse failures which are carried through `anyhow` with context.
#[derive(Error, Debug)]
pub enum SeedError {
    /// A position does not fit the two-digit segment reserved for it.
    #[error("{kind} position {position} exceeds the maximum of {max}")]
    PositionOverflow {
        kind: EntityKind,
        position: usize,
        max: usize,
    },

    /// The fragment document has nothing at the configured pointer.
    #[error("fragment '{fragment}' has no lesson list at '{pointer}'")]
    MissingSection { fragment: String, pointer: String },

    /// The value at the configured pointer is not an array.
    #[error("fragment '{fragment}': value at '{pointer}' is not a list of lessons")]
    NotALessonList { fragment: String, pointer: String },
}
