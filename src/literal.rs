//! SQL literal encoding for values embedded in generated statements.

use serde::Serialize;

/// The SQL null marker.
pub const NULL: &str = "NULL";

/// Quotes `text` as a SQL string literal, doubling every embedded quote.
pub fn text(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Like [`text`], but `None` becomes `NULL`.
pub fn opt_text(value: Option<&str>) -> String {
    match value {
        Some(value) => text(value),
        None => NULL.to_string(),
    }
}

/// Serializes `value` to compact JSON and quotes it as a `jsonb` literal.
pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let encoded = serde_json::to_string(value)?;
    Ok(format!("{}::jsonb", text(&encoded)))
}

/// Renders a boolean the way Postgres spells it.
pub fn boolean(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
