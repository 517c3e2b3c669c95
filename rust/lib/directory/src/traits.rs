use async_trait::async_trait;

use crate::error::DirectoryError;

/// A single record as stored by the directory: a flat JSON object.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Directory is the user-record store consulted by business operations.
///
/// Every call may cross the network. Implementations never retry; a failure
/// is returned to the caller as-is. Filters are column equality and
/// compare the string form of scalar values, so `("id", "7")` matches a
/// numeric `7`.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Insert a row and return it as stored (with generated `id`).
    async fn insert(&self, fields: Row) -> Result<Row, DirectoryError>;

    /// Select all rows matching every filter. An empty filter list selects all rows.
    async fn select_by(&self, filters: &[(&str, &str)]) -> Result<Vec<Row>, DirectoryError>;

    /// Update the row with the given id. Returns `None` when no row matched.
    async fn update(&self, id: &str, fields: Row) -> Result<Option<Row>, DirectoryError>;

    /// Delete the row with the given id. Returns `false` when no row matched.
    async fn delete(&self, id: &str) -> Result<bool, DirectoryError>;
}

/// Compare a stored scalar against a filter value by string form.
pub fn scalar_matches(value: &serde_json::Value, expected: &str) -> bool {
    match value {
        serde_json::Value::String(s) => s == expected,
        serde_json::Value::Number(n) => n.to_string() == expected,
        serde_json::Value::Bool(b) => b.to_string() == expected,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_ids_match_their_string_form() {
        assert!(scalar_matches(&json!(7), "7"));
        assert!(scalar_matches(&json!("7"), "7"));
        assert!(!scalar_matches(&json!(70), "7"));
    }

    #[test]
    fn test_null_and_nested_values_never_match() {
        assert!(!scalar_matches(&json!(null), "null"));
        assert!(!scalar_matches(&json!({"a": 1}), "{\"a\":1}"));
        assert!(!scalar_matches(&json!([1]), "[1]"));
    }
}
