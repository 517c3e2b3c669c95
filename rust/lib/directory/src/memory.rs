use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use accounts_core::now_rfc3339;

use crate::error::DirectoryError;
use crate::traits::{scalar_matches, Directory, Row};

/// MemoryDirectory keeps rows in a map keyed by a serial integer id, the
/// way a table with a serial primary key would.
///
/// Rows get `id`, `created_at` and `updated_at` stamped on insert. Columns
/// registered with [`MemoryDirectory::with_unique_column`] reject duplicate
/// values with [`DirectoryError::Conflict`].
pub struct MemoryDirectory {
    state: RwLock<State>,
    unique_columns: Vec<String>,
}

#[derive(Default)]
struct State {
    rows: BTreeMap<u64, Row>,
    next_id: u64,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
            unique_columns: Vec::new(),
        }
    }

    /// Enforce uniqueness of a column across rows.
    pub fn with_unique_column(mut self, column: &str) -> Self {
        self.unique_columns.push(column.to_string());
        self
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_unique(&self, rows: &BTreeMap<u64, Row>, fields: &Row, skip: Option<u64>) -> Result<(), DirectoryError> {
        for column in &self.unique_columns {
            let Some(value) = fields.get(column) else { continue };
            if value.is_null() {
                continue;
            }
            let taken = rows
                .iter()
                .filter(|(id, _)| Some(**id) != skip)
                .any(|(_, row)| row.get(column) == Some(value));
            if taken {
                return Err(DirectoryError::Conflict(format!(
                    "duplicate value for unique column '{}'",
                    column
                )));
            }
        }
        Ok(())
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Locate a row by its `id` column, matched the same way as `select_by`.
fn key_for(rows: &BTreeMap<u64, Row>, id: &str) -> Option<u64> {
    rows.iter()
        .find(|(_, row)| row.get("id").is_some_and(|v| scalar_matches(v, id)))
        .map(|(key, _)| *key)
}

fn poisoned<T>(_: T) -> DirectoryError {
    DirectoryError::Remote("directory lock poisoned".into())
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn insert(&self, mut fields: Row) -> Result<Row, DirectoryError> {
        let mut state = self.state.write().map_err(poisoned)?;
        self.check_unique(&state.rows, &fields, None)?;

        let id = state.next_id;
        state.next_id += 1;

        let now = now_rfc3339();
        fields.insert("id".into(), Value::from(id));
        fields.entry("created_at").or_insert_with(|| Value::String(now.clone()));
        fields.entry("updated_at").or_insert_with(|| Value::String(now));

        state.rows.insert(id, fields.clone());
        Ok(fields)
    }

    async fn select_by(&self, filters: &[(&str, &str)]) -> Result<Vec<Row>, DirectoryError> {
        let state = self.state.read().map_err(poisoned)?;
        let rows = state
            .rows
            .values()
            .filter(|row| {
                filters.iter().all(|(column, expected)| {
                    row.get(*column).is_some_and(|v| scalar_matches(v, expected))
                })
            })
            .cloned()
            .collect();
        Ok(rows)
    }

    async fn update(&self, id: &str, mut fields: Row) -> Result<Option<Row>, DirectoryError> {
        let mut state = self.state.write().map_err(poisoned)?;
        let Some(key) = key_for(&state.rows, id) else {
            return Ok(None);
        };
        fields.remove("id");
        self.check_unique(&state.rows, &fields, Some(key))?;

        let Some(row) = state.rows.get_mut(&key) else {
            return Ok(None);
        };
        for (column, value) in fields {
            row.insert(column, value);
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, DirectoryError> {
        let mut state = self.state.write().map_err(poisoned)?;
        let Some(key) = key_for(&state.rows, id) else {
            return Ok(false);
        };
        Ok(state.rows.remove(&key).is_some())
    }
}
