//! The record table.
//!
//! A [`Table`] is the display form of the stored records: one [`Column`] per
//! visible field except the identifier, and one [`Row`] per record with the
//! short display form of every field. Rows are rebuilt from the backend after
//! every action.

use crudform_core::settings::CrudConfig;
use crudform_core::utils::text::escape_html;
use crudform_model::{ModelSchema, Record, Value};
use indexmap::IndexMap;
use serde::Serialize;

/// Cell text of null, empty-string and empty-collection values.
pub const NO_VALUE_SET: &str = "No value set";

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Field name.
    pub name: String,
    /// Header text: the field title, else its name.
    pub label: String,
    /// Whether the host lets the user sort by this column.
    pub sortable: bool,
}

/// A table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// Identifier of the record.
    pub id: Value,
    /// Row key and caption: the identifier label followed by the escaped
    /// identifier in bold.
    pub obj_id: String,
    /// Display text per field.
    pub cells: IndexMap<String, String>,
}

impl Row {
    fn matches(&self, needle: &str) -> bool {
        self.cells
            .values()
            .any(|cell| cell.to_lowercase().contains(needle))
    }
}

/// Columns and rows of the record table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Builds the table of `records`.
    pub fn build(
        schema: &ModelSchema,
        records: &[Record],
        config: &CrudConfig,
        id_label: &str,
    ) -> Self {
        let columns = schema
            .fields()
            .iter()
            .filter(|f| !f.is_excluded() && !config.excludes(&f.name) && f.name != config.id_field)
            .map(|f| Column {
                name: f.name.clone(),
                label: f.title.clone().unwrap_or_else(|| f.name.clone()),
                sortable: true,
            })
            .collect();

        let rows = records
            .iter()
            .map(|record| {
                let id = record.value(&config.id_field);
                let cells = record
                    .display_dump()
                    .into_iter()
                    .map(|(name, text)| {
                        let blank = record.get(&name).map_or(true, Value::is_blank);
                        (name, if blank { NO_VALUE_SET.to_string() } else { text })
                    })
                    .collect();
                Row {
                    obj_id: format!("{id_label} <b>{}</b>", escape_html(&id.to_string())),
                    id,
                    cells,
                }
            })
            .collect();

        Self { columns, rows }
    }

    /// Returns the rows whose cells contain `query`, ignoring case. An empty
    /// query matches every row.
    pub fn search(&self, query: &str) -> Vec<&Row> {
        let needle = query.trim().to_lowercase();
        self.rows
            .iter()
            .filter(|row| needle.is_empty() || row.matches(&needle))
            .collect()
    }

    /// Returns the row of the record with identifier `id`.
    pub fn row(&self, id: &Value) -> Option<&Row> {
        self.rows.iter().find(|row| row.id == *id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
