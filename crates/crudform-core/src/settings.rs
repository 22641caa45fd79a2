//! Settings for crudform-rs.
//!
//! [`Settings`] holds process-level options (debug mode, log level) and the
//! default [`CrudConfig`] used by CRUD controllers and cards.

use serde::{Deserialize, Serialize};

use crate::error::{CrudError, CrudResult};

/// Options for a CRUD controller and the cards it opens.
///
/// Every text has a sensible default; unset optional headings are derived
/// from the model's title at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrudConfig {
    /// Name of the field that uniquely identifies an object. Empty means
    /// "not configured"; controllers refuse to start without a valid one.
    pub id_field: String,
    /// Label shown before an identifier. Derived from the id field's title
    /// when unset.
    pub id_label: Option<String>,
    /// Text shown when the table has no rows.
    pub no_data_label: String,
    /// Label of the table's search input.
    pub search_input_label: Option<String>,
    /// Heading shown above the table.
    pub heading: Option<String>,
    /// Caption of the "add" action.
    pub add_button_text: String,
    /// Caption of the "delete selected" action.
    pub delete_button_text: String,
    /// Heading of the dialog that creates a new item.
    pub new_item_dialog_heading: Option<String>,
    /// Heading of the dialog that edits an existing item.
    pub update_item_dialog_heading: Option<String>,
    /// Fields hidden from cards and tables in addition to those the model
    /// itself excludes.
    pub additional_exclude: Vec<String>,
    /// Number of columns of a card. `None` derives it from the field count.
    pub column_count: Option<usize>,
    /// Whether the table is shown as soon as the controller is created.
    pub display_on_init: bool,
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            id_field: String::new(),
            id_label: None,
            no_data_label: "No data given".to_string(),
            search_input_label: None,
            heading: None,
            add_button_text: "Add new item".to_string(),
            delete_button_text: "Delete selected items".to_string(),
            new_item_dialog_heading: None,
            update_item_dialog_heading: None,
            additional_exclude: Vec::new(),
            column_count: None,
            display_on_init: true,
        }
    }
}

impl CrudConfig {
    /// Creates a config with the given identifier field and defaults otherwise.
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            ..Self::default()
        }
    }

    /// Sets the fields excluded in addition to the model's own exclusions.
    #[must_use]
    pub fn additional_exclude(mut self, fields: &[&str]) -> Self {
        self.additional_exclude = fields.iter().map(ToString::to_string).collect();
        self
    }

    /// Sets the heading.
    #[must_use]
    pub fn heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    /// Sets a fixed column count for cards.
    #[must_use]
    pub const fn column_count(mut self, count: usize) -> Self {
        self.column_count = Some(count);
        self
    }

    /// Returns `true` if `field` is listed in [`additional_exclude`](Self::additional_exclude).
    pub fn excludes(&self, field: &str) -> bool {
        self.additional_exclude.iter().any(|f| f == field)
    }

    /// Updates individual options from a JSON object.
    ///
    /// Unknown keys and values of the wrong type are rejected; on error the
    /// config is left unchanged.
    pub fn update(&mut self, data: &serde_json::Map<String, serde_json::Value>) -> CrudResult<()> {
        let mut current = serde_json::to_value(&*self)?;
        let serde_json::Value::Object(fields) = &mut current else {
            return Err(CrudError::ConfigurationError(
                "CrudConfig did not serialize to an object".into(),
            ));
        };
        for (key, value) in data {
            if !fields.contains_key(key) {
                return Err(CrudError::ConfigurationError(format!(
                    "Unknown CRUD option '{key}'"
                )));
            }
            fields.insert(key.clone(), value.clone());
        }
        *self = serde_json::from_value(current).map_err(|e| {
            CrudError::ConfigurationError(format!("Invalid CRUD option value: {e}"))
        })?;
        Ok(())
    }
}

/// Process-level settings.
///
/// Use [`Settings::default()`] for sensible defaults, or load them with
/// [`settings_loader`](crate::settings_loader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Debug mode switches logging to a pretty, human-readable format.
    pub debug: bool,
    /// Log filter directive (e.g. "info", "crudform_forms=debug").
    pub log_level: String,
    /// Default CRUD options.
    pub crud: CrudConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            crud: CrudConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.log_level, "info");
        assert_eq!(s.crud, CrudConfig::default());
    }

    #[test]
    fn test_default_crud_config() {
        let c = CrudConfig::default();
        assert!(c.id_field.is_empty());
        assert_eq!(c.no_data_label, "No data given");
        assert_eq!(c.add_button_text, "Add new item");
        assert_eq!(c.delete_button_text, "Delete selected items");
        assert!(c.additional_exclude.is_empty());
        assert!(c.column_count.is_none());
        assert!(c.display_on_init);
    }

    #[test]
    fn test_crud_config_builders() {
        let c = CrudConfig::new("name")
            .additional_exclude(&["secret"])
            .heading("Heroes")
            .column_count(2);
        assert_eq!(c.id_field, "name");
        assert!(c.excludes("secret"));
        assert!(!c.excludes("name"));
        assert_eq!(c.heading.as_deref(), Some("Heroes"));
        assert_eq!(c.column_count, Some(2));
    }

    #[test]
    fn test_crud_config_update() {
        let mut c = CrudConfig::new("id");
        let data = json!({"heading": "Items", "column_count": 3});
        c.update(data.as_object().unwrap()).unwrap();
        assert_eq!(c.heading.as_deref(), Some("Items"));
        assert_eq!(c.column_count, Some(3));
        assert_eq!(c.id_field, "id");
    }

    #[test]
    fn test_crud_config_update_unknown_key() {
        let mut c = CrudConfig::new("id");
        let data = json!({"colour": "red"});
        let err = c.update(data.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, CrudError::ConfigurationError(_)));
        assert_eq!(c, CrudConfig::new("id"));
    }

    #[test]
    fn test_crud_config_update_wrong_type_leaves_config() {
        let mut c = CrudConfig::new("id");
        let data = json!({"heading": "ok", "column_count": "many"});
        assert!(c.update(data.as_object().unwrap()).is_err());
        assert!(c.heading.is_none());
    }
}
