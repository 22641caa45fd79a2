//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (deep-merged over the defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `CRUDFORM_DEBUG` | `debug` |
//! | `CRUDFORM_LOG_LEVEL` | `log_level` |
//! | `CRUDFORM_ID_FIELD` | `crud.id_field` |
//! | `CRUDFORM_HEADING` | `crud.heading` |
//! | `CRUDFORM_ADDITIONAL_EXCLUDE` | `crud.additional_exclude` (comma-separated) |
//! | `CRUDFORM_COLUMN_COUNT` | `crud.column_count` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use crudform_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file("crudform.toml").unwrap();
//! let settings = settings_loader::from_json_file_with_env("crudform.json").unwrap();
//! ```

use std::fmt;
use std::path::Path;

use crate::error::CrudError;
use crate::settings::Settings;

/// A settings file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    /// Guesses the format from a file extension: `.json` is JSON, anything
    /// else TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }

    fn parse(self, text: &str) -> Result<serde_json::Value, CrudError> {
        let parsed = match self {
            Self::Toml => toml::from_str::<serde_json::Value>(text).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        };
        parsed.map_err(|e| CrudError::ConfigurationError(format!("Failed to parse {self}: {e}")))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
        })
    }
}

/// Parses settings in `format`. Options not present keep their default
/// values, including individual keys of the nested `crud` table.
pub fn from_str(format: Format, text: &str) -> Result<Settings, CrudError> {
    let mut merged = serde_json::to_value(Settings::default())?;
    overlay(&mut merged, format.parse(text)?);
    serde_json::from_value(merged).map_err(|e| {
        CrudError::ConfigurationError(format!("Invalid settings in {format}: {e}"))
    })
}

/// Loads settings from a file, picking the format from its extension.
pub fn from_file(path: impl AsRef<Path>) -> Result<Settings, CrudError> {
    let path = path.as_ref();
    load_file(path, Format::from_path(path))
}

/// Loads settings from a TOML string.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, CrudError> {
    from_str(Format::Toml, toml_str)
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, CrudError> {
    load_file(path.as_ref(), Format::Toml)
}

/// Loads settings from a TOML file, then applies environment overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, CrudError> {
    from_toml_file(path).map(with_env)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> Result<Settings, CrudError> {
    from_str(Format::Json, json_str)
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, CrudError> {
    load_file(path.as_ref(), Format::Json)
}

/// Loads settings from a JSON file, then applies environment overrides.
pub fn from_json_file_with_env(path: impl AsRef<Path>) -> Result<Settings, CrudError> {
    from_json_file(path).map(with_env)
}

/// Returns the defaults with environment overrides applied.
pub fn from_env() -> Settings {
    with_env(Settings::default())
}

/// Applies `CRUDFORM_*` environment variables to `settings`.
///
/// An unparseable column count is ignored with a warning.
pub fn apply_env_overrides(settings: &mut Settings) {
    let var = |name: &str| std::env::var(name).ok();

    if let Some(val) = var("CRUDFORM_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }
    if let Some(val) = var("CRUDFORM_LOG_LEVEL") {
        settings.log_level = val;
    }
    if let Some(val) = var("CRUDFORM_ID_FIELD") {
        settings.crud.id_field = val;
    }
    if let Some(val) = var("CRUDFORM_HEADING") {
        settings.crud.heading = Some(val);
    }
    if let Some(val) = var("CRUDFORM_ADDITIONAL_EXCLUDE") {
        settings.crud.additional_exclude = val
            .split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(String::from)
            .collect();
    }
    if let Some(val) = var("CRUDFORM_COLUMN_COUNT") {
        match val.parse::<usize>() {
            Ok(count) => settings.crud.column_count = Some(count),
            Err(_) => tracing::warn!(value = %val, "ignoring invalid CRUDFORM_COLUMN_COUNT"),
        }
    }
}

fn with_env(mut settings: Settings) -> Settings {
    apply_env_overrides(&mut settings);
    settings
}

fn load_file(path: &Path, format: Format) -> Result<Settings, CrudError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CrudError::ConfigurationError(format!(
            "Cannot read {format} file '{}': {e}",
            path.display()
        ))
    })?;
    tracing::debug!(path = %path.display(), %format, "loading settings");
    from_str(format, &text)
}

/// Writes `layer` over `target`. Objects merge key by key; any other value
/// replaces what was there.
fn overlay(target: &mut serde_json::Value, layer: serde_json::Value) {
    match (target, layer) {
        (serde_json::Value::Object(target), serde_json::Value::Object(layer)) => {
            for (key, value) in layer {
                match target.get_mut(&key) {
                    Some(existing) => overlay(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, layer) => *target = layer,
    }
}
