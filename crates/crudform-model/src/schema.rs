//! Model schemas.
//!
//! A [`ModelSchema`] is the declaration of an object type: its class name, an
//! optional title, its fields in declaration order, model-level validators
//! that see the whole object, and an optional summary function used for
//! one-line labels of nested objects.

use std::fmt;
use std::sync::Arc;

use crudform_core::error::{ErrorDetail, ValidationError};
use indexmap::IndexMap;

use crate::fields::FieldDescriptor;
use crate::placeholders::placeholder_for;
use crate::record::Record;
use crate::value::Value;

/// A validator over a whole object. The error string is reported with the
/// `Value error, ` prefix.
pub type ModelValidatorFn = Arc<dyn Fn(&Record) -> Result<(), String> + Send + Sync>;

/// A function producing a one-line summary of an object.
pub type SummaryFn = Arc<dyn Fn(&Record) -> String + Send + Sync>;

/// The declaration of an object type.
///
/// # Examples
///
/// ```
/// use crudform_model::{FieldDescriptor, ModelSchema, TypeTag, Value};
///
/// let schema = ModelSchema::new("Hero")
///     .title("A hero")
///     .field(FieldDescriptor::new("name", TypeTag::String))
///     .field(FieldDescriptor::new("level", TypeTag::Integer).default(1))
///     .build();
///
/// let hero = schema
///     .create([("name".to_string(), Value::from("Frodo"))].into_iter().collect())
///     .unwrap();
/// assert_eq!(hero.get("level"), Some(&Value::Int(1)));
/// ```
#[derive(Clone)]
pub struct ModelSchema {
    name: String,
    title: Option<String>,
    fields: Vec<FieldDescriptor>,
    validators: Vec<(String, ModelValidatorFn)>,
    summary: Option<SummaryFn>,
}

impl ModelSchema {
    /// Starts declaring an object type with the given class name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            fields: Vec::new(),
            validators: Vec::new(),
            summary: None,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Appends a field. A later field with the same name replaces the earlier one.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        if let Some(existing) = self.fields.iter_mut().find(|f| f.name == field.name) {
            *existing = field;
        } else {
            self.fields.push(field);
        }
        self
    }

    /// Adds a model-level validator.
    #[must_use]
    pub fn validator(
        mut self,
        name: impl Into<String>,
        check: impl Fn(&Record) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validators.push((name.into(), Arc::new(check)));
        self
    }

    /// Sets the summary function.
    #[must_use]
    pub fn summary(mut self, summary: impl Fn(&Record) -> String + Send + Sync + 'static) -> Self {
        self.summary = Some(Arc::new(summary));
        self
    }

    /// Finishes the declaration.
    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Returns the class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared title, if any.
    pub fn declared_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the title, or the class name when none was declared.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Returns all fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns `true` if a field with this name exists.
    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    /// Returns `true` if every field not excluded by the schema has a default.
    pub fn defaults_given(&self) -> bool {
        self.fields
            .iter()
            .filter(|f| !f.schema_excluded)
            .all(|f| f.default.is_some())
    }

    /// Builds an instance from defaults.
    ///
    /// Fails with a `missing` error for each required field.
    pub fn instantiate(self: &Arc<Self>) -> Result<Record, ValidationError> {
        self.create(IndexMap::new())
    }

    /// Builds and validates an instance from a map of field values.
    ///
    /// Missing fields take their defaults; keys that are not fields are
    /// ignored. All field errors are collected before failing. Model
    /// validators run once every field is valid.
    pub fn create(
        self: &Arc<Self>,
        mut data: IndexMap<String, Value>,
    ) -> Result<Record, ValidationError> {
        let mut values = IndexMap::with_capacity(self.fields.len());
        let mut errors = Vec::new();

        for field in &self.fields {
            match data.shift_remove(&field.name) {
                Some(value) => match field.validate_value(value) {
                    Ok(v) => {
                        values.insert(field.name.clone(), v);
                    }
                    Err(e) => errors.extend(e.errors),
                },
                None => match &field.default {
                    Some(default) => {
                        values.insert(field.name.clone(), default.clone());
                    }
                    None => {
                        errors.push(ErrorDetail::new("Field required", "missing").at(&field.name));
                    }
                },
            }
        }
        if !data.is_empty() {
            tracing::debug!(
                model = %self.name,
                ignored = ?data.keys().collect::<Vec<_>>(),
                "ignoring unknown keys"
            );
        }
        if !errors.is_empty() {
            return Err(ValidationError::from_details(errors));
        }

        let record = Record::from_parts(Arc::clone(self), values);
        self.run_validators(&record)?;
        Ok(record)
    }

    /// Builds an instance without validation, filling fields that have no
    /// default from the placeholder table.
    pub fn placeholder_instance(self: &Arc<Self>) -> Record {
        let values = self
            .fields
            .iter()
            .map(|f| {
                let value = f
                    .default
                    .clone()
                    .unwrap_or_else(|| placeholder_for(f.declared_type()));
                (f.name.clone(), value)
            })
            .collect();
        Record::from_parts(Arc::clone(self), values)
    }

    /// Runs the model-level validators against `record`.
    pub fn run_validators(&self, record: &Record) -> Result<(), ValidationError> {
        for (name, check) in &self.validators {
            if let Err(msg) = check(record) {
                tracing::debug!(model = %self.name, validator = %name, "model validator failed");
                return Err(ValidationError::new(ErrorDetail::new(
                    format!("Value error, {msg}"),
                    "value_error",
                )));
            }
        }
        Ok(())
    }

    /// Returns the one-line summary of `record`.
    ///
    /// Without a summary function this is `{field: display, ...}` over the
    /// fields not excluded by the schema.
    pub fn summarize(&self, record: &Record) -> String {
        if let Some(summary) = &self.summary {
            return summary(record);
        }
        let parts: Vec<String> = self
            .fields
            .iter()
            .filter(|f| !f.schema_excluded)
            .map(|f| {
                let value = record.get(&f.name).unwrap_or(&Value::Null);
                format!("{}: {}", f.name, f.display_value(value))
            })
            .collect();
        format!("{{{}}}", parts.join(", "))
    }
}

impl PartialEq for ModelSchema {
    /// Schemas are identified by class name.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for ModelSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSchema")
            .field("name", &self.name)
            .field("title", &self.title)
            .field(
                "fields", &self
                    .fields
                    .iter()
                    .map(|f| &f.name)
                    .collect::<Vec<_>>(),
            )
            .field(
                "validators", &self
                    .validators
                    .iter()
                    .map(|(n, _)| n)
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeTag;

    fn hero() -> Arc<ModelSchema> {
        ModelSchema::new("Hero")
            .title("Heroic character")
            .field(FieldDescriptor::new("name", TypeTag::String))
            .field(
                FieldDescriptor::new("level", TypeTag::Integer)
                    .gt(0.0)
                    .default(1),
            )
            .field(FieldDescriptor::new("secret", TypeTag::String).exclude())
            .validator("name_not_level", |r| {
                if r.get("name").and_then(Value::as_str) == Some("42") {
                    Err("name must not be a number".into())
                } else {
                    Ok(())
                }
            })
            .build()
    }

    fn map(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
    }

    #[test]
    fn test_titles() {
        let s = hero();
        assert_eq!(s.name(), "Hero");
        assert_eq!(s.display_title(), "Heroic character");
        assert_eq!(ModelSchema::new("X").build().display_title(), "X");
    }

    #[test]
    fn test_field_replacement_keeps_position() {
        let s = ModelSchema::new("S")
            .field(FieldDescriptor::new("a", TypeTag::String))
            .field(FieldDescriptor::new("b", TypeTag::String))
            .field(FieldDescriptor::new("a", TypeTag::Integer))
            .build();
        assert_eq!(s.fields().len(), 2);
        assert_eq!(s.fields()[0].declared_type(), &TypeTag::Integer);
    }

    #[test]
    fn test_defaults_given_ignores_schema_excluded() {
        let s = ModelSchema::new("S")
            .field(FieldDescriptor::new("a", TypeTag::String).default("x"))
            .field(FieldDescriptor::new("b", TypeTag::String).exclude())
            .build();
        assert!(s.defaults_given());
        assert!(!hero().defaults_given());
    }

    #[test]
    fn test_instantiate_reports_missing() {
        let err = hero().instantiate().unwrap_err();
        let locs: Vec<String> = err.errors.iter().map(|e| e.loc_string()).collect();
        assert_eq!(locs, vec!["name", "secret"]);
        assert!(err.errors.iter().all(|e| e.msg == "Field required"));
    }

    #[test]
    fn test_create_coerces_and_defaults() {
        let r = hero()
            .create(map(&[
                ("name", Value::from("Sam")),
                ("secret", Value::from("s")),
                ("unknown", Value::Int(1)),
            ]))
            .unwrap();
        assert_eq!(r.get("level"), Some(&Value::Int(1)));
        assert_eq!(r.get("unknown"), None);
    }

    #[test]
    fn test_create_collects_all_errors() {
        let err = hero()
            .create(map(&[("name", Value::Int(1)), ("level", Value::Int(0))]))
            .unwrap_err();
        assert_eq!(err.errors.len(), 3);
    }

    #[test]
    fn test_create_runs_model_validators() {
        let err = hero()
            .create(map(&[("name", Value::from("42")), ("secret", Value::from(""))]))
            .unwrap_err();
        assert_eq!(err.first_message(), Some("Value error, name must not be a number"));
    }

    #[test]
    fn test_placeholder_instance() {
        let r = hero().placeholder_instance();
        assert_eq!(r.get("name"), Some(&Value::from("Enter text")));
        assert_eq!(r.get("level"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_summarize_default_and_custom() {
        let r = hero().placeholder_instance();
        assert_eq!(hero().summarize(&r), "{name: Enter text, level: 1}");

        let s = ModelSchema::new("Tag")
            .field(FieldDescriptor::new("label", TypeTag::String).default("x"))
            .summary(|r| {
                let label = r.get("label").map(ToString::to_string).unwrap_or_default();
                format!("#{label}")
            })
            .build();
        let r = s.instantiate().unwrap();
        assert_eq!(r.summary(), "#x");
    }

    #[test]
    fn test_schema_equality_by_name() {
        assert_eq!(*ModelSchema::new("A").build(), *ModelSchema::new("A").title("t").build());
    }
}
