//! Validated object instances.
//!
//! A [`Record`] pairs a [`ModelSchema`] with the current values of its
//! fields. Every assignment through [`Record::set`] is coerced, validated
//! against the field's constraints, and checked by the model validators
//! before it is applied; a rejected assignment leaves the record unchanged.

use std::fmt;
use std::sync::Arc;

use crudform_core::error::{ErrorDetail, ValidationError};
use indexmap::IndexMap;

use crate::schema::ModelSchema;
use crate::value::Value;

/// An instance of a [`ModelSchema`].
#[derive(Clone)]
pub struct Record {
    schema: Arc<ModelSchema>,
    values: IndexMap<String, Value>,
}

impl Record {
    /// Assembles a record without validation.
    pub(crate) const fn from_parts(
        schema: Arc<ModelSchema>,
        values: IndexMap<String, Value>,
    ) -> Self {
        Self { schema, values }
    }

    /// Returns the schema.
    pub const fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    /// Returns the class name.
    pub fn class_name(&self) -> &str {
        self.schema.name()
    }

    /// Returns the schema title, or the class name.
    pub fn title(&self) -> &str {
        self.schema.display_title()
    }

    /// Returns the current value of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Returns the current value of a field, or null.
    pub fn value(&self, field: &str) -> Value {
        self.values.get(field).cloned().unwrap_or(Value::Null)
    }

    /// Iterates over `(field, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Assigns a field with validation.
    ///
    /// The value is coerced to the declared type and checked by the field's
    /// validators; then the model validators run against the would-be
    /// result. On any failure the record is left unchanged.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<(), ValidationError> {
        let Some(descriptor) = self.schema.get_field(field) else {
            return Err(ValidationError::new(
                ErrorDetail::new(format!("Object has no attribute '{field}'"), "no_such_attribute")
                    .at(field),
            ));
        };
        let coerced = descriptor.validate_value(value.into())?;

        let mut candidate = self.values.clone();
        candidate.insert(field.to_string(), coerced);
        let candidate = Self::from_parts(Arc::clone(&self.schema), candidate);
        self.schema.run_validators(&candidate)?;

        self.values = candidate.values;
        Ok(())
    }

    /// Returns a structured dump of all fields. Nested objects become maps.
    pub fn dump(&self) -> IndexMap<String, Value> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), dump_value(v)))
            .collect()
    }

    /// Returns the short display form of every field not excluded by the
    /// schema, honoring per-field display functions.
    pub fn display_dump(&self) -> IndexMap<String, String> {
        self.schema
            .fields()
            .iter()
            .filter(|f| !f.schema_excluded)
            .map(|f| {
                let value = self.values.get(&f.name).unwrap_or(&Value::Null);
                (f.name.clone(), f.display_value(value))
            })
            .collect()
    }

    /// Returns the one-line summary used for nested-object labels.
    pub fn summary(&self) -> String {
        self.schema.summarize(self)
    }

    /// Converts to a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

fn dump_value(value: &Value) -> Value {
    match value {
        Value::Object(record) => Value::Map(record.dump()),
        Value::List(items) => Value::List(items.iter().map(dump_value).collect()),
        Value::Map(map) => {
            Value::Map(map.iter().map(|(k, v)| (k.clone(), dump_value(v))).collect())
        }
        other => other.clone(),
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.class_name() == other.class_name() && self.values == other.values
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("class", &self.class_name())
            .field("values", &self.values)
            .finish()
    }
}
