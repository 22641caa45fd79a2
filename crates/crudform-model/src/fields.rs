//! Field descriptors.
//!
//! A [`FieldDescriptor`] is the normalized view of one model field: its name,
//! its declared [`TypeTag`], numeric and length [`Constraints`], advisory
//! rendering hints ([`FieldOptions`]), and presentation metadata. Descriptors
//! are built with a chainable API:
//!
//! ```
//! use crudform_model::fields::{FieldDescriptor, InputType};
//! use crudform_model::types::TypeTag;
//!
//! let level = FieldDescriptor::new("level", TypeTag::Integer)
//!     .gt(0.0)
//!     .lt(101.0)
//!     .default(1)
//!     .input_type(InputType::Slider)
//!     .title("Level");
//! assert_eq!(level.constraints.min(), Some(0.0));
//! assert!(!level.required());
//! ```

use std::fmt;
use std::sync::Arc;

use crudform_core::error::ValidationError;
use crudform_core::utils::text::humanize;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::TypeTag;
use crate::validators::{BoundValidator, LengthValidator, Validator};
use crate::value::Value;

/// A function producing the short display form of a field value.
pub type DisplayFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Numeric and length constraints of a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Exclusive lower bound.
    pub gt: Option<f64>,
    /// Inclusive lower bound.
    pub ge: Option<f64>,
    /// Exclusive upper bound.
    pub lt: Option<f64>,
    /// Inclusive upper bound.
    pub le: Option<f64>,
    /// Step of numeric inputs and sliders.
    pub step: Option<f64>,
    /// Minimum length of strings and collections.
    pub min_length: Option<usize>,
    /// Maximum length of strings and collections.
    pub max_length: Option<usize>,
}

impl Constraints {
    /// Returns the lower bound, regardless of strictness.
    pub fn min(&self) -> Option<f64> {
        self.gt.or(self.ge)
    }

    /// Returns the upper bound, regardless of strictness.
    pub fn max(&self) -> Option<f64> {
        self.lt.or(self.le)
    }

    /// Returns the validators implied by these constraints.
    pub fn validators(&self) -> Vec<Box<dyn Validator>> {
        let mut out: Vec<Box<dyn Validator>> = Vec::new();
        if self.gt.is_some() || self.ge.is_some() || self.lt.is_some() || self.le.is_some() {
            out.push(Box::new(BoundValidator {
                gt: self.gt,
                ge: self.ge,
                lt: self.lt,
                le: self.le,
            }));
        }
        if self.min_length.is_some() || self.max_length.is_some() {
            out.push(Box::new(LengthValidator {
                min_length: self.min_length,
                max_length: self.max_length,
            }));
        }
        out
    }
}

/// The widget variant a field asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Multi-line text.
    Textarea,
    /// Multi-line text rendered as markdown.
    Markdown,
    /// A slider between the field's bounds.
    Slider,
    /// A plain numeric input.
    Number,
    /// A single-choice select.
    Select,
    /// A multiple-choice select.
    Multiselect,
}

impl InputType {
    /// Returns the lowercase name of the variant.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Textarea => "textarea",
            Self::Markdown => "markdown",
            Self::Slider => "slider",
            Self::Number => "number",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory rendering hints. Dispatch is type-driven; hints only pick among
/// renderings that are valid for the type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Requested widget variant.
    pub input_type: Option<InputType>,
    /// Static options of a select: value to label.
    pub selections: Option<IndexMap<String, String>>,
    /// Render the widget disabled.
    pub readonly: bool,
    /// Hide the field from cards and tables.
    pub exclude: bool,
}

/// The normalized metadata of one model field.
#[derive(Clone)]
pub struct FieldDescriptor {
    /// Field name, unique within its schema.
    pub name: String,
    declared_type: TypeTag,
    /// Numeric and length constraints.
    pub constraints: Constraints,
    /// Advisory rendering hints.
    pub extra_options: FieldOptions,
    /// Human-readable title.
    pub title: Option<String>,
    /// Longer description, used as tooltip and placeholder.
    pub description: Option<String>,
    /// Default value. `None` means the field is required.
    pub default: Option<Value>,
    /// Excluded by the schema itself (never rendered, never required for
    /// templates).
    pub schema_excluded: bool,
    display: Option<DisplayFn>,
    validators: Vec<Arc<dyn Validator>>,
}

impl FieldDescriptor {
    /// Creates a required field of the given type.
    pub fn new(name: impl Into<String>, declared_type: TypeTag) -> Self {
        Self {
            name: name.into(),
            declared_type,
            constraints: Constraints::default(),
            extra_options: FieldOptions::default(),
            title: None,
            description: None,
            default: None,
            schema_excluded: false,
            display: None,
            validators: Vec::new(),
        }
    }

    /// Sets the default value, making the field optional to provide.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets an exclusive lower bound.
    #[must_use]
    pub const fn gt(mut self, bound: f64) -> Self {
        self.constraints.gt = Some(bound);
        self
    }

    /// Sets an inclusive lower bound.
    #[must_use]
    pub const fn ge(mut self, bound: f64) -> Self {
        self.constraints.ge = Some(bound);
        self
    }

    /// Sets an exclusive upper bound.
    #[must_use]
    pub const fn lt(mut self, bound: f64) -> Self {
        self.constraints.lt = Some(bound);
        self
    }

    /// Sets an inclusive upper bound.
    #[must_use]
    pub const fn le(mut self, bound: f64) -> Self {
        self.constraints.le = Some(bound);
        self
    }

    /// Sets the step of numeric inputs.
    #[must_use]
    pub const fn step(mut self, step: f64) -> Self {
        self.constraints.step = Some(step);
        self
    }

    /// Sets the minimum length.
    #[must_use]
    pub const fn min_length(mut self, len: usize) -> Self {
        self.constraints.min_length = Some(len);
        self
    }

    /// Sets the maximum length.
    #[must_use]
    pub const fn max_length(mut self, len: usize) -> Self {
        self.constraints.max_length = Some(len);
        self
    }

    /// Requests a widget variant.
    #[must_use]
    pub const fn input_type(mut self, input_type: InputType) -> Self {
        self.extra_options.input_type = Some(input_type);
        self
    }

    /// Sets static select options as `(value, label)` pairs.
    #[must_use]
    pub fn selections<K: Into<String>, V: Into<String>>(
        mut self,
        selections: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        self.extra_options.selections = Some(
            selections
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Renders the field disabled.
    #[must_use]
    pub const fn readonly(mut self) -> Self {
        self.extra_options.readonly = true;
        self
    }

    /// Hides the field from cards and tables through a rendering hint.
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.extra_options.exclude = true;
        self
    }

    /// Excludes the field at the schema level.
    #[must_use]
    pub const fn exclude(mut self) -> Self {
        self.schema_excluded = true;
        self
    }

    /// Customizes the short display form of the field's value.
    #[must_use]
    pub fn display(mut self, display: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        self.display = Some(Arc::new(display));
        self
    }

    /// Attaches an additional validator.
    #[must_use]
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Returns the declared type.
    pub const fn declared_type(&self) -> &TypeTag {
        &self.declared_type
    }

    /// Returns the declared type with one level of `Optional` stripped, and
    /// whether it was optional.
    pub fn effective_type(&self) -> (&TypeTag, bool) {
        (
            self.declared_type.unwrap_optional(),
            self.declared_type.is_optional(),
        )
    }

    /// Returns the requested widget variant, if any.
    pub const fn hint(&self) -> Option<InputType> {
        self.extra_options.input_type
    }

    /// Returns `true` if no default is set.
    pub const fn required(&self) -> bool {
        self.default.is_none()
    }

    /// Returns the title, or a label derived from the name.
    pub fn label(&self) -> String {
        self.title.clone().unwrap_or_else(|| humanize(&self.name))
    }

    /// Returns `true` if the schema or a rendering hint hides the field.
    pub const fn is_excluded(&self) -> bool {
        self.schema_excluded || self.extra_options.exclude
    }

    /// Returns the short display form of `value`.
    pub fn display_value(&self, value: &Value) -> String {
        self.display
            .as_ref()
            .map_or_else(|| value.to_string(), |display| display(value))
    }

    /// Coerces `value` to the declared type and runs all validators.
    ///
    /// Error locations are prefixed with the field name.
    pub fn validate_value(&self, value: Value) -> Result<Value, ValidationError> {
        let coerced = self
            .declared_type
            .coerce(value)
            .map_err(|e| e.within(&self.name))?;

        let mut errors = Vec::new();
        for validator in self.constraints.validators() {
            if let Err(detail) = validator.validate(&coerced) {
                errors.push(detail.at(&self.name));
            }
        }
        for validator in &self.validators {
            if let Err(detail) = validator.validate(&coerced) {
                errors.push(detail.at(&self.name));
            }
        }
        if errors.is_empty() {
            Ok(coerced)
        } else {
            Err(ValidationError::from_details(errors))
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type.type_key())
            .field("constraints", &self.constraints)
            .field("extra_options", &self.extra_options)
            .field("title", &self.title)
            .field("default", &self.default)
            .field("schema_excluded", &self.schema_excluded)
            .field("validators", &self.validators)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::FnValidator;

    #[test]
    fn test_constraints_min_max() {
        let f = FieldDescriptor::new("x", TypeTag::Float).ge(1.0).le(5.0);
        assert_eq!(f.constraints.min(), Some(1.0));
        assert_eq!(f.constraints.max(), Some(5.0));
        let f = FieldDescriptor::new("x", TypeTag::Float);
        assert_eq!(f.constraints.min(), None);
    }

    #[test]
    fn test_required_and_default() {
        let f = FieldDescriptor::new("name", TypeTag::String);
        assert!(f.required());
        let f = f.default("Bilbo");
        assert!(!f.required());
        assert_eq!(f.default, Some(Value::from("Bilbo")));
    }

    #[test]
    fn test_optional_default_none_is_not_required() {
        let f =
            FieldDescriptor::new("nick", TypeTag::optional(TypeTag::String)).default(Value::Null);
        assert!(!f.required());
        assert_eq!(f.effective_type(), (&TypeTag::String, true));
    }

    #[test]
    fn test_label() {
        assert_eq!(FieldDescriptor::new("hit_points", TypeTag::Integer).label(), "Hit points");
        assert_eq!(
            FieldDescriptor::new("hp", TypeTag::Integer).title("HP").label(),
            "HP"
        );
    }

    #[test]
    fn test_exclusion_sources() {
        assert!(FieldDescriptor::new("a", TypeTag::String).exclude().is_excluded());
        assert!(FieldDescriptor::new("a", TypeTag::String).hidden().is_excluded());
        assert!(!FieldDescriptor::new("a", TypeTag::String).is_excluded());
    }

    #[test]
    fn test_selections_keep_order() {
        let f = FieldDescriptor::new("c", TypeTag::String)
            .input_type(InputType::Select)
            .selections([("z", "Zed"), ("a", "Ay")]);
        let keys: Vec<&String> = f.extra_options.selections.as_ref().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(f.hint(), Some(InputType::Select));
    }

    #[test]
    fn test_validate_value_bounds() {
        let f = FieldDescriptor::new("level", TypeTag::Integer).gt(0.0).lt(101.0);
        assert_eq!(f.validate_value(Value::from("95")).unwrap(), Value::Int(95));
        let err = f.validate_value(Value::Int(150)).unwrap_err();
        assert_eq!(err.first().unwrap().loc, vec!["level"]);
        assert_eq!(err.first_message(), Some("Input should be less than 101"));
    }

    #[test]
    fn test_validate_value_coercion_error_has_location() {
        let f = FieldDescriptor::new("tags", TypeTag::list_of(TypeTag::Integer));
        let err = f.validate_value(Value::from(vec!["1", "x"])).unwrap_err();
        assert_eq!(err.first().unwrap().loc, vec!["tags", "1"]);
    }

    #[test]
    fn test_custom_validator() {
        let f = FieldDescriptor::new("n", TypeTag::Integer).validator(FnValidator::new("odd", |v| {
            if v.as_i64().unwrap_or(0) % 2 == 1 {
                Ok(())
            } else {
                Err("must be odd".into())
            }
        }));
        assert!(f.validate_value(Value::Int(3)).is_ok());
        assert!(f.validate_value(Value::Int(4)).is_err());
    }

    #[test]
    fn test_display_value() {
        let f = FieldDescriptor::new("hp", TypeTag::Integer).display(|v| format!("{v} HP"));
        assert_eq!(f.display_value(&Value::Int(10)), "10 HP");
        let f = FieldDescriptor::new("hp", TypeTag::Integer);
        assert_eq!(f.display_value(&Value::Int(10)), "10");
    }

    #[test]
    fn test_input_type_serde() {
        let json = serde_json::to_string(&InputType::Multiselect).unwrap();
        assert_eq!(json, "\"multiselect\"");
        assert_eq!(InputType::Slider.to_string(), "slider");
    }
}
