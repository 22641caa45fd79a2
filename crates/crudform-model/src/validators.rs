//! Field validators.
//!
//! Validators run after a value has been coerced to the field's declared type.
//! [`BoundValidator`] and [`LengthValidator`] are derived automatically from a
//! field's [`Constraints`](crate::fields::Constraints); custom validators can
//! be attached to a [`FieldDescriptor`](crate::fields::FieldDescriptor) with
//! [`validator`](crate::fields::FieldDescriptor::validator).

use std::fmt;

use crudform_core::error::ErrorDetail;

use crate::value::{format_number, Value};

/// A trait for field-level validators.
pub trait Validator: Send + Sync + fmt::Debug {
    /// Validates the given value, returning an error detail if invalid.
    fn validate(&self, value: &Value) -> Result<(), ErrorDetail>;

    /// Returns a human-readable name for this validator.
    fn name(&self) -> &str;
}

/// Checks numeric bounds. Non-numeric values (including null) pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundValidator {
    /// Exclusive lower bound.
    pub gt: Option<f64>,
    /// Inclusive lower bound.
    pub ge: Option<f64>,
    /// Exclusive upper bound.
    pub lt: Option<f64>,
    /// Inclusive upper bound.
    pub le: Option<f64>,
}

impl Validator for BoundValidator {
    fn validate(&self, value: &Value) -> Result<(), ErrorDetail> {
        let Some(n) = value.as_f64() else {
            return Ok(());
        };
        if let Some(gt) = self.gt {
            if n <= gt {
                return Err(ErrorDetail::new(
                    format!("Input should be greater than {}", format_number(gt)),
                    "greater_than",
                ));
            }
        }
        if let Some(ge) = self.ge {
            if n < ge {
                return Err(ErrorDetail::new(
                    format!("Input should be greater than or equal to {}", format_number(ge)),
                    "greater_than_equal",
                ));
            }
        }
        if let Some(lt) = self.lt {
            if n >= lt {
                return Err(ErrorDetail::new(
                    format!("Input should be less than {}", format_number(lt)),
                    "less_than",
                ));
            }
        }
        if let Some(le) = self.le {
            if n > le {
                return Err(ErrorDetail::new(
                    format!("Input should be less than or equal to {}", format_number(le)),
                    "less_than_equal",
                ));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "BoundValidator"
    }
}

/// Checks the length of strings (in characters) and collections (in items).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LengthValidator {
    /// Minimum length.
    pub min_length: Option<usize>,
    /// Maximum length.
    pub max_length: Option<usize>,
}

impl Validator for LengthValidator {
    fn validate(&self, value: &Value) -> Result<(), ErrorDetail> {
        let (len, noun, prefix) = match value {
            Value::String(s) => (s.chars().count(), "character", "String"),
            Value::List(l) => (l.len(), "item", "List"),
            Value::Map(m) => (m.len(), "item", "Dictionary"),
            _ => return Ok(()),
        };
        let plural = |n: usize| if n == 1 { noun.to_string() } else { format!("{noun}s") };
        if let Some(min) = self.min_length {
            if len < min {
                return Err(ErrorDetail::new(
                    format!("{prefix} should have at least {min} {}", plural(min)),
                    "too_short",
                ));
            }
        }
        if let Some(max) = self.max_length {
            if len > max {
                return Err(ErrorDetail::new(
                    format!("{prefix} should have at most {max} {}", plural(max)),
                    "too_long",
                ));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "LengthValidator"
    }
}

/// A validator backed by a closure, for ad-hoc rules.
pub struct FnValidator {
    name: String,
    check: Box<dyn Fn(&Value) -> Result<(), String> + Send + Sync>,
}

impl FnValidator {
    /// Creates a validator named `name`. The closure's error message is
    /// reported with kind `value_error`.
    pub fn new(
        name: impl Into<String>,
        check: impl Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            check: Box::new(check),
        }
    }
}

impl fmt::Debug for FnValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator").field("name", &self.name).finish()
    }
}

impl Validator for FnValidator {
    fn validate(&self, value: &Value) -> Result<(), ErrorDetail> {
        (self.check)(value)
            .map_err(|msg| ErrorDetail::new(format!("Value error, {msg}"), "value_error"))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
