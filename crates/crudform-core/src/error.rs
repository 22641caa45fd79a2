//! Core error types for crudform-rs.
//!
//! [`CrudError`] covers handler resolution, validation, persistence,
//! configuration, and serialization failures. [`ValidationError`] carries the
//! structured, per-location details produced when a value is rejected by a
//! model schema.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One rejected value: where it happened, what went wrong, and a short kind code.
///
/// `loc` is a path of field names from the outermost object inwards, so a
/// failure on `address.street` has `loc == ["address", "street"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Field path of the rejected value.
    pub loc: Vec<String>,
    /// Human-readable message (e.g. "Input should be greater than 0").
    pub msg: String,
    /// A short code identifying the failure (e.g. "greater_than", "int_parsing").
    pub kind: String,
}

impl ErrorDetail {
    /// Creates a detail without a location.
    pub fn new(msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc: Vec::new(),
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    /// Sets the location to a single field name.
    #[must_use]
    pub fn at(mut self, field: impl Into<String>) -> Self {
        self.loc = vec![field.into()];
        self
    }

    /// Prepends a parent field name to the location.
    #[must_use]
    pub fn within(mut self, parent: impl Into<String>) -> Self {
        self.loc.insert(0, parent.into());
        self
    }

    /// Returns the location joined with dots, or an empty string.
    pub fn loc_string(&self) -> String {
        self.loc.join(".")
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.loc.is_empty() {
            write!(f, "{}", self.msg)
        } else {
            write!(f, "{}: {}", self.loc_string(), self.msg)
        }
    }
}

/// A validation failure holding one or more [`ErrorDetail`]s.
///
/// # Examples
///
/// ```
/// use crudform_core::error::{ErrorDetail, ValidationError};
///
/// let err = ValidationError::new(
///     ErrorDetail::new("Input should be greater than 0", "greater_than").at("level"),
/// );
/// assert_eq!(err.first_message(), Some("Input should be greater than 0"));
/// assert_eq!(err.to_string(), "level: Input should be greater than 0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The individual failures, in the order they were detected.
    pub errors: Vec<ErrorDetail>,
}

impl ValidationError {
    /// Creates a validation error with a single detail.
    pub fn new(detail: ErrorDetail) -> Self {
        Self {
            errors: vec![detail],
        }
    }

    /// Creates a validation error from a list of details.
    pub const fn from_details(errors: Vec<ErrorDetail>) -> Self {
        Self { errors }
    }

    /// Adds another detail.
    #[must_use]
    pub fn with_error(mut self, detail: ErrorDetail) -> Self {
        self.errors.push(detail);
        self
    }

    /// Prepends `parent` to the location of every detail.
    #[must_use]
    pub fn within(self, parent: &str) -> Self {
        Self {
            errors: self
                .errors
                .into_iter()
                .map(|e| e.within(parent))
                .collect(),
        }
    }

    /// Returns the first detail, if any.
    pub fn first(&self) -> Option<&ErrorDetail> {
        self.errors.first()
    }

    /// Returns the message of the first detail, if any.
    pub fn first_message(&self) -> Option<&str> {
        self.errors.first().map(|e| e.msg.as_str())
    }

    /// Returns `true` if there are no details.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl From<ErrorDetail> for ValidationError {
    fn from(detail: ErrorDetail) -> Self {
        Self::new(detail)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for crudform-rs.
#[derive(Error, Debug)]
pub enum CrudError {
    // ── Resolution ───────────────────────────────────────────────────

    /// No registered input handler accepts a field type. Only reachable when
    /// the fallback handler was removed from the registry.
    #[error("No handler found for type: {0}")]
    NoHandlerFound(String),

    // ── Validation ───────────────────────────────────────────────────

    /// One or more fields failed validation.
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    // ── Persistence ──────────────────────────────────────────────────

    /// The object addressed by an identifier does not exist.
    #[error("{0}")]
    NotFound(String),

    /// An object with the same identifier already exists.
    #[error("{0}")]
    AlreadyExists(String),

    /// More than one object shares an identifier.
    #[error("{0}")]
    Duplicate(String),

    /// A generic failure reported by a persistence backend.
    #[error("Persistence error: {0}")]
    Persistence(String),

    // ── Structure ────────────────────────────────────────────────────

    /// A model or controller is set up inconsistently (e.g. the identifier
    /// field is not part of the model).
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// No template instance can be built for a new item.
    #[error("No template for {0}")]
    NoTemplate(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CrudError {
    /// Returns `true` for failures reported by a persistence backend.
    pub const fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::AlreadyExists(_) | Self::Duplicate(_) | Self::Persistence(_)
        )
    }

    /// Returns `true` for errors that indicate a programming mistake rather
    /// than bad input or a backend failure.
    pub const fn is_programming_error(&self) -> bool {
        matches!(self, Self::NoHandlerFound(_))
    }
}

impl From<ValidationError> for CrudError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<serde_json::Error> for CrudError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience type alias for results using [`CrudError`].
pub type CrudResult<T> = Result<T, CrudError>;
