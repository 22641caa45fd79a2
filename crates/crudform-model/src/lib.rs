//! # crudform-model
//!
//! The data-model layer of crudform-rs. A [`ModelSchema`] describes an object
//! type as an ordered list of [`FieldDescriptor`]s, each carrying a
//! pre-normalized [`TypeTag`], constraints, and rendering hints. A [`Record`]
//! is an instance of a schema whose assignments are validated.
//!
//! ## Modules
//!
//! - [`value`] - The dynamic [`Value`] type
//! - [`types`] - [`TypeTag`] and lax value coercion
//! - [`fields`] - [`FieldDescriptor`], constraints, and hints
//! - [`validators`] - Field validators derived from constraints
//! - [`schema`] - [`ModelSchema`] and model-level validators
//! - [`record`] - [`Record`], a validated object instance
//! - [`placeholders`] - Placeholder values for new items
//! - [`json`] - JSON conversion and list loading

pub mod fields;
pub mod json;
pub mod placeholders;
pub mod record;
pub mod schema;
pub mod types;
pub mod validators;
pub mod value;

pub use fields::{Constraints, FieldDescriptor, FieldOptions, InputType};
pub use placeholders::placeholder_for;
pub use record::Record;
pub use schema::ModelSchema;
pub use types::TypeTag;
pub use value::Value;
