//! # crudform-forms
//!
//! Turns model fields into widget descriptions and drives editing.
//!
//! A [`HandlerRegistry`] holds priority-ordered [`InputHandler`]s and resolves
//! each [`FieldDescriptor`](crudform_model::FieldDescriptor) to exactly one of
//! them; the universal fallback handler guarantees that resolution succeeds.
//! A [`CardController`] renders one record as a list of [`Widget`]s, routes
//! widget input back through validated commits, and opens nested edit dialogs
//! through its [`NestedEditCoordinator`].
//!
//! ## Modules
//!
//! - [`widgets`] - Serializable widget descriptions
//! - [`context`] - The per-field [`InputContext`]
//! - [`handlers`] - The [`InputHandler`] trait and built-in handlers
//! - [`registry`] - [`HandlerRegistry`] and the process-wide default
//! - [`nested`] - Nested-object and list-of-object edit sessions
//! - [`card`] - [`CardController`]
//! - [`options`] - Asynchronous select-option sources

pub mod card;
pub mod context;
pub mod handlers;
pub mod nested;
pub mod options;
pub mod registry;
pub mod widgets;

pub use card::{CardController, CardView};
pub use context::InputContext;
pub use handlers::InputHandler;
pub use nested::{EditTarget, NestedEditCoordinator};
pub use options::{NoSelectOptions, OptionMap, SelectOptionsSource};
pub use registry::{default_registry, register_custom_handler, HandlerRegistry};
pub use widgets::{Widget, WidgetKind, WidgetValue};
