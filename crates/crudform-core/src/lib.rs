//! # crudform-core
//!
//! Core types shared by every crudform-rs crate: the error taxonomy, the
//! settings model with its loaders, and tracing setup.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Settings and CRUD configuration
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration
//! - [`utils`] - Text helpers (escaping, labels, error-message cleanup)

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{CrudError, CrudResult, ErrorDetail, ValidationError};
pub use settings::{CrudConfig, Settings};
