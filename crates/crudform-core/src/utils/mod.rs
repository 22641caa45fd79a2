//! Utility functions shared across crudform-rs.
//!
//! - [`text`]: string helpers (HTML escaping, labels, truncation, error-message cleanup).

pub mod text;
