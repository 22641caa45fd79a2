//! # crudform-admin
//!
//! The CRUD layer of crudform-rs: a table of records with create, update and
//! delete actions, the item dialog that edits one record through a
//! [`CardController`](crudform_forms::CardController), the persistence hooks
//! a host overrides to talk to its own storage, and the notification queue
//! that reports the outcome of every action.
//!
//! ## Modules
//!
//! - [`hooks`] - The [`CrudBackend`] persistence trait and its in-memory default
//! - [`table`] - Columns and rows of the record table
//! - [`notifications`] - Queued user notifications
//! - [`crud`] - The [`CrudController`]

pub mod crud;
pub mod hooks;
pub mod notifications;
pub mod table;

pub use crud::{CrudController, DialogMode, ItemDialog};
pub use hooks::{BackendOptions, CrudBackend, InMemoryBackend};
pub use notifications::{Notification, NotificationLevel, NotificationStore};
pub use table::{Column, Row, Table, NO_VALUE_SET};
