//! Nested edit sessions.
//!
//! A card edits nested objects and list-of-object items in their own dialog.
//! The [`NestedEditCoordinator`] tracks at most one open dialog per card:
//!
//! ```text
//! Idle ──open──▶ DialogOpen(draft) ──save──▶ Idle   (draft written back)
//!                        │
//!                        └──────cancel─────▶ Idle   (draft discarded)
//! ```
//!
//! The draft is a copy taken when the dialog opens. The parent record is not
//! touched until the dialog is saved, and the write then goes through the
//! parent card's validated commit path. Sessions nest: the dialog's card has
//! its own coordinator.
//!
//! The coordinator also owns the remembered settings of union-of-objects
//! fields: when the user switches a field from one class to another, the
//! outgoing object is remembered under its class name so switching back
//! restores it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crudform_core::error::{CrudError, CrudResult};
use crudform_model::{ModelSchema, Record, Value};
use indexmap::IndexMap;

use crate::card::CardController;

/// What a dialog's draft will be written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// The whole field value.
    Field,
    /// One element of a list-of-objects field.
    ListItem(usize),
    /// A new element appended to a list-of-objects field.
    NewListItem,
}

/// An open dialog: the draft's card and where the draft goes on save.
pub struct EditSession {
    field: String,
    target: EditTarget,
    card: Box<CardController>,
    span: tracing::Span,
}

impl EditSession {
    /// Returns the edited field of the parent.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the write-back target.
    pub const fn target(&self) -> EditTarget {
        self.target
    }

    /// Returns the card editing the draft.
    pub fn card(&self) -> &CardController {
        &self.card
    }

    /// Computes the parent field value that saving this session produces,
    /// given the field's `current` value. Returns `None` if the edited list
    /// item no longer exists.
    pub fn merged_value(&self, current: &Value) -> Option<Value> {
        let draft = Value::Object(self.card.record());
        match self.target {
            EditTarget::Field => Some(draft),
            EditTarget::ListItem(index) => {
                let mut items = current.as_list()?.to_vec();
                *items.get_mut(index)? = draft;
                Some(Value::List(items))
            }
            EditTarget::NewListItem => {
                let mut items = current.as_list().map(<[Value]>::to_vec).unwrap_or_default();
                items.push(draft);
                Some(Value::List(items))
            }
        }
    }
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("field", &self.field)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Remembered object dumps, per field and then per class name.
type Remembered = HashMap<String, HashMap<String, IndexMap<String, Value>>>;

/// Tracks the open dialog and the remembered settings of a card.
#[derive(Debug, Default)]
pub struct NestedEditCoordinator {
    session: Option<EditSession>,
    remembered: Remembered,
}

impl NestedEditCoordinator {
    /// Creates an idle coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a dialog is open.
    pub const fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the open session.
    pub const fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// Opens a dialog over `card` for `field`. An already open dialog is
    /// discarded.
    pub fn open(&mut self, field: &str, target: EditTarget, card: CardController) {
        let span = crudform_core::logging::dialog_span(card.schema().name(), field);
        span.in_scope(|| tracing::debug!(target_kind = ?target, "opening dialog"));
        let session = EditSession {
            field: field.to_string(),
            target,
            card: Box::new(card),
            span,
        };
        if let Some(previous) = self.session.replace(session) {
            tracing::warn!(field = %previous.field, "discarding unsaved dialog");
        }
    }

    /// Closes the dialog and hands its session to the caller for writing back.
    pub fn take(&mut self) -> Option<EditSession> {
        self.session.take()
    }

    /// Puts back a session whose write-back was rejected, so the dialog stays
    /// open.
    pub fn restore(&mut self, session: EditSession) {
        session.span.in_scope(|| tracing::debug!("write-back rejected; dialog stays open"));
        self.session = Some(session);
    }

    /// Discards the open dialog. Returns `true` if one was open.
    pub fn cancel(&mut self) -> bool {
        self.session.take().is_some_and(|session| {
            session.span.in_scope(|| tracing::debug!("dialog cancelled"));
            true
        })
    }

    /// Returns the remembered dump of `class` for `field`.
    pub fn remembered(&self, field: &str, class: &str) -> Option<&IndexMap<String, Value>> {
        self.remembered.get(field)?.get(class)
    }

    /// Builds the object a union field switches to.
    ///
    /// The outgoing object (if any) is remembered under its class name. The
    /// target is rebuilt from its remembered dump when there is one, else from
    /// defaults, with placeholders for required fields that have none.
    /// Returns `None` when `class_name` is already the current class.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::ImproperlyConfigured`] if `class_name` is not one
    /// of `variants`.
    pub fn switch_class(
        &mut self,
        field: &str,
        variants: &[Arc<ModelSchema>],
        current: &Value,
        class_name: &str,
    ) -> CrudResult<Option<Record>> {
        let Some(target) = variants.iter().find(|s| s.name() == class_name) else {
            return Err(CrudError::ImproperlyConfigured(format!(
                "'{class_name}' is not a variant of field '{field}'"
            )));
        };
        let outgoing = current.as_record();
        if outgoing.is_some_and(|r| r.class_name() == class_name) {
            return Ok(None);
        }
        if let Some(record) = outgoing {
            self.remembered
                .entry(field.to_string())
                .or_default()
                .insert(record.class_name().to_string(), record.dump());
        }

        let rebuilt = match self.remembered(field, class_name) {
            Some(dump) => target.create(dump.clone()),
            None => target.instantiate(),
        };
        let record = rebuilt.unwrap_or_else(|e| {
            tracing::debug!(field, class = class_name, error = %e, "using placeholders");
            target.placeholder_instance()
        });
        tracing::debug!(
            field,
            from = outgoing.map(Record::class_name),
            to = class_name,
            "switched class"
        );
        Ok(Some(record))
    }
}
