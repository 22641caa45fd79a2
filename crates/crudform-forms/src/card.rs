//! Form cards.
//!
//! A [`CardController`] edits one [`Record`]. It renders a widget per included
//! field through the [`HandlerRegistry`], routes widget input to the resolved
//! handler, and applies values through a single validated commit path that
//! records the latest error message and whether the record validates.
//!
//! Nested objects and list-of-object items are edited in dialogs managed by
//! the card's [`NestedEditCoordinator`]; see [`crate::nested`].
//!
//! Cards are single-threaded: the live record and status sit in `RefCell`s
//! because handlers commit through a shared reference while rendering
//! callbacks may read the card.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crudform_core::error::{CrudError, CrudResult, ValidationError};
use crudform_core::logging::card_span;
use crudform_core::settings::CrudConfig;
use crudform_core::utils::text::clean_validation_message;
use crudform_model::{FieldDescriptor, ModelSchema, Record, TypeTag, Value};
use serde::Serialize;

use crate::context::InputContext;
use crate::nested::{EditTarget, NestedEditCoordinator};
use crate::options::{OptionMap, SelectOptionsSource};
use crate::registry::HandlerRegistry;
use crate::widgets::{Widget, WidgetValue};

/// Called after a field change is accepted, with the field name and the
/// updated record.
pub type ChangeHook = Box<dyn Fn(&str, &mut Record)>;

/// Called after every commit with whether the record validates.
pub type ValidationHook = Box<dyn Fn(bool)>;

/// The validation state of a card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardStatus {
    /// The latest validation message, cleared by the next accepted commit.
    pub error: Option<String>,
    /// Whether the record validates.
    pub valid: bool,
}

/// One rendered field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    /// Field name.
    pub name: String,
    /// Display label.
    pub label: String,
    /// Field description.
    pub tooltip: Option<String>,
    /// The widget description.
    pub widget: Widget,
}

/// A rendered card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    /// Class name of the record.
    pub model: String,
    /// Title of the record's schema.
    pub title: String,
    /// Number of columns to lay the fields out in.
    pub column_count: usize,
    /// The included fields in declaration order.
    pub fields: Vec<FieldView>,
    /// The latest validation message.
    pub error: Option<String>,
    /// Whether the record validates.
    pub valid: bool,
}

/// Renders and edits one record.
pub struct CardController {
    schema: Arc<ModelSchema>,
    record: RefCell<Record>,
    status: RefCell<CardStatus>,
    registry: Arc<HandlerRegistry>,
    config: CrudConfig,
    id_editable: bool,
    select_options: RefCell<HashMap<String, OptionMap>>,
    on_change: Option<ChangeHook>,
    on_validation: Option<ValidationHook>,
    coordinator: RefCell<NestedEditCoordinator>,
    span: tracing::Span,
}

impl CardController {
    /// Creates a card over `record`, resolving widgets through `registry`.
    pub fn new(record: Record, registry: Arc<HandlerRegistry>) -> Self {
        let schema = Arc::clone(record.schema());
        let valid = schema.create(record.dump()).is_ok();
        Self {
            span: card_span(schema.name()),
            schema,
            record: RefCell::new(record),
            status: RefCell::new(CardStatus { error: None, valid }),
            registry,
            config: CrudConfig::default(),
            id_editable: true,
            select_options: RefCell::new(HashMap::new()),
            on_change: None,
            on_validation: None,
            coordinator: RefCell::new(NestedEditCoordinator::new()),
        }
    }

    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: CrudConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets whether the identifier field may be edited. A non-editable
    /// identifier is not rendered.
    #[must_use]
    pub const fn id_editable(mut self, editable: bool) -> Self {
        self.id_editable = editable;
        self
    }

    /// Sets the hook called after an accepted change.
    #[must_use]
    pub fn on_change(mut self, hook: impl Fn(&str, &mut Record) + 'static) -> Self {
        self.on_change = Some(Box::new(hook));
        self
    }

    /// Sets the hook called with the validation result of every commit.
    #[must_use]
    pub fn on_validation(mut self, hook: impl Fn(bool) + 'static) -> Self {
        self.on_validation = Some(Box::new(hook));
        self
    }

    /// Returns the schema of the edited record.
    pub const fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &CrudConfig {
        &self.config
    }

    /// Returns a copy of the edited record.
    pub fn record(&self) -> Record {
        self.record.borrow().clone()
    }

    /// Returns the validation state.
    pub fn status(&self) -> CardStatus {
        self.status.borrow().clone()
    }

    /// Returns `true` if the record validates.
    pub fn is_valid(&self) -> bool {
        self.status.borrow().valid
    }

    /// Returns the latest validation message.
    pub fn error(&self) -> Option<String> {
        self.status.borrow().error.clone()
    }

    // ── Layout ──────────────────────────────────────────────────────

    fn is_id_field(&self, name: &str) -> bool {
        name == self.config.id_field
    }

    /// Returns the rendered fields in declaration order.
    pub fn included_fields(&self) -> Vec<&FieldDescriptor> {
        self.schema
            .fields()
            .iter()
            .filter(|f| !f.is_excluded() && !self.config.excludes(&f.name))
            .filter(|f| self.id_editable || !self.is_id_field(&f.name))
            .collect()
    }

    /// Returns the configured column count, or one column per four fields.
    pub fn column_count(&self) -> usize {
        self.config
            .column_count
            .unwrap_or_else(|| (self.included_fields().len() / 4).max(1))
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// Performs the first render, after fetching options for select fields
    /// that have no static selections.
    ///
    /// # Errors
    ///
    /// Propagates [`render`](Self::render) errors. Failures of the options
    /// source are logged and leave the field without external options.
    pub async fn mount(&self, source: &dyn SelectOptionsSource) -> CrudResult<CardView> {
        let snapshot = self.record();
        let wanted: Vec<String> = self
            .included_fields()
            .into_iter()
            .filter(|f| wants_external_options(f))
            .map(|f| f.name.clone())
            .collect();

        for field in wanted {
            match source.select_options(&field, &snapshot).await {
                Ok(options) => {
                    self.select_options.borrow_mut().insert(field, options);
                }
                Err(e) => {
                    tracing::warn!(
                        parent: &self.span,
                        field = %field,
                        error = %e,
                        "select options unavailable"
                    );
                }
            }
        }
        self.render()
    }

    /// Renders every included field.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::NoHandlerFound`] if a field cannot be resolved.
    pub fn render(&self) -> CrudResult<CardView> {
        let _guard = self.span.enter();
        let snapshot = self.record();
        let options = self.select_options.borrow();
        let mut fields = Vec::new();

        for descriptor in self.included_fields() {
            let handler = self.registry.resolve(descriptor)?;
            let commit = |value: Value| self.commit(&descriptor.name, value);
            let ctx = InputContext::new(descriptor, &snapshot, &self.config, &commit)
                .disabled(self.is_id_field(&descriptor.name) && !self.id_editable)
                .select_options(options.get(&descriptor.name));
            match handler.create_widget(&ctx) {
                Some(widget) => fields.push(FieldView {
                    name: descriptor.name.clone(),
                    label: widget.label.clone(),
                    tooltip: widget.tooltip.clone(),
                    widget: widget.handler(handler.name()),
                }),
                None => tracing::debug!(
                    field = %descriptor.name,
                    handler = handler.name(),
                    "field not rendered"
                ),
            }
        }

        let status = self.status();
        Ok(CardView {
            model: self.schema.name().to_string(),
            title: self.schema.display_title().to_string(),
            column_count: self.column_count(),
            fields,
            error: status.error,
            valid: status.valid,
        })
    }

    // ── Input ───────────────────────────────────────────────────────

    fn descriptor(&self, field: &str) -> CrudResult<&FieldDescriptor> {
        self.schema.get_field(field).ok_or_else(|| {
            CrudError::ImproperlyConfigured(format!(
                "{} has no field '{field}'",
                self.schema.name()
            ))
        })
    }

    /// Feeds widget input for `field` to its handler. Returns `true` if a
    /// value was committed and accepted.
    ///
    /// Choosing a class on a union-of-objects field switches the class.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::ImproperlyConfigured`] for an unknown field or
    /// class, and [`CrudError::NoHandlerFound`] if the field cannot be
    /// resolved.
    pub fn input(&self, field: &str, input: WidgetValue) -> CrudResult<bool> {
        let descriptor = self.descriptor(field)?;
        if descriptor.extra_options.readonly || (self.is_id_field(field) && !self.id_editable) {
            tracing::warn!(parent: &self.span, field, "ignoring input for a disabled field");
            return Ok(false);
        }
        if let (TypeTag::UnionOfObjects(_), WidgetValue::Text(class)) =
            (descriptor.effective_type().0, &input)
        {
            return self.switch_class(field, class);
        }

        let handler = self.registry.resolve(descriptor)?;
        let snapshot = self.record();
        let options = self.select_options.borrow().get(field).cloned();
        let commit = |value: Value| self.commit(field, value);
        let ctx = InputContext::new(descriptor, &snapshot, &self.config, &commit)
            .select_options(options.as_ref());
        Ok(handler.handle_input(&ctx, input))
    }

    /// Applies `value` to `field` through validation. Returns `true` if it
    /// was accepted.
    ///
    /// Integer fields truncate numeric values and path fields take strings as
    /// paths. A rejected value is not applied; its first error message is
    /// kept as the card's error with the validation library's prefixes
    /// cleaned up.
    pub fn commit(&self, field: &str, value: Value) -> bool {
        let value = match (self.schema.get_field(field).map(|d| d.effective_type().0), value) {
            (Some(TypeTag::Integer), Value::Float(f)) if f.is_finite() => {
                #[allow(clippy::cast_possible_truncation)]
                let whole = f.trunc() as i64;
                Value::Int(whole)
            }
            (Some(TypeTag::Path), Value::String(s)) => Value::Path(s.into()),
            (_, other) => other,
        };

        let result = self.record.borrow_mut().set(field, value);
        let accepted = match result {
            Ok(()) => {
                *self.status.borrow_mut() = CardStatus {
                    error: None,
                    valid: true,
                };
                tracing::debug!(parent: &self.span, field, "committed");
                if let Some(hook) = &self.on_change {
                    hook(field, &mut self.record.borrow_mut());
                }
                true
            }
            Err(e) => {
                let message = error_message(&e, field);
                tracing::debug!(parent: &self.span, field, error = %message, "commit rejected");
                *self.status.borrow_mut() = CardStatus {
                    error: Some(message),
                    valid: false,
                };
                false
            }
        };
        if let Some(hook) = &self.on_validation {
            hook(accepted);
        }
        accepted
    }

    // ── Nested editing ──────────────────────────────────────────────

    fn child_card(&self, draft: Record) -> Self {
        Self::new(draft, Arc::clone(&self.registry)).with_config(self.config.clone())
    }

    fn list_element_schema(&self, field: &str) -> CrudResult<Arc<ModelSchema>> {
        match self.descriptor(field)?.effective_type().0 {
            TypeTag::ListOf(element) => match &**element {
                TypeTag::ObjectType(schema) => Ok(Arc::clone(schema)),
                _ => Err(not_nested(field)),
            },
            _ => Err(not_nested(field)),
        }
    }

    /// Opens a dialog editing a copy of the nested object in `field`. A
    /// missing object is replaced by a placeholder instance.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::ImproperlyConfigured`] if `field` does not hold a
    /// nested object.
    pub fn edit_nested(&self, field: &str) -> CrudResult<()> {
        let fallback = match self.descriptor(field)?.effective_type().0 {
            TypeTag::ObjectType(schema) => Arc::clone(schema),
            TypeTag::UnionOfObjects(variants) => {
                variants.first().cloned().ok_or_else(|| not_nested(field))?
            }
            _ => return Err(not_nested(field)),
        };
        let draft = match self.record.borrow().value(field) {
            Value::Object(record) => record,
            _ => fallback.placeholder_instance(),
        };
        let card = self.child_card(draft);
        self.coordinator.borrow_mut().open(field, EditTarget::Field, card);
        Ok(())
    }

    /// Opens a dialog editing a copy of item `index` of a list-of-objects
    /// field. Returns `false` without opening anything if the index is out of
    /// range.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::ImproperlyConfigured`] if `field` is not a list of
    /// objects.
    pub fn edit_list_item(&self, field: &str, index: usize) -> CrudResult<bool> {
        self.list_element_schema(field)?;
        let item = self
            .record
            .borrow()
            .value(field)
            .as_list()
            .and_then(|items| items.get(index))
            .and_then(Value::as_record)
            .cloned();
        let Some(draft) = item else {
            tracing::warn!(parent: &self.span, field, index, "no such list item");
            return Ok(false);
        };
        let card = self.child_card(draft);
        self.coordinator
            .borrow_mut()
            .open(field, EditTarget::ListItem(index), card);
        Ok(true)
    }

    /// Opens a dialog over a placeholder element for a list-of-objects field.
    /// The element is appended only when the dialog is saved.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::ImproperlyConfigured`] if `field` is not a list of
    /// objects.
    pub fn add_list_item(&self, field: &str) -> CrudResult<()> {
        let schema = self.list_element_schema(field)?;
        let card = self.child_card(schema.placeholder_instance());
        self.coordinator
            .borrow_mut()
            .open(field, EditTarget::NewListItem, card);
        Ok(())
    }

    /// Removes item `index` from a list-of-objects field. Returns `true` if
    /// an item was removed and the shortened list accepted.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::ImproperlyConfigured`] if `field` is not a list of
    /// objects.
    pub fn delete_list_item(&self, field: &str, index: usize) -> CrudResult<bool> {
        self.list_element_schema(field)?;
        let mut items = self
            .record
            .borrow()
            .value(field)
            .as_list()
            .map(<[Value]>::to_vec)
            .unwrap_or_default();
        if index >= items.len() {
            tracing::warn!(
                parent: &self.span,
                field,
                index,
                len = items.len(),
                "delete index out of range"
            );
            return Ok(false);
        }
        items.remove(index);
        Ok(self.commit(field, Value::List(items)))
    }

    /// Switches a union-of-objects field to `class_name`. Returns `true` if
    /// the field changed.
    ///
    /// When the target class cannot be built valid from its remembered
    /// settings or its defaults, the field keeps its value, the card reports
    /// the error, and a dialog opens over the target's draft. Saving that
    /// dialog completes the switch.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::ImproperlyConfigured`] if `field` is not a union
    /// of objects or `class_name` is not one of its variants.
    pub fn switch_class(&self, field: &str, class_name: &str) -> CrudResult<bool> {
        let TypeTag::UnionOfObjects(variants) = self.descriptor(field)?.effective_type().0 else {
            return Err(CrudError::ImproperlyConfigured(format!(
                "field '{field}' is not a union of objects"
            )));
        };
        let current = self.record.borrow().value(field);
        let switched = self
            .coordinator
            .borrow_mut()
            .switch_class(field, variants, &current, class_name)?;
        let Some(record) = switched else {
            return Ok(false);
        };
        if self.commit(field, Value::Object(record.clone())) {
            return Ok(true);
        }
        tracing::debug!(
            parent: &self.span,
            field,
            class = class_name,
            "finishing switch in a dialog"
        );
        let card = self.child_card(record);
        self.coordinator.borrow_mut().open(field, EditTarget::Field, card);
        Ok(false)
    }

    /// Returns the card of the open dialog.
    ///
    /// The returned guard must be dropped before saving or cancelling.
    pub fn dialog(&self) -> Option<Ref<'_, Self>> {
        Ref::filter_map(self.coordinator.borrow(), |c| c.session().map(|s| s.card())).ok()
    }

    /// Returns the parent field of the open dialog.
    pub fn dialog_field(&self) -> Option<String> {
        self.coordinator
            .borrow()
            .session()
            .map(|s| s.field().to_string())
    }

    /// Returns `true` while a dialog is open.
    pub fn has_dialog(&self) -> bool {
        self.coordinator.borrow().is_open()
    }

    /// Writes the open dialog's draft back to its field and closes the
    /// dialog. Returns `true` if the write was accepted.
    ///
    /// An invalid draft is not written and the dialog stays open, as it does
    /// when the parent rejects the write. If the edited list item has
    /// disappeared, the draft is dropped.
    pub fn save_dialog(&self) -> bool {
        let Some(session) = self.coordinator.borrow_mut().take() else {
            return false;
        };
        if !session.card().is_valid() {
            tracing::debug!(parent: &self.span, field = session.field(), "draft is invalid");
            self.coordinator.borrow_mut().restore(session);
            return false;
        }
        let field = session.field().to_string();
        let current = self.record.borrow().value(&field);
        let Some(merged) = session.merged_value(&current) else {
            tracing::warn!(parent: &self.span, field = %field, "edited item no longer exists");
            return false;
        };
        if self.commit(&field, merged) {
            true
        } else {
            self.coordinator.borrow_mut().restore(session);
            false
        }
    }

    /// Closes the open dialog without writing back. Returns `true` if one was
    /// open.
    pub fn cancel_dialog(&self) -> bool {
        self.coordinator.borrow_mut().cancel()
    }
}

impl fmt::Debug for CardController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardController")
            .field("record", &self.record.borrow())
            .field("status", &self.status.borrow())
            .field("id_editable", &self.id_editable)
            .field("dialog", &self.coordinator.borrow().session())
            .finish_non_exhaustive()
    }
}

fn wants_external_options(field: &FieldDescriptor) -> bool {
    use crudform_model::InputType;
    matches!(field.hint(), Some(InputType::Select | InputType::Multiselect))
        && field
            .extra_options
            .selections
            .as_ref()
            .map_or(true, indexmap::IndexMap::is_empty)
        && !matches!(field.effective_type().0, TypeTag::Literal(_))
}

fn not_nested(field: &str) -> CrudError {
    CrudError::ImproperlyConfigured(format!("field '{field}' does not hold nested objects"))
}

fn error_message(error: &ValidationError, field: &str) -> String {
    error.first().map_or_else(
        || "Invalid value".to_string(),
        |detail| {
            let loc = if detail.loc.is_empty() {
                field.to_string()
            } else {
                detail.loc_string()
            };
            clean_validation_message(&detail.msg, &loc)
        },
    )
}
