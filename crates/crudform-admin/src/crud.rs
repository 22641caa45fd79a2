//! The CRUD controller.
//!
//! A [`CrudController`] owns the record table of one model and the item
//! dialog that creates or updates a record. All storage access goes through
//! a [`CrudBackend`]; the outcome of every action is queued as a
//! [`Notification`] and the table is rebuilt from the backend afterwards,
//! whether the action succeeded or not.
//!
//! The item dialog edits a copy of the record in a [`CardController`].
//! Nothing reaches the backend until [`save`](CrudController::save) is
//! called, and [`cancel`](CrudController::cancel) drops the copy.
//!
//! Like cards, controllers are single-threaded; their futures are not `Send`.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crudform_core::error::{CrudError, CrudResult};
use crudform_core::logging::crud_span;
use crudform_core::settings::CrudConfig;
use crudform_forms::{default_registry, CardController, CardView, HandlerRegistry};
use crudform_model::json::records_from_json;
use crudform_model::{ModelSchema, Record, Value};

use crate::hooks::{BackendOptions, CrudBackend, InMemoryBackend};
use crate::notifications::{Notification, NotificationStore};
use crate::table::{Row, Table};

/// Called after a field of the dialog's record changes, with the field name
/// and the record. May modify the record.
pub type ChangeExtra = Rc<dyn Fn(&str, &mut Record)>;

/// Whether the item dialog creates a new record or updates a stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Update,
}

/// The open item dialog.
pub struct ItemDialog {
    mode: DialogMode,
    heading: String,
    card: CardController,
}

impl ItemDialog {
    pub const fn mode(&self) -> DialogMode {
        self.mode
    }

    /// Returns the dialog heading.
    pub fn heading(&self) -> &str {
        &self.heading
    }

    /// Returns the card editing the dialog's record.
    pub const fn card(&self) -> &CardController {
        &self.card
    }
}

impl fmt::Debug for ItemDialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemDialog")
            .field("mode", &self.mode)
            .field("heading", &self.heading)
            .finish_non_exhaustive()
    }
}

/// A table of records with create, update and delete actions.
pub struct CrudController {
    schema: Arc<ModelSchema>,
    backend: Arc<dyn CrudBackend>,
    registry: Arc<HandlerRegistry>,
    config: CrudConfig,
    records: Vec<Record>,
    table: Table,
    dialog: Option<ItemDialog>,
    notifications: NotificationStore,
    on_change_extra: Option<ChangeExtra>,
    span: tracing::Span,
}

impl CrudController {
    /// Creates a controller over `backend` and loads the table.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::ImproperlyConfigured`] if `config.id_field` is not
    /// a field of `schema`, and propagates the backend's error if the records
    /// cannot be loaded.
    pub async fn new(
        schema: Arc<ModelSchema>,
        backend: Arc<dyn CrudBackend>,
        config: CrudConfig,
    ) -> CrudResult<Self> {
        if !schema.has_field(&config.id_field) {
            return Err(CrudError::ImproperlyConfigured(format!(
                "id field '{}' not in model {}",
                config.id_field,
                schema.name()
            )));
        }
        let records = backend.all().await?;
        let mut controller = Self {
            span: crud_span(schema.name()),
            schema,
            backend,
            registry: default_registry(),
            config,
            records,
            table: Table::default(),
            dialog: None,
            notifications: NotificationStore::new(),
            on_change_extra: None,
        };
        controller.rebuild_table();
        controller
            .span
            .in_scope(|| tracing::debug!(rows = controller.table.len(), "table loaded"));
        Ok(controller)
    }

    /// Creates a controller over an [`InMemoryBackend`] holding `records`.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub async fn from_records(
        schema: Arc<ModelSchema>,
        records: Vec<Record>,
        config: CrudConfig,
    ) -> CrudResult<Self> {
        let backend = InMemoryBackend::new(&schema, config.id_field.clone(), records)
            .with_id_label(id_label_of(&schema, &config));
        Self::new(schema, Arc::new(backend), config).await
    }

    /// Creates a controller over an [`InMemoryBackend`] seeded from a JSON
    /// array of objects, such as the body of a list endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::SerializationError`] if `text` is not a JSON
    /// array, [`CrudError::Validation`] if an item does not validate, and
    /// otherwise see [`new`](Self::new).
    pub async fn from_json(
        schema: Arc<ModelSchema>,
        text: &str,
        config: CrudConfig,
    ) -> CrudResult<Self> {
        let records = records_from_json(&schema, text).map_err(|e| {
            tracing::error!(model = schema.name(), error = %e, "invalid data");
            e
        })?;
        Self::from_records(schema, records, config).await
    }

    /// Resolves widgets of the item dialog through `registry` instead of the
    /// process-wide default.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<HandlerRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the hook called after a field of the dialog's record changes.
    #[must_use]
    pub fn on_change_extra(mut self, hook: impl Fn(&str, &mut Record) + 'static) -> Self {
        self.on_change_extra = Some(Rc::new(hook));
        self
    }

    pub const fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    pub const fn config(&self) -> &CrudConfig {
        &self.config
    }

    /// Returns the records as last loaded from the backend.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Returns the record with identifier `id`.
    pub fn get_by_id(&self, id: &Value) -> Option<&Record> {
        self.records
            .iter()
            .find(|r| r.value(&self.config.id_field) == *id)
    }

    // ── Table ───────────────────────────────────────────────────────

    pub const fn table(&self) -> &Table {
        &self.table
    }

    /// Returns the rows matching `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<&Row> {
        self.table.search(query)
    }

    /// Reloads the records from the backend and rebuilds the table. A failed
    /// load keeps the previous records and queues a notification.
    pub async fn refresh(&mut self) {
        match self.backend.all().await {
            Ok(records) => self.records = records,
            Err(e) => {
                tracing::error!(parent: &self.span, error = %e, "reloading records failed");
                self.notifications.negative(format!("Error loading: {e}"));
            }
        }
        self.rebuild_table();
    }

    fn rebuild_table(&mut self) {
        self.table = Table::build(&self.schema, &self.records, &self.config, &self.id_label());
    }

    // ── Labels ──────────────────────────────────────────────────────

    /// Returns the label shown before identifiers.
    pub fn id_label(&self) -> String {
        id_label_of(&self.schema, &self.config)
    }

    pub fn heading(&self) -> Option<&str> {
        self.config.heading.as_deref()
    }

    /// Returns the label of the search input.
    pub fn search_input_label(&self) -> String {
        self.config.search_input_label.clone().unwrap_or_else(|| {
            format!("Search {}", self.schema.declared_title().unwrap_or("table"))
        })
    }

    /// Returns the heading of the dialog that creates an item.
    pub fn new_item_dialog_heading(&self) -> String {
        self.config.new_item_dialog_heading.clone().unwrap_or_else(|| {
            self.schema
                .declared_title()
                .map_or_else(|| "Add item".to_string(), |t| format!("Add {t}"))
        })
    }

    /// Returns the heading of the dialog that updates an item, without the
    /// identifier that follows it.
    pub fn update_item_dialog_heading(&self) -> String {
        self.config.update_item_dialog_heading.clone().unwrap_or_else(|| {
            self.schema
                .declared_title()
                .map_or_else(|| "Update item".to_string(), |t| format!("Update {t}"))
        })
    }

    /// Returns the text shown when the table is empty.
    pub fn no_data_label(&self) -> &str {
        &self.config.no_data_label
    }

    // ── Item dialog ─────────────────────────────────────────────────

    /// Returns the open item dialog.
    pub const fn dialog(&self) -> Option<&ItemDialog> {
        self.dialog.as_ref()
    }

    /// Returns `true` if the dialog's record validates.
    pub fn can_save(&self) -> bool {
        self.dialog.as_ref().is_some_and(|d| d.card.is_valid())
    }

    /// Builds the record a new item starts from.
    ///
    /// Models whose fields all have defaults start from the defaults.
    /// Otherwise the first stored record is copied, and a string identifier is
    /// replaced by `New <title>`.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::NoTemplate`] if neither works.
    pub fn template(&self) -> CrudResult<Record> {
        if self.schema.defaults_given() {
            return Ok(self.schema.instantiate()?);
        }
        let Some(first) = self.records.first() else {
            return Err(CrudError::NoTemplate(self.schema.name().to_string()));
        };
        tracing::debug!(
            parent: &self.span,
            "no defaults for every field; copying the first record"
        );
        let mut template = first.clone();
        if matches!(template.get(&self.config.id_field), Some(Value::String(_))) {
            let new_id = format!("New {}", self.schema.declared_title().unwrap_or("item"));
            if let Err(e) = template.set(&self.config.id_field, new_id) {
                tracing::debug!(parent: &self.span, error = %e, "template keeps the copied id");
            }
        }
        Ok(template)
    }

    /// Opens the dialog that creates an item and returns its first render.
    ///
    /// Returns `Ok(None)` without opening a dialog if no template can be
    /// built; a notification says why.
    ///
    /// # Errors
    ///
    /// Propagates render errors of the dialog's card.
    pub async fn open_create(&mut self) -> CrudResult<Option<CardView>> {
        let template = match self.template() {
            Ok(template) => template,
            Err(e) => {
                tracing::error!(parent: &self.span, error = %e, "cannot open create dialog");
                self.notifications.negative(e.to_string());
                return Ok(None);
            }
        };
        let heading = self.new_item_dialog_heading();
        self.open_dialog(DialogMode::Create, heading, template).await.map(Some)
    }

    /// Opens the dialog that updates the record with identifier `id` and
    /// returns its first render. The dialog edits a copy; the identifier is
    /// not editable.
    ///
    /// Returns `Ok(None)` if there is no such record.
    ///
    /// # Errors
    ///
    /// Propagates render errors of the dialog's card.
    pub async fn open_update(&mut self, id: &Value) -> CrudResult<Option<CardView>> {
        let Some(record) = self.get_by_id(id).cloned() else {
            tracing::error!(parent: &self.span, id = %id, "could not find record to edit");
            return Ok(None);
        };
        let heading = format!("{} {id}", self.update_item_dialog_heading());
        self.open_dialog(DialogMode::Update, heading, record).await.map(Some)
    }

    async fn open_dialog(
        &mut self,
        mode: DialogMode,
        heading: String,
        record: Record,
    ) -> CrudResult<CardView> {
        let mut card = CardController::new(record, Arc::clone(&self.registry))
            .with_config(self.config.clone())
            .id_editable(mode == DialogMode::Create);
        if let Some(hook) = &self.on_change_extra {
            let hook = Rc::clone(hook);
            card = card.on_change(move |field, record| hook(field, record));
        }
        let view = card.mount(&BackendOptions(self.backend.as_ref())).await?;
        tracing::debug!(parent: &self.span, ?mode, "dialog opened");
        if self.dialog.replace(ItemDialog { mode, heading, card }).is_some() {
            tracing::warn!(parent: &self.span, "discarding unsaved item dialog");
        }
        Ok(view)
    }

    /// Persists the dialog's record, closes the dialog and reloads the table.
    ///
    /// Returns `true` if the backend accepted the record. A record that does
    /// not validate is not saved and the dialog stays open.
    pub async fn save(&mut self) -> bool {
        let Some(dialog) = self.dialog.take() else {
            tracing::warn!(parent: &self.span, "save without an open dialog");
            return false;
        };
        if !dialog.card.is_valid() {
            tracing::warn!(parent: &self.span, "refusing to save a record that does not validate");
            self.dialog = Some(dialog);
            return false;
        }

        let record = dialog.card.record();
        let id = record.value(&self.config.id_field);
        let title = self.schema.display_title().to_string();
        let saved = match dialog.mode {
            DialogMode::Create => match self.backend.create(record).await {
                Ok(()) => {
                    tracing::debug!(parent: &self.span, id = %id, "added");
                    self.notifications.positive(format!("Added {title} with new ID: {id}"));
                    true
                }
                Err(e) => {
                    tracing::error!(parent: &self.span, id = %id, error = %e, "adding failed");
                    self.notifications.negative(format!("Error adding model: {e}"));
                    false
                }
            },
            DialogMode::Update => match self.backend.update(record).await {
                Ok(()) => {
                    tracing::debug!(parent: &self.span, id = %id, "updated");
                    self.notifications.positive(format!("Updated {title} {id}"));
                    true
                }
                Err(e) => {
                    tracing::error!(parent: &self.span, id = %id, error = %e, "updating failed");
                    self.notifications.negative(format!("Error updating: {e}"));
                    false
                }
            },
        };
        self.refresh().await;
        saved
    }

    /// Closes the dialog without saving. Returns `true` if one was open.
    pub fn cancel(&mut self) -> bool {
        let open = self.dialog.take().is_some();
        if open {
            tracing::debug!(parent: &self.span, "dialog cancelled");
        }
        open
    }

    // ── Deletion ────────────────────────────────────────────────────

    /// Deletes the record with identifier `id` and reloads the table.
    /// Returns `true` on success.
    pub async fn delete(&mut self, id: &Value) -> bool {
        let deleted = self.delete_one(id).await;
        if deleted {
            let title = self.schema.display_title().to_string();
            self.notifications.positive(format!("Deleted {title} {id}"));
        }
        self.refresh().await;
        deleted
    }

    /// Deletes the records with identifiers `ids` in order, stopping at the
    /// first failure, and reloads the table. Null identifiers are skipped.
    /// Returns the number of deleted records.
    pub async fn delete_selected(&mut self, ids: &[Value]) -> usize {
        let mut deleted = 0;
        let mut failed = false;
        for id in ids.iter().filter(|id| !id.is_null()) {
            if !self.delete_one(id).await {
                failed = true;
                break;
            }
            deleted += 1;
        }
        if !failed {
            self.notifications.positive(format!("{} deleted", ids.len()));
        }
        self.refresh().await;
        deleted
    }

    async fn delete_one(&mut self, id: &Value) -> bool {
        match self.backend.delete(id).await {
            Ok(()) => {
                tracing::debug!(parent: &self.span, id = %id, "deleted");
                true
            }
            Err(e) => {
                tracing::error!(parent: &self.span, id = %id, error = %e, "deletion failed");
                self.notifications.negative(format!("Error deleting: {e}"));
                false
            }
        }
    }

    // ── Notifications ───────────────────────────────────────────────

    pub const fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    /// Removes and returns the queued notifications.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }
}

impl fmt::Debug for CrudController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrudController")
            .field("model", &self.schema.name())
            .field("rows", &self.table.len())
            .field("dialog", &self.dialog)
            .finish_non_exhaustive()
    }
}

/// The configured identifier label, else the identifier field's title
/// followed by a colon, else the model title followed by ` ID:`.
fn id_label_of(schema: &ModelSchema, config: &CrudConfig) -> String {
    if let Some(label) = &config.id_label {
        return label.clone();
    }
    if let Some(title) = schema.get_field(&config.id_field).and_then(|f| f.title.as_deref()) {
        return format!("{title}:");
    }
    schema
        .declared_title()
        .map_or_else(|| "ID:".to_string(), |t| format!("{t} ID:"))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use crudform_forms::WidgetValue;
    use crudform_model::{FieldDescriptor, TypeTag};

    use super::*;
    use crate::notifications::NotificationLevel;

    fn planet() -> Arc<ModelSchema> {
        ModelSchema::new("Planet")
            .title("Planet")
            .field(FieldDescriptor::new("name", TypeTag::String))
            .field(FieldDescriptor::new("moons", TypeTag::Integer).ge(0.0))
            .build()
    }

    fn planets() -> Vec<Record> {
        [("Earth", 1), ("Mars", 2)]
            .into_iter()
            .map(|(name, moons)| {
                let mut r = planet().placeholder_instance();
                r.set("name", name).unwrap();
                r.set("moons", moons).unwrap();
                r
            })
            .collect()
    }

    async fn controller() -> CrudController {
        CrudController::from_records(planet(), planets(), CrudConfig::new("name"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_unknown_id_field_is_rejected() {
        let err = CrudController::from_records(planet(), planets(), CrudConfig::new("id"))
            .await
            .unwrap_err();
        assert!(matches!(err, CrudError::ImproperlyConfigured(_)));
    }

    #[tokio::test]
    async fn test_labels_derive_from_titles() {
        let c = controller().await;
        assert_eq!(c.id_label(), "Planet ID:");
        assert_eq!(c.new_item_dialog_heading(), "Add Planet");
        assert_eq!(c.update_item_dialog_heading(), "Update Planet");
        assert_eq!(c.search_input_label(), "Search Planet");
        assert_eq!(c.heading(), None);
        assert_eq!(c.no_data_label(), "No data given");
    }

    #[test]
    fn test_id_label_precedence() {
        let untitled = ModelSchema::new("Thing")
            .field(FieldDescriptor::new("code", TypeTag::String))
            .build();
        assert_eq!(id_label_of(&untitled, &CrudConfig::new("code")), "ID:");

        let titled_field = ModelSchema::new("Thing")
            .title("Thing")
            .field(FieldDescriptor::new("code", TypeTag::String).title("Code"))
            .build();
        assert_eq!(id_label_of(&titled_field, &CrudConfig::new("code")), "Code:");

        let mut config = CrudConfig::new("code");
        config.id_label = Some("#".into());
        assert_eq!(id_label_of(&titled_field, &config), "#");
    }

    #[tokio::test]
    async fn test_template_copies_first_record() {
        let c = controller().await;
        let template = c.template().unwrap();
        assert_eq!(template.value("name"), Value::from("New Planet"));
        assert_eq!(template.value("moons"), Value::Int(1));
        assert_eq!(c.records()[0].value("name"), Value::from("Earth"));
    }

    #[tokio::test]
    async fn test_no_template_notifies() {
        let mut c = CrudController::from_records(planet(), Vec::new(), CrudConfig::new("name"))
            .await
            .unwrap();
        assert!(c.open_create().await.unwrap().is_none());
        assert!(c.dialog().is_none());
        let shown = c.drain_notifications();
        assert_eq!(shown[0].level, NotificationLevel::Negative);
        assert_eq!(shown[0].text, "No template for Planet");
    }

    #[tokio::test]
    async fn test_create_flow() {
        let mut c = controller().await;
        let view = c.open_create().await.unwrap().unwrap();
        assert_eq!(view.fields[0].name, "name");
        assert_eq!(c.dialog().unwrap().mode(), DialogMode::Create);
        assert_eq!(c.dialog().unwrap().heading(), "Add Planet");

        let card = c.dialog().unwrap().card();
        assert!(card.input("name", WidgetValue::from("Venus")).unwrap());
        assert!(card.input("moons", WidgetValue::Number(0.0)).unwrap());
        assert!(c.can_save());

        assert!(c.save().await);
        assert!(c.dialog().is_none());
        assert_eq!(c.table().len(), 3);
        assert_eq!(c.drain_notifications()[0].text, "Added Planet with new ID: Venus");
    }

    #[tokio::test]
    async fn test_invalid_record_is_not_saved() {
        let mut c = controller().await;
        c.open_create().await.unwrap();
        let card = c.dialog().unwrap().card();
        card.input("moons", WidgetValue::Number(-1.0)).unwrap();
        assert!(!card.is_valid());
        assert!(!c.can_save());
        assert!(!c.save().await);
        assert!(c.dialog().is_some());
        assert_eq!(c.table().len(), 2);
    }

    #[tokio::test]
    async fn test_update_flow_hides_id() {
        let mut c = controller().await;
        let view = c.open_update(&Value::from("Mars")).await.unwrap().unwrap();
        assert!(view.fields.iter().all(|f| f.name != "name"));
        assert_eq!(c.dialog().unwrap().heading(), "Update Planet Mars");

        c.dialog().unwrap().card().input("moons", WidgetValue::Number(3.0)).unwrap();
        assert_eq!(c.get_by_id(&Value::from("Mars")).unwrap().value("moons"), Value::Int(2));

        assert!(c.save().await);
        assert_eq!(c.get_by_id(&Value::from("Mars")).unwrap().value("moons"), Value::Int(3));
        assert_eq!(c.drain_notifications()[0].text, "Updated Planet Mars");
    }

    #[tokio::test]
    async fn test_open_update_unknown_id() {
        let mut c = controller().await;
        assert!(c.open_update(&Value::from("Pluto")).await.unwrap().is_none());
        assert!(c.dialog().is_none());
        assert!(c.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_discards_edits() {
        let mut c = controller().await;
        c.open_update(&Value::from("Earth")).await.unwrap();
        c.dialog().unwrap().card().input("moons", WidgetValue::Number(7.0)).unwrap();
        assert!(c.cancel());
        assert!(!c.cancel());
        assert_eq!(c.get_by_id(&Value::from("Earth")).unwrap().value("moons"), Value::Int(1));
    }

    #[tokio::test]
    async fn test_delete_notifies() {
        let mut c = controller().await;
        assert!(c.delete(&Value::from("Earth")).await);
        assert!(!c.delete(&Value::from("Earth")).await);
        let shown = c.drain_notifications();
        assert_eq!(shown[0].text, "Deleted Planet Earth");
        assert_eq!(shown[1].text, "Error deleting: Planet(Planet ID:=Earth) does not exist");
        assert_eq!(c.table().len(), 1);
    }

    #[tokio::test]
    async fn test_change_hook_reaches_dialog() {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let mut c = controller().await.on_change_extra(move |_, _| seen.set(seen.get() + 1));
        c.open_create().await.unwrap();
        c.dialog().unwrap().card().input("moons", WidgetValue::Number(4.0)).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_dialog_uses_own_registry() {
        let registry = Arc::new(HandlerRegistry::with_builtins());
        let mut c = controller().await.with_registry(Arc::clone(&registry));
        assert_eq!(registry.cached(), 0);
        c.open_update(&Value::from("Earth")).await.unwrap();
        assert_eq!(registry.cached(), 1);
    }
}
