//! Persistence hooks.
//!
//! A [`CrudController`](crate::CrudController) never touches storage itself;
//! every read and write goes through a [`CrudBackend`]. Hosts implement the
//! trait over their database. [`InMemoryBackend`] keeps the records in a
//! vector and is what a controller built from a plain list uses.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use crudform_core::error::{CrudError, CrudResult};
use crudform_forms::{OptionMap, SelectOptionsSource};
use crudform_model::{ModelSchema, Record, Value};

/// Storage operations behind a CRUD table.
///
/// Errors returned here are shown to the user as notifications, so their
/// messages should make sense on their own.
#[async_trait]
pub trait CrudBackend: Send + Sync {
    /// Returns every stored record in display order.
    async fn all(&self) -> CrudResult<Vec<Record>>;

    /// Stores a new record.
    ///
    /// Returns [`CrudError::AlreadyExists`] if its identifier is taken.
    async fn create(&self, record: Record) -> CrudResult<()>;

    /// Replaces the stored record that has the same identifier.
    ///
    /// Returns [`CrudError::NotFound`] if there is none and
    /// [`CrudError::Duplicate`] if there is more than one.
    async fn update(&self, record: Record) -> CrudResult<()>;

    /// Deletes the record with identifier `id`.
    ///
    /// Returns [`CrudError::NotFound`] if there is none.
    async fn delete(&self, id: &Value) -> CrudResult<()>;

    /// Returns the options of a select field without static selections,
    /// mapping option values to labels. The default offers none.
    async fn select_options(&self, field: &str, record: &Record) -> CrudResult<OptionMap> {
        let _ = (field, record);
        Ok(OptionMap::new())
    }
}

/// Offers a backend's select options to a card.
#[derive(Clone, Copy)]
pub struct BackendOptions<'a>(pub &'a dyn CrudBackend);

#[async_trait]
impl SelectOptionsSource for BackendOptions<'_> {
    async fn select_options(&self, field: &str, record: &Record) -> CrudResult<OptionMap> {
        self.0.select_options(field, record).await
    }
}

/// A [`CrudBackend`] over a vector of records.
///
/// Clones share the same storage.
///
/// # Examples
///
/// ```
/// use crudform_admin::hooks::{CrudBackend, InMemoryBackend};
/// use crudform_model::{FieldDescriptor, ModelSchema, TypeTag};
///
/// let schema = ModelSchema::new("Tag")
///     .field(FieldDescriptor::new("name", TypeTag::String))
///     .build();
/// let backend = InMemoryBackend::new(&schema, "name", Vec::new());
/// assert_eq!(backend.count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    schema: Arc<ModelSchema>,
    id_field: String,
    id_label: String,
    records: Arc<RwLock<Vec<Record>>>,
}

impl InMemoryBackend {
    /// Creates a backend holding `records`, identified by `id_field`.
    pub fn new(
        schema: &Arc<ModelSchema>,
        id_field: impl Into<String>,
        records: Vec<Record>,
    ) -> Self {
        let id_field = id_field.into();
        Self {
            schema: Arc::clone(schema),
            id_label: id_field.clone(),
            id_field,
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Sets the identifier label used in error messages. Defaults to the
    /// identifier field name.
    #[must_use]
    pub fn with_id_label(mut self, label: impl Into<String>) -> Self {
        self.id_label = label.into();
        self
    }

    /// Returns the number of stored records.
    pub fn count(&self) -> usize {
        self.records.read().expect("records lock poisoned").len()
    }

    /// Returns a copy of the stored records.
    pub fn records(&self) -> Vec<Record> {
        self.records.read().expect("records lock poisoned").clone()
    }

    fn id_of(&self, record: &Record) -> Value {
        record.value(&self.id_field)
    }

    fn describe(&self, id: &Value) -> String {
        format!("{}({}={id})", self.schema.display_title(), self.id_label)
    }
}

#[async_trait]
impl CrudBackend for InMemoryBackend {
    async fn all(&self) -> CrudResult<Vec<Record>> {
        Ok(self.records())
    }

    async fn create(&self, record: Record) -> CrudResult<()> {
        let id = self.id_of(&record);
        let mut records = self.records.write().expect("records lock poisoned");
        if records.iter().any(|r| self.id_of(r) == id) {
            return Err(CrudError::AlreadyExists(format!(
                "{} already exists",
                self.describe(&id)
            )));
        }
        records.push(record);
        tracing::debug!(id = %id, "record created");
        Ok(())
    }

    async fn update(&self, record: Record) -> CrudResult<()> {
        let id = self.id_of(&record);
        let mut records = self.records.write().expect("records lock poisoned");
        let matching: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| self.id_of(r) == id)
            .map(|(i, _)| i)
            .collect();
        match matching.as_slice() {
            [] => Err(CrudError::NotFound(format!("{} does not exist", self.describe(&id)))),
            [index] => {
                records[*index] = record;
                tracing::debug!(id = %id, "record updated");
                Ok(())
            }
            _ => Err(CrudError::Duplicate(format!("{} has duplicates", self.describe(&id)))),
        }
    }

    async fn delete(&self, id: &Value) -> CrudResult<()> {
        let mut records = self.records.write().expect("records lock poisoned");
        let Some(index) = records.iter().position(|r| self.id_of(r) == *id) else {
            return Err(CrudError::NotFound(format!("{} does not exist", self.describe(id))));
        };
        records.remove(index);
        tracing::debug!(id = %id, "record deleted");
        Ok(())
    }

    /// Offers every distinct value the stored records hold for `field`.
    /// List values contribute their elements and map values their keys.
    async fn select_options(&self, field: &str, _record: &Record) -> CrudResult<OptionMap> {
        if !self.schema.has_field(field) {
            tracing::error!(field, model = self.schema.name(), "select options for unknown field");
            return Ok(OptionMap::new());
        }
        let records = self.records.read().expect("records lock poisoned");
        let mut options = OptionMap::new();
        for record in records.iter() {
            match record.value(field) {
                Value::Null => {}
                Value::List(items) => {
                    for item in items {
                        let key = item.to_string();
                        options.insert(key.clone(), key);
                    }
                }
                Value::Map(map) => {
                    for key in map.keys() {
                        options.insert(key.clone(), key.clone());
                    }
                }
                Value::Object(_) => {
                    tracing::warn!(field, "no select options for nested objects");
                    return Ok(OptionMap::new());
                }
                scalar => {
                    let key = scalar.to_string();
                    options.insert(key.clone(), key);
                }
            }
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use crudform_model::{FieldDescriptor, TypeTag};

    use super::*;

    fn town() -> Arc<ModelSchema> {
        ModelSchema::new("Town")
            .title("Town")
            .field(FieldDescriptor::new("id", TypeTag::Integer))
            .field(FieldDescriptor::new("region", TypeTag::String))
            .field(
                FieldDescriptor::new("tags", TypeTag::list_of(TypeTag::String))
                    .default(Vec::<String>::new()),
            )
            .build()
    }

    fn record(id: i64, region: &str, tags: &[&str]) -> Record {
        let mut r = town().placeholder_instance();
        r.set("id", id).unwrap();
        r.set("region", region).unwrap();
        r.set("tags", tags.to_vec()).unwrap();
        r
    }

    fn backend() -> InMemoryBackend {
        InMemoryBackend::new(
            &town(),
            "id",
            vec![record(1, "Shire", &["green", "quiet"]), record(2, "Gondor", &["stone"])],
        )
        .with_id_label("ID:")
    }

    #[tokio::test]
    async fn test_create_rejects_existing_id() {
        let db = backend();
        db.create(record(3, "Rohan", &[])).await.unwrap();
        assert_eq!(db.count(), 3);

        let err = db.create(record(1, "Mordor", &[])).await.unwrap_err();
        assert!(matches!(err, CrudError::AlreadyExists(_)));
        assert_eq!(err.to_string(), "Town(ID:=1) already exists");
        assert_eq!(db.count(), 3);
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let db = backend();
        db.update(record(2, "Minas Tirith", &[])).await.unwrap();
        let stored = db.all().await.unwrap();
        assert_eq!(stored[1].value("region"), Value::from("Minas Tirith"));
        assert_eq!(stored[1].value("tags"), Value::List(vec![]));
    }

    #[tokio::test]
    async fn test_update_missing_and_duplicate() {
        let db = backend();
        let err = db.update(record(9, "Nowhere", &[])).await.unwrap_err();
        assert!(matches!(err, CrudError::NotFound(_)));
        assert_eq!(err.to_string(), "Town(ID:=9) does not exist");

        db.records.write().unwrap().push(record(2, "Copy", &[]));
        let err = db.update(record(2, "Either", &[])).await.unwrap_err();
        assert!(matches!(err, CrudError::Duplicate(_)));
        assert_eq!(db.records()[1].value("region"), Value::from("Gondor"));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = backend();
        db.delete(&Value::Int(1)).await.unwrap();
        assert_eq!(db.count(), 1);
        let err = db.delete(&Value::Int(1)).await.unwrap_err();
        assert!(err.is_persistence());
        assert_eq!(err.to_string(), "Town(ID:=1) does not exist");
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let db = backend();
        let other = db.clone();
        other.delete(&Value::Int(2)).await.unwrap();
        assert_eq!(db.count(), 1);
    }

    #[tokio::test]
    async fn test_select_options_distinct_values() {
        let db = backend();
        db.create(record(3, "Shire", &["green"])).await.unwrap();
        let current = record(0, "", &[]);

        let regions = db.select_options("region", &current).await.unwrap();
        assert_eq!(regions.keys().collect::<Vec<_>>(), vec!["Shire", "Gondor"]);

        let tags = db.select_options("tags", &current).await.unwrap();
        assert_eq!(tags.keys().collect::<Vec<_>>(), vec!["green", "quiet", "stone"]);

        assert!(db.select_options("missing", &current).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backend_options_adapter() {
        let db = backend();
        let source = BackendOptions(&db);
        let options = source.select_options("region", &record(0, "", &[])).await.unwrap();
        assert_eq!(options.len(), 2);
    }
}
