//! Select-option sources.
//!
//! Select and multiselect fields without static `selections` ask an
//! asynchronous [`SelectOptionsSource`] for their options when a card is
//! mounted.

use async_trait::async_trait;
use crudform_core::error::CrudResult;
use crudform_model::Record;
use indexmap::IndexMap;

/// Option value to display label.
pub type OptionMap = IndexMap<String, String>;

/// Supplies select options for a field of a record.
#[async_trait]
pub trait SelectOptionsSource: Send + Sync {
    /// Returns the options for `field` while `record` is being edited.
    async fn select_options(&self, field: &str, record: &Record) -> CrudResult<OptionMap>;
}

/// A source that never offers options.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSelectOptions;

#[async_trait]
impl SelectOptionsSource for NoSelectOptions {
    async fn select_options(&self, _field: &str, _record: &Record) -> CrudResult<OptionMap> {
        Ok(OptionMap::new())
    }
}

#[cfg(test)]
mod tests {
    use crudform_model::{FieldDescriptor, ModelSchema, TypeTag};

    use super::*;

    #[test]
    fn test_no_select_options_is_empty() {
        let schema = ModelSchema::new("Pet")
            .field(FieldDescriptor::new("kind", TypeTag::String).default("cat"))
            .build();
        let record = schema.placeholder_instance();
        let options =
            tokio_test::block_on(NoSelectOptions.select_options("kind", &record)).unwrap();
        assert!(options.is_empty());
    }
}
