//! The per-field input context.

use std::fmt;

use crudform_core::settings::CrudConfig;
use crudform_model::{FieldDescriptor, Record, Value};

use crate::options::OptionMap;

/// Everything a handler may consult while rendering a field or reacting to
/// its input.
///
/// A context is built fresh for every render pass and every input event and is
/// never reused. `owning_object` is a snapshot of the record taken for that
/// pass, so a handler never observes a half-applied commit.
pub struct InputContext<'a> {
    /// The field name.
    pub field_name: &'a str,
    /// The field's metadata.
    pub descriptor: &'a FieldDescriptor,
    /// The field's value in the snapshot.
    pub current_value: Value,
    /// Whether the declared type was `Optional`.
    pub optional: bool,
    /// Whether edits are rejected.
    pub disabled: bool,
    /// The card configuration.
    pub config: &'a CrudConfig,
    /// Snapshot of the record being edited.
    pub owning_object: &'a Record,
    /// Externally supplied select options.
    pub select_options: Option<&'a OptionMap>,
    commit: &'a dyn Fn(Value) -> bool,
}

impl<'a> InputContext<'a> {
    /// Creates a context for `descriptor` over `owning_object`.
    ///
    /// `commit` applies a new value through the owner's validated commit path
    /// and reports whether it was accepted.
    pub fn new(
        descriptor: &'a FieldDescriptor,
        owning_object: &'a Record,
        config: &'a CrudConfig,
        commit: &'a dyn Fn(Value) -> bool,
    ) -> Self {
        Self {
            field_name: &descriptor.name,
            descriptor,
            current_value: owning_object.value(&descriptor.name),
            optional: descriptor.declared_type().is_optional(),
            disabled: descriptor.extra_options.readonly,
            config,
            owning_object,
            select_options: None,
            commit,
        }
    }

    /// Marks the field as not editable.
    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = self.disabled || disabled;
        self
    }

    /// Supplies options fetched from the select-options hook.
    #[must_use]
    pub const fn select_options(mut self, options: Option<&'a OptionMap>) -> Self {
        self.select_options = options;
        self
    }

    /// Applies `value` to the field. Returns `true` if it was accepted.
    pub fn commit(&self, value: Value) -> bool {
        (self.commit)(value)
    }
}

impl fmt::Debug for InputContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputContext")
            .field("field_name", &self.field_name)
            .field("current_value", &self.current_value)
            .field("optional", &self.optional)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use crudform_model::{ModelSchema, TypeTag};

    use super::*;

    #[test]
    fn test_context_reads_snapshot_and_commits() {
        let schema = ModelSchema::new("Note")
            .field(
                FieldDescriptor::new("text", TypeTag::optional(TypeTag::String))
                    .default("hi")
                    .readonly(),
            )
            .build();
        let record = schema.instantiate().unwrap();
        let config = CrudConfig::default();
        let seen = RefCell::new(Vec::new());
        let commit = |v: Value| {
            seen.borrow_mut().push(v);
            true
        };
        let field = &schema.fields()[0];
        let ctx = InputContext::new(field, &record, &config, &commit);

        assert_eq!(ctx.field_name, "text");
        assert_eq!(ctx.current_value, Value::from("hi"));
        assert!(ctx.optional);
        assert!(ctx.disabled);
        assert!(ctx.select_options.is_none());
        assert!(ctx.commit(Value::from("bye")));
        assert_eq!(seen.borrow().as_slice(), &[Value::from("bye")]);
    }

    #[test]
    fn test_disabled_is_sticky() {
        let schema = ModelSchema::new("N")
            .field(FieldDescriptor::new("id", TypeTag::Integer).default(1))
            .build();
        let record = schema.instantiate().unwrap();
        let config = CrudConfig::default();
        let commit = |_: Value| false;
        let ctx = InputContext::new(&schema.fields()[0], &record, &config, &commit)
            .disabled(true)
            .disabled(false);
        assert!(ctx.disabled);
    }
}
