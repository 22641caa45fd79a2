use crudform_model::{FieldDescriptor, InputType, TypeTag, Value};
use indexmap::IndexMap;

use super::{reject_input, InputHandler};
use crate::context::InputContext;
use crate::options::OptionMap;
use crate::widgets::{Widget, WidgetKind, WidgetValue};

/// Renders literal fields, and fields hinted `select` or `multiselect`, as a
/// select.
///
/// Options come from the literal values, else the field's `selections`, else
/// the externally supplied options, else the current value itself. A single
/// select whose current value is not among the options displays the first
/// option; nothing is committed until the user picks one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionHandler;

impl SelectionHandler {
    fn options(ctx: &InputContext<'_>) -> OptionMap {
        if let TypeTag::Literal(values) = ctx.descriptor.effective_type().0 {
            return values
                .iter()
                .map(|v| (v.to_string(), v.to_string()))
                .collect();
        }
        if let Some(selections) = ctx
            .descriptor
            .extra_options
            .selections
            .as_ref()
            .filter(|s| !s.is_empty())
        {
            return selections.clone();
        }
        if let Some(options) = ctx.select_options.filter(|o| !o.is_empty()) {
            return options.clone();
        }
        current_keys(&ctx.current_value)
            .into_iter()
            .map(|k| (k.clone(), k))
            .collect()
    }

    fn is_multiple(ctx: &InputContext<'_>) -> bool {
        ctx.descriptor.hint() == Some(InputType::Multiselect)
    }
}

/// The string keys of the current value: list items, map keys, or the scalar.
fn current_keys(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::List(items) => items.iter().map(ToString::to_string).collect(),
        Value::Map(map) => map.keys().cloned().collect(),
        other => vec![other.to_string()],
    }
}

impl InputHandler for SelectionHandler {
    fn can_handle(&self, descriptor: &FieldDescriptor) -> bool {
        matches!(descriptor.effective_type().0, TypeTag::Literal(_))
            || matches!(
                descriptor.hint(),
                Some(InputType::Select | InputType::Multiselect)
            )
    }

    fn create_widget(&self, ctx: &InputContext<'_>) -> Option<Widget> {
        let options = Self::options(ctx);
        let multiple = Self::is_multiple(ctx);
        let map_typed = *ctx.descriptor.effective_type().0 == TypeTag::MapStringToAny;

        let value = if multiple || map_typed {
            WidgetValue::Choices(current_keys(&ctx.current_value))
        } else {
            let mut selected = ctx.current_value.to_string();
            if !options.is_empty() && !options.contains_key(&selected) {
                if let Some(first) = options.keys().next() {
                    tracing::debug!(
                        field = ctx.field_name,
                        current = %selected,
                        shown = %first,
                        "current value not among options"
                    );
                    selected.clone_from(first);
                }
            }
            WidgetValue::Text(selected)
        };

        let kind = WidgetKind::Select {
            options,
            multiple,
            chips: multiple,
        };
        Some(Widget::new(ctx, kind, value).clearable(ctx.optional))
    }

    fn handle_input(&self, ctx: &InputContext<'_>, input: WidgetValue) -> bool {
        let map_typed = *ctx.descriptor.effective_type().0 == TypeTag::MapStringToAny;
        match input {
            WidgetValue::Choices(keys) if map_typed => {
                let map: IndexMap<String, Value> =
                    keys.into_iter().map(|k| (k, Value::Null)).collect();
                ctx.commit(Value::Map(map))
            }
            WidgetValue::Choices(keys) => {
                ctx.commit(Value::List(keys.into_iter().map(Value::String).collect()))
            }
            WidgetValue::Text(choice) => ctx.commit(Value::String(choice)),
            WidgetValue::Empty => ctx.commit(Value::Null),
            other => reject_input(ctx, self.name(), &other),
        }
    }
}
