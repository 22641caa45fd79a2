use crudform_model::{FieldDescriptor, TypeTag, Value};

use super::{reject_input, InputHandler};
use crate::context::InputContext;
use crate::widgets::{Widget, WidgetKind, WidgetValue};

const TOOLTIP: &str = "Enter values separated by commas (e.g., value1, value2, value3)";

/// Renders lists and sets of strings or numbers as comma-delimited text.
///
/// On commit each element is parsed to the element type; one malformed
/// element rejects the whole input and the prior value is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionHandler;

fn scalar_element(ty: &TypeTag) -> Option<&TypeTag> {
    ty.element_type()
        .filter(|e| matches!(e, TypeTag::String | TypeTag::Integer | TypeTag::Float))
}

fn parse_element(element: &TypeTag, part: &str) -> Option<Value> {
    match element {
        TypeTag::Integer => part.parse::<i64>().ok().map(Value::Int),
        TypeTag::Float => part.parse::<f64>().ok().map(Value::Float),
        _ => Some(Value::String(part.to_string())),
    }
}

impl InputHandler for CollectionHandler {
    fn can_handle(&self, descriptor: &FieldDescriptor) -> bool {
        scalar_element(descriptor.effective_type().0).is_some()
    }

    fn create_widget(&self, ctx: &InputContext<'_>) -> Option<Widget> {
        let element = scalar_element(ctx.descriptor.effective_type().0)?.type_key();
        let text = ctx
            .current_value
            .as_list()
            .map(|items| {
                items
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        let placeholder = format!("Enter comma-separated {element} values");
        let kind = WidgetKind::DelimitedList { element, placeholder };
        Some(
            Widget::new(ctx, kind, WidgetValue::Text(text))
                .clearable(ctx.optional)
                .tooltip(TOOLTIP),
        )
    }

    fn handle_input(&self, ctx: &InputContext<'_>, input: WidgetValue) -> bool {
        let text = match input {
            WidgetValue::Text(text) => text,
            WidgetValue::Empty => String::new(),
            other => return reject_input(ctx, self.name(), &other),
        };
        let Some(element) = scalar_element(ctx.descriptor.effective_type().0) else {
            return false;
        };

        let mut values = Vec::new();
        for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match parse_element(element, part) {
                Some(value) => values.push(value),
                None => {
                    tracing::warn!(
                        field = ctx.field_name,
                        element = %element,
                        input = part,
                        "malformed list element"
                    );
                    return false;
                }
            }
        }
        ctx.commit(Value::List(values))
    }
}
