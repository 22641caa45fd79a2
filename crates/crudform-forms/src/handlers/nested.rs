use crudform_model::{FieldDescriptor, TypeTag, Value};

use super::InputHandler;
use crate::context::InputContext;
use crate::widgets::{ClassSwitcher, Widget, WidgetKind, WidgetValue};

/// Renders nested objects, unions of objects, and lists of objects.
///
/// Editing happens in dialogs owned by the card's nested edit coordinator,
/// so this handler only describes the field. The one input it accepts
/// itself is clearing an optional object.
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedHandler;

fn summary_of(value: &Value) -> String {
    match value {
        Value::Object(record) => record.summary(),
        other => other.to_string(),
    }
}

impl InputHandler for NestedHandler {
    fn can_handle(&self, descriptor: &FieldDescriptor) -> bool {
        match descriptor.effective_type().0 {
            TypeTag::ObjectType(_) | TypeTag::UnionOfObjects(_) => true,
            TypeTag::ListOf(element) => matches!(**element, TypeTag::ObjectType(_)),
            _ => false,
        }
    }

    fn create_widget(&self, ctx: &InputContext<'_>) -> Option<Widget> {
        let current = &ctx.current_value;
        let widget = match ctx.descriptor.effective_type().0 {
            TypeTag::ListOf(_) => {
                let items = current
                    .as_list()
                    .map(|items| items.iter().map(summary_of).collect())
                    .unwrap_or_default();
                Widget::new(ctx, WidgetKind::ObjectList { items }, WidgetValue::Empty)
            }
            TypeTag::UnionOfObjects(variants) => {
                let options: indexmap::IndexMap<String, String> = variants
                    .iter()
                    .map(|s| (s.name().to_string(), s.display_title().to_string()))
                    .collect();
                let current_class = current.as_record().map(|r| r.class_name().to_string());
                let selected = match current_class {
                    Some(class) if options.contains_key(&class) => class,
                    other => {
                        if let Some(class) = other {
                            tracing::warn!(
                                field = ctx.field_name,
                                class = %class,
                                "current class is not a variant"
                            );
                        }
                        options.keys().next().cloned().unwrap_or_default()
                    }
                };
                let kind = WidgetKind::NestedObject {
                    summary: summary_of(current),
                    switcher: Some(ClassSwitcher {
                        options,
                        selected: selected.clone(),
                    }),
                };
                Widget::new(ctx, kind, WidgetValue::Text(selected)).clearable(ctx.optional)
            }
            _ => {
                let kind = WidgetKind::NestedObject {
                    summary: summary_of(current),
                    switcher: None,
                };
                Widget::new(ctx, kind, WidgetValue::Empty).clearable(ctx.optional)
            }
        };
        Some(widget)
    }

    fn handle_input(&self, ctx: &InputContext<'_>, input: WidgetValue) -> bool {
        if input == WidgetValue::Empty && ctx.optional {
            return ctx.commit(Value::Null);
        }
        tracing::debug!(
            field = ctx.field_name,
            "nested fields are edited through dialogs"
        );
        false
    }
}
