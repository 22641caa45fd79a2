use std::path::PathBuf;

use crudform_model::{FieldDescriptor, InputType, TypeTag, Value};

use super::{reject_input, InputHandler};
use crate::context::InputContext;
use crate::widgets::{Widget, WidgetKind, WidgetValue};

/// Renders text and path fields as a text input, or as a textarea when the
/// field asks for one.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringHandler;

impl InputHandler for StringHandler {
    fn can_handle(&self, descriptor: &FieldDescriptor) -> bool {
        let (ty, _) = descriptor.effective_type();
        matches!(ty, TypeTag::String | TypeTag::Path)
            || matches!(
                descriptor.hint(),
                Some(InputType::Textarea | InputType::Markdown)
            )
    }

    fn create_widget(&self, ctx: &InputContext<'_>) -> Option<Widget> {
        let kind = match ctx.descriptor.hint() {
            Some(hint @ (InputType::Textarea | InputType::Markdown)) => WidgetKind::Textarea {
                markdown: hint == InputType::Markdown,
            },
            _ => WidgetKind::TextInput {
                placeholder: ctx.descriptor.description.clone(),
            },
        };
        let value = WidgetValue::Text(ctx.current_value.to_string());
        Some(Widget::new(ctx, kind, value).clearable(ctx.optional))
    }

    fn handle_input(&self, ctx: &InputContext<'_>, input: WidgetValue) -> bool {
        let text = match input {
            WidgetValue::Text(text) => text,
            WidgetValue::Empty => return ctx.commit(Value::Null),
            other => return reject_input(ctx, self.name(), &other),
        };
        let (ty, _) = ctx.descriptor.effective_type();
        if *ty == TypeTag::Path {
            ctx.commit(Value::Path(PathBuf::from(text)))
        } else {
            ctx.commit(Value::String(text))
        }
    }
}
