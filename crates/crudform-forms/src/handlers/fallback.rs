use crudform_model::{FieldDescriptor, Value};

use super::{reject_input, InputHandler, FALLBACK_PRIORITY};
use crate::context::InputContext;
use crate::widgets::{Widget, WidgetKind, WidgetValue};

/// Accepts every field and shows its string form in a text input.
///
/// Registered last so that resolution always succeeds. Each rendering logs a
/// warning naming the field and type, which keeps unsupported types visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackHandler;

impl InputHandler for FallbackHandler {
    fn priority(&self) -> i32 {
        FALLBACK_PRIORITY
    }

    fn can_handle(&self, _descriptor: &FieldDescriptor) -> bool {
        true
    }

    fn create_widget(&self, ctx: &InputContext<'_>) -> Option<Widget> {
        tracing::warn!(
            field = ctx.field_name,
            field_type = %ctx.descriptor.declared_type(),
            "no dedicated handler; rendering as text"
        );
        let kind = WidgetKind::TextInput { placeholder: None };
        let value = WidgetValue::Text(ctx.current_value.to_string());
        Some(Widget::new(ctx, kind, value))
    }

    fn handle_input(&self, ctx: &InputContext<'_>, input: WidgetValue) -> bool {
        match input {
            WidgetValue::Text(text) => ctx.commit(Value::String(text)),
            WidgetValue::Empty => ctx.commit(Value::Null),
            other => reject_input(ctx, self.name(), &other),
        }
    }
}
