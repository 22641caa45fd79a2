use crudform_model::types::{parse_date, parse_datetime, parse_time};
use crudform_model::{FieldDescriptor, TypeTag, Value};

use super::{reject_input, InputHandler};
use crate::context::InputContext;
use crate::widgets::{PickerKind, Widget, WidgetKind, WidgetValue};

/// Renders dates, times, and datetimes as text with a picker overlay.
///
/// Text is parsed as ISO-8601 on commit. Empty text commits none; text that
/// does not parse is logged and the prior value is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporalHandler;

impl InputHandler for TemporalHandler {
    fn can_handle(&self, descriptor: &FieldDescriptor) -> bool {
        descriptor.effective_type().0.is_temporal()
    }

    fn create_widget(&self, ctx: &InputContext<'_>) -> Option<Widget> {
        let picker = match ctx.descriptor.effective_type().0 {
            TypeTag::Date => PickerKind::Date,
            TypeTag::Time => PickerKind::Time,
            _ => PickerKind::DateTime,
        };
        let value = WidgetValue::Text(ctx.current_value.to_string());
        Some(Widget::new(ctx, WidgetKind::TemporalInput { picker }, value).clearable(ctx.optional))
    }

    fn handle_input(&self, ctx: &InputContext<'_>, input: WidgetValue) -> bool {
        let text = match input {
            WidgetValue::Text(text) => text,
            WidgetValue::Empty => return ctx.commit(Value::Null),
            other => return reject_input(ctx, self.name(), &other),
        };
        let text = text.trim();
        if text.is_empty() {
            return ctx.commit(Value::Null);
        }
        let parsed = match ctx.descriptor.effective_type().0 {
            TypeTag::Date => parse_date(text).map(Value::Date),
            TypeTag::Time => parse_time(text).map(Value::Time),
            _ => parse_datetime(text).map(Value::DateTime),
        };
        match parsed {
            Some(value) => ctx.commit(value),
            None => {
                tracing::warn!(field = ctx.field_name, input = text, "invalid date/time input");
                false
            }
        }
    }
}
