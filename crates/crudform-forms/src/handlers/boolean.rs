use crudform_model::{FieldDescriptor, TypeTag, Value};

use super::{reject_input, InputHandler};
use crate::context::InputContext;
use crate::widgets::{Widget, WidgetKind, WidgetValue};

/// Renders boolean fields as a switch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanHandler;

impl InputHandler for BooleanHandler {
    fn can_handle(&self, descriptor: &FieldDescriptor) -> bool {
        *descriptor.effective_type().0 == TypeTag::Boolean
    }

    fn create_widget(&self, ctx: &InputContext<'_>) -> Option<Widget> {
        let on = ctx.current_value.as_bool().unwrap_or(false);
        Some(Widget::new(ctx, WidgetKind::Switch, WidgetValue::Bool(on)))
    }

    fn handle_input(&self, ctx: &InputContext<'_>, input: WidgetValue) -> bool {
        match input {
            WidgetValue::Bool(on) => ctx.commit(Value::Bool(on)),
            WidgetValue::Empty if ctx.optional => ctx.commit(Value::Null),
            WidgetValue::Empty => ctx.commit(Value::Bool(false)),
            other => reject_input(ctx, self.name(), &other),
        }
    }
}

#[cfg(test)]
mod tests {
    use crudform_model::ModelSchema;

    use super::*;
    use crate::handlers::test_support::Harness;

    #[test]
    fn test_switch_round_trip() {
        let s = ModelSchema::new("Flags")
            .field(
                FieldDescriptor::new("active", TypeTag::Boolean)
                    .default(false),
            )
            .field(
                FieldDescriptor::new("maybe", TypeTag::optional(TypeTag::Boolean))
                    .default(Value::Null),
            )
            .build();
        let h = Harness::new(&s);
        assert!(BooleanHandler.can_handle(s.get_field("maybe").unwrap()));

        let widget = h.with_ctx("maybe", |ctx| BooleanHandler.create_widget(ctx)).unwrap();
        assert_eq!(widget.kind, WidgetKind::Switch);
        assert_eq!(widget.value, WidgetValue::Bool(false));

        assert!(h.with_ctx("active", |ctx| BooleanHandler.handle_input(ctx, true.into())));
        assert_eq!(h.value("active"), Value::Bool(true));
        assert!(h.with_ctx("active", |ctx| BooleanHandler.handle_input(ctx, WidgetValue::Empty)));
        assert_eq!(h.value("active"), Value::Bool(false));
        assert!(!h.with_ctx("active", |ctx| {
            BooleanHandler.handle_input(ctx, WidgetValue::Number(1.0))
        }));
    }
}
