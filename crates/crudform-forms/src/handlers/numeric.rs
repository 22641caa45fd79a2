use crudform_model::{FieldDescriptor, InputType, TypeTag, Value};

use super::{reject_input, InputHandler};
use crate::context::InputContext;
use crate::widgets::{Widget, WidgetKind, WidgetValue};

/// Renders integer and float fields as a number input, or as a slider when
/// hinted and both bounds are known.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericHandler;

impl InputHandler for NumericHandler {
    fn can_handle(&self, descriptor: &FieldDescriptor) -> bool {
        descriptor.effective_type().0.is_numeric()
    }

    fn create_widget(&self, ctx: &InputContext<'_>) -> Option<Widget> {
        let constraints = &ctx.descriptor.constraints;
        let (min, max, step) = (constraints.min(), constraints.max(), constraints.step);
        let current = ctx.current_value.as_f64();

        if let (Some(InputType::Slider), Some(min), Some(max)) = (ctx.descriptor.hint(), min, max) {
            let value = WidgetValue::Number(current.unwrap_or(min));
            return Some(Widget::new(ctx, WidgetKind::Slider { min, max, step }, value));
        }

        let value = current.map_or(WidgetValue::Empty, WidgetValue::Number);
        let kind = WidgetKind::NumberInput { min, max, step };
        Some(Widget::new(ctx, kind, value).clearable(ctx.optional))
    }

    fn handle_input(&self, ctx: &InputContext<'_>, input: WidgetValue) -> bool {
        let number = match input {
            WidgetValue::Number(n) => n,
            WidgetValue::Empty => return ctx.commit(Value::Null),
            WidgetValue::Text(ref text) if text.trim().is_empty() => return ctx.commit(Value::Null),
            WidgetValue::Text(ref text) => match text.trim().parse::<f64>() {
                Ok(n) => n,
                Err(_) => {
                    tracing::warn!(field = ctx.field_name, input = %text, "not a number");
                    return false;
                }
            },
            other => return reject_input(ctx, self.name(), &other),
        };
        // Integer fields keep their integer-ness; the card truncates.
        if *ctx.descriptor.effective_type().0 == TypeTag::Integer && number.fract() == 0.0 {
            #[allow(clippy::cast_possible_truncation)]
            let whole = number as i64;
            return ctx.commit(Value::Int(whole));
        }
        ctx.commit(Value::Float(number))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crudform_model::ModelSchema;

    use super::*;
    use crate::handlers::test_support::Harness;

    fn schema() -> Arc<ModelSchema> {
        ModelSchema::new("Stats")
            .field(
                FieldDescriptor::new("level", TypeTag::Integer)
                    .gt(0.0)
                    .lt(101.0)
                    .input_type(InputType::Slider)
                    .default(5),
            )
            .field(
                FieldDescriptor::new("weight", TypeTag::optional(TypeTag::Float))
                    .ge(0.0)
                    .step(0.5)
                    .default(Value::Null),
            )
            .field(
                FieldDescriptor::new("hp", TypeTag::Integer)
                    .input_type(InputType::Slider)
                    .default(3),
            )
            .build()
    }

    #[test]
    fn test_slider_needs_both_bounds() {
        let s = schema();
        let h = Harness::new(&s);
        let widget = h.with_ctx("level", |ctx| NumericHandler.create_widget(ctx)).unwrap();
        assert_eq!(
            widget.kind,
            WidgetKind::Slider {
                min: 0.0,
                max: 101.0,
                step: None
            }
        );
        assert_eq!(widget.value, WidgetValue::Number(5.0));

        let widget = h.with_ctx("hp", |ctx| NumericHandler.create_widget(ctx)).unwrap();
        assert!(matches!(widget.kind, WidgetKind::NumberInput { .. }));
    }

    #[test]
    fn test_optional_number_input() {
        let s = schema();
        let h = Harness::new(&s);
        let widget = h.with_ctx("weight", |ctx| NumericHandler.create_widget(ctx)).unwrap();
        assert_eq!(
            widget.kind,
            WidgetKind::NumberInput {
                min: Some(0.0),
                max: None,
                step: Some(0.5)
            }
        );
        assert_eq!(widget.value, WidgetValue::Empty);
        assert!(widget.clearable);
    }

    #[test]
    fn test_integer_commit_stays_integer() {
        let s = schema();
        let h = Harness::new(&s);
        assert!(h.with_ctx("level", |ctx| {
            NumericHandler.handle_input(ctx, WidgetValue::Number(42.0))
        }));
        assert_eq!(h.value("level"), Value::Int(42));
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let s = schema();
        let h = Harness::new(&s);
        assert!(!h.with_ctx("level", |ctx| {
            NumericHandler.handle_input(ctx, WidgetValue::Number(150.0))
        }));
        assert_eq!(h.value("level"), Value::Int(5));
    }

    #[test]
    fn test_text_and_empty_input() {
        let s = schema();
        let h = Harness::new(&s);
        assert!(h.with_ctx("weight", |ctx| NumericHandler.handle_input(ctx, "2.5".into())));
        assert_eq!(h.value("weight"), Value::Float(2.5));
        assert!(!h.with_ctx("weight", |ctx| NumericHandler.handle_input(ctx, "heavy".into())));
        assert!(h.with_ctx("weight", |ctx| NumericHandler.handle_input(ctx, WidgetValue::Empty)));
        assert_eq!(h.value("weight"), Value::Null);
    }
}
