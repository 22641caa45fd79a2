//! Input handlers.
//!
//! An [`InputHandler`] decides whether it can render a field, produces the
//! field's [`Widget`], and turns widget input back into a committed value.
//! The registry orders handlers by [`priority`](InputHandler::priority) and
//! asks each in turn; the first whose [`can_handle`](InputHandler::can_handle)
//! returns `true` wins.
//!
//! `can_handle` must depend only on the field's declared type and its
//! input-type hint, because resolutions are cached under those two.

use std::fmt;

use crudform_model::FieldDescriptor;

use crate::context::InputContext;
use crate::widgets::{Widget, WidgetValue};

mod boolean;
mod collection;
mod fallback;
mod nested;
mod numeric;
mod selection;
mod string;
mod temporal;

pub use boolean::BooleanHandler;
pub use collection::CollectionHandler;
pub use fallback::FallbackHandler;
pub use nested::NestedHandler;
pub use numeric::NumericHandler;
pub use selection::SelectionHandler;
pub use string::StringHandler;
pub use temporal::TemporalHandler;

/// Priority of the built-in handlers.
pub const BUILTIN_PRIORITY: i32 = 100;

/// Priority of the fallback handler.
pub const FALLBACK_PRIORITY: i32 = -1000;

/// A strategy for rendering and editing one family of field types.
pub trait InputHandler: Send + Sync + fmt::Debug {
    /// Returns the handler name used in logs and for unregistration.
    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Returns the default resolution priority. Higher is consulted first.
    fn priority(&self) -> i32 {
        BUILTIN_PRIORITY
    }

    /// Returns `true` if this handler renders fields like `descriptor`.
    fn can_handle(&self, descriptor: &FieldDescriptor) -> bool;

    /// Produces the widget for the field in `ctx`, or `None` to omit it.
    fn create_widget(&self, ctx: &InputContext<'_>) -> Option<Widget>;

    /// Parses `input` and commits it through `ctx`. Returns `true` if a value
    /// was committed and accepted.
    fn handle_input(&self, ctx: &InputContext<'_>, input: WidgetValue) -> bool;
}

/// Logs input of a shape the handler does not accept and reports no commit.
pub(crate) fn reject_input(ctx: &InputContext<'_>, handler: &str, input: &WidgetValue) -> bool {
    tracing::warn!(
        field = ctx.field_name,
        handler,
        input = ?input,
        "ignoring widget input of unexpected shape"
    );
    false
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Helpers for driving a handler against a one-record harness.

    use std::cell::RefCell;
    use std::sync::Arc;

    use crudform_core::settings::CrudConfig;
    use crudform_model::{ModelSchema, Record, Value};

    use crate::context::InputContext;
    use crate::options::OptionMap;

    /// A record plus a log of committed values.
    pub struct Harness {
        pub record: RefCell<Record>,
        pub commits: RefCell<Vec<Value>>,
        pub config: CrudConfig,
        pub options: Option<OptionMap>,
    }

    impl Harness {
        pub fn new(schema: &Arc<ModelSchema>) -> Self {
            Self {
                record: RefCell::new(schema.placeholder_instance()),
                commits: RefCell::new(Vec::new()),
                config: CrudConfig::default(),
                options: None,
            }
        }

        pub fn set(&self, field: &str, value: impl Into<Value>) {
            self.record.borrow_mut().set(field, value).unwrap();
        }

        /// Runs `f` with a context for `field`. Commits are validated against
        /// the record and logged.
        pub fn with_ctx<R>(&self, field: &str, f: impl FnOnce(&InputContext<'_>) -> R) -> R {
            let snapshot = self.record.borrow().clone();
            let schema = Arc::clone(snapshot.schema());
            let descriptor = schema.get_field(field).unwrap();
            let commit = |v: Value| {
                self.commits.borrow_mut().push(v.clone());
                self.record.borrow_mut().set(field, v).is_ok()
            };
            let ctx = InputContext::new(descriptor, &snapshot, &self.config, &commit)
                .select_options(self.options.as_ref());
            f(&ctx)
        }

        pub fn value(&self, field: &str) -> Value {
            self.record.borrow().value(field)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_priorities() {
        assert_eq!(StringHandler.name(), "StringHandler");
        assert_eq!(CollectionHandler.name(), "CollectionHandler");
        assert_eq!(NumericHandler.priority(), BUILTIN_PRIORITY);
        assert_eq!(FallbackHandler.priority(), FALLBACK_PRIORITY);
    }
}
