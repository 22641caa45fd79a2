//! The handler registry.
//!
//! A [`HandlerRegistry`] keeps handlers sorted by descending priority and
//! resolves a field to the first handler whose `can_handle` accepts it.
//! Resolutions are cached by the field's type key together with its
//! `input_type` hint, since the built-in selection and text handlers accept
//! fields by hint. Any registration or unregistration evicts the whole cache,
//! because insertion order decides resolution for every type.
//!
//! [`HandlerRegistry::with_builtins`] builds an isolated registry holding the
//! built-in handlers and the fallback. [`default_registry`] returns a shared,
//! lazily created instance of the same, and [`register_custom_handler`] adds
//! handlers to it.
//!
//! ## Example
//!
//! ```
//! use crudform_forms::HandlerRegistry;
//! use crudform_model::{FieldDescriptor, TypeTag};
//!
//! let registry = HandlerRegistry::with_builtins();
//! let field = FieldDescriptor::new("age", TypeTag::Integer);
//! let handler = registry.resolve(&field).unwrap();
//! assert_eq!(handler.name(), "NumericHandler");
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crudform_core::error::{CrudError, CrudResult};
use crudform_model::FieldDescriptor;
use once_cell::sync::Lazy;

use crate::handlers::{
    BooleanHandler, CollectionHandler, FallbackHandler, InputHandler, NestedHandler,
    NumericHandler, SelectionHandler, StringHandler, TemporalHandler,
};

/// Default priority for handlers added with [`register_custom_handler`].
pub const CUSTOM_PRIORITY: i32 = 150;

struct RegisteredHandler {
    handler: Arc<dyn InputHandler>,
    priority: i32,
    type_id: TypeId,
}

/// A priority-ordered collection of input handlers with a resolution cache.
///
/// Interior locks let the registry be shared through an `Arc`. Callers are
/// expected to finish registration before rendering starts.
pub struct HandlerRegistry {
    handlers: RwLock<Vec<RegisteredHandler>>,
    cache: RwLock<HashMap<String, Arc<dyn InputHandler>>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry holding the built-in handlers and the fallback.
    ///
    /// The selection handler comes first, so a `select` or `multiselect`
    /// hint wins over the handler of the field's type.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(SelectionHandler, None);
        registry.register(StringHandler, None);
        registry.register(NumericHandler, None);
        registry.register(BooleanHandler, None);
        registry.register(TemporalHandler, None);
        registry.register(NestedHandler, None);
        registry.register(CollectionHandler, None);
        registry.register(FallbackHandler, None);
        registry
    }

    /// Registers `handler`, optionally overriding its priority.
    ///
    /// The handler is placed before the first entry with a strictly lower
    /// priority, so it follows every existing entry of equal priority.
    pub fn register<H: InputHandler + 'static>(&self, handler: H, priority: Option<i32>) {
        let priority = priority.unwrap_or_else(|| handler.priority());
        let name = handler.name();
        let entry = RegisteredHandler {
            handler: Arc::new(handler),
            priority,
            type_id: TypeId::of::<H>(),
        };

        let mut handlers = self.handlers.write().expect("handler registry lock poisoned");
        let position = handlers
            .iter()
            .position(|h| h.priority < priority)
            .unwrap_or(handlers.len());
        handlers.insert(position, entry);
        drop(handlers);

        self.clear_cache();
        tracing::debug!(handler = name, priority, position, "registered input handler");
    }

    /// Resolves the handler for `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::NoHandlerFound`] if no handler accepts the field,
    /// which can only happen when the fallback has been removed.
    pub fn resolve(&self, descriptor: &FieldDescriptor) -> CrudResult<Arc<dyn InputHandler>> {
        let key = cache_key(descriptor);
        if let Some(handler) = self.cache.read().expect("handler cache lock poisoned").get(&key) {
            return Ok(Arc::clone(handler));
        }

        let found = self
            .handlers
            .read()
            .expect("handler registry lock poisoned")
            .iter()
            .find(|h| h.handler.can_handle(descriptor))
            .map(|h| Arc::clone(&h.handler));

        match found {
            Some(handler) => {
                tracing::debug!(
                    field = %descriptor.name,
                    cache_key = %key,
                    handler = handler.name(),
                    "resolved input handler"
                );
                self.cache
                    .write()
                    .expect("handler cache lock poisoned")
                    .insert(key, Arc::clone(&handler));
                Ok(handler)
            }
            None => Err(CrudError::NoHandlerFound(
                descriptor.declared_type().type_key(),
            )),
        }
    }

    /// Removes every registered handler of type `H`. Returns `true` if any
    /// was removed.
    pub fn unregister<H: InputHandler + 'static>(&self) -> bool {
        let target = TypeId::of::<H>();
        self.remove_where(|h| h.type_id == target)
    }

    /// Removes every registered handler whose name is `name`. Returns `true`
    /// if any was removed.
    pub fn unregister_named(&self, name: &str) -> bool {
        self.remove_where(|h| h.handler.name() == name)
    }

    fn remove_where(&self, matches: impl Fn(&RegisteredHandler) -> bool) -> bool {
        let mut handlers = self.handlers.write().expect("handler registry lock poisoned");
        let before = handlers.len();
        handlers.retain(|h| !matches(h));
        let removed = before - handlers.len();
        drop(handlers);

        if removed > 0 {
            self.clear_cache();
            tracing::debug!(removed, "unregistered input handlers");
        }
        removed > 0
    }

    /// Empties the resolution cache.
    pub fn clear_cache(&self) {
        self.cache.write().expect("handler cache lock poisoned").clear();
    }

    /// Returns the number of cached resolutions.
    pub fn cached(&self) -> usize {
        self.cache.read().expect("handler cache lock poisoned").len()
    }

    /// Returns `(name, priority)` for each handler in resolution order.
    pub fn handlers(&self) -> Vec<(&'static str, i32)> {
        self.handlers
            .read()
            .expect("handler registry lock poisoned")
            .iter()
            .map(|h| (h.handler.name(), h.priority))
            .collect()
    }

    /// Returns the number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.read().expect("handler registry lock poisoned").len()
    }

    /// Returns `true` if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cache_key(descriptor: &FieldDescriptor) -> String {
    let key = descriptor.declared_type().type_key();
    match descriptor.hint() {
        Some(hint) => format!("{key}|{hint}"),
        None => key,
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers())
            .field("cached", &self.cached())
            .finish()
    }
}

static DEFAULT_REGISTRY: Lazy<Arc<HandlerRegistry>> =
    Lazy::new(|| Arc::new(HandlerRegistry::with_builtins()));

/// Returns the shared registry holding the built-ins.
pub fn default_registry() -> Arc<HandlerRegistry> {
    Arc::clone(&DEFAULT_REGISTRY)
}

/// Registers `handler` in the shared registry.
///
/// The priority defaults to [`CUSTOM_PRIORITY`], which places the handler
/// ahead of the built-ins.
///
/// # Errors
///
/// Returns [`CrudError::ConfigurationError`] for a negative priority.
pub fn register_custom_handler<H: InputHandler + 'static>(
    handler: H,
    priority: Option<i32>,
) -> CrudResult<()> {
    let priority = priority.unwrap_or(CUSTOM_PRIORITY);
    if priority < 0 {
        return Err(CrudError::ConfigurationError(format!(
            "Priority must be non-negative, got {priority}"
        )));
    }
    DEFAULT_REGISTRY.register(handler, Some(priority));
    Ok(())
}
