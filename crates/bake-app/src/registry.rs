//! Handler registry.
//!
//! Handlers are registered under a qualified `module.function` name. Lookups with
//! an undotted name fall back to the [`DEFAULT_MODULE`].

use std::collections::HashMap;
use std::fmt;

use crate::context::RenderEnv;
use crate::handler::{AppError, Handler, Response};

/// Module assumed for handler names without a `module.` prefix.
pub const DEFAULT_MODULE: &str = "app";

/// Explicit map from qualified handler name to handler.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn Handler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a name no other handler uses.
    pub fn register(&mut self, name: &str, handler: impl Handler + 'static) -> Result<(), AppError> {
        let key = qualify(name);
        if self.handlers.contains_key(&key) {
            return Err(AppError::DuplicateHandler(key));
        }

        tracing::debug!("Registered handler {}", key);
        self.handlers.insert(key, Box::new(handler));
        Ok(())
    }

    /// Install one of the application's built-in handlers.
    pub(crate) fn insert(&mut self, name: &str, handler: impl Handler + 'static) {
        self.handlers.insert(qualify(name), Box::new(handler));
    }

    /// Register a closure as a handler.
    pub fn register_fn<F>(&mut self, name: &str, f: F) -> Result<(), AppError>
    where
        F: Fn(&mut RenderEnv<'_>, &[String]) -> Result<Response, AppError> + Send + Sync + 'static,
    {
        self.register(name, f)
    }

    /// Look up a handler by name.
    pub fn resolve(&self, name: &str) -> Result<&dyn Handler, AppError> {
        self.handlers
            .get(&qualify(name))
            .map(|h| h.as_ref())
            .ok_or_else(|| AppError::HandlerNotFound(name.to_string()))
    }

    /// Check if a handler exists.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(&qualify(name))
    }

    /// All qualified names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

/// Qualify a handler name with its module.
///
/// The module is everything before the first dot.
pub fn qualify(name: &str) -> String {
    match name.split_once('.') {
        Some((module, function)) => format!("{}.{}", module, function),
        None => format!("{}.{}", DEFAULT_MODULE, name),
    }
}
