//! Widget registry: stable identifiers mapped to widget factories.
//!
//! Identifiers are the strings stored in page layouts (`"CustomerStats"`), so a
//! layout may name a widget this build does not know. Lookups therefore return
//! a [`Resolution`] instead of failing.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::widgets::{WidgetContext, WidgetView};

/// Failure reported by a widget while rendering.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct WidgetError {
    pub message: String,
}

impl WidgetError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A self-contained unit placed on a page.
pub trait Widget: Send + Sync {
    fn render(&self, ctx: &WidgetContext) -> Result<WidgetView, WidgetError>;
}

/// Palette metadata shown by the page builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetMeta {
    pub name: String,
    pub description: String,
    pub icon: String,
}

impl WidgetMeta {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            icon: icon.into(),
        }
    }
}

/// Builds a fresh widget instance. Called once per rendered slot.
pub type WidgetFactory = Arc<dyn Fn() -> Box<dyn Widget> + Send + Sync>;

/// A registry entry.
#[derive(Clone)]
pub struct RegisteredWidget {
    id: String,
    meta: WidgetMeta,
    factory: WidgetFactory,
}

impl RegisteredWidget {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn meta(&self) -> &WidgetMeta {
        &self.meta
    }

    pub fn instantiate(&self) -> Box<dyn Widget> {
        (self.factory)()
    }
}

impl fmt::Debug for RegisteredWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredWidget")
            .field("id", &self.id)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// Outcome of looking up an identifier.
#[derive(Debug)]
pub enum Resolution<'a> {
    Found(&'a RegisteredWidget),
    Unregistered,
}

/// Ordered mapping from widget identifier to factory.
///
/// Registration order is palette order.
#[derive(Default, Clone)]
pub struct WidgetRegistry {
    widgets: IndexMap<String, RegisteredWidget>,
}

impl WidgetRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the six dashboard widgets.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::widgets::register_builtins(&mut registry);
        registry
    }

    /// Register a widget factory, replacing any entry with the same id.
    pub fn register<F>(&mut self, id: impl Into<String>, meta: WidgetMeta, factory: F)
    where
        F: Fn() -> Box<dyn Widget> + Send + Sync + 'static,
    {
        let id = id.into();
        let entry = RegisteredWidget {
            id: id.clone(),
            meta,
            factory: Arc::new(factory),
        };
        self.widgets.insert(id, entry);
    }

    pub fn resolve(&self, id: &str) -> Resolution<'_> {
        match self.widgets.get(id) {
            Some(entry) => Resolution::Found(entry),
            None => Resolution::Unregistered,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.widgets.contains_key(id)
    }

    pub fn meta(&self, id: &str) -> Option<&WidgetMeta> {
        self.widgets.get(id).map(|entry| &entry.meta)
    }

    /// Registered identifiers in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.widgets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.widgets.keys()).finish()
    }
}
