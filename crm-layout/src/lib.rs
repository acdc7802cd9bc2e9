//! Page composition for the CRM console
//!
//! Pages are built from widgets. A [`WidgetRegistry`] maps stable identifiers
//! to widget factories; the [`PageBuilder`] edits which identifiers a page
//! shows and in what order; the [`ComponentRenderer`] turns a page's stored
//! layout into mounted widget slots, isolating every slot from its siblings.
//!
//! ```rust,ignore
//! let registry = Arc::new(WidgetRegistry::with_builtins());
//! let mut builder = PageBuilder::load("dashboard", registry.clone(), &store.config());
//! builder.add("CustomerStats", None)?;
//! builder.save(&store).await?;
//!
//! let page = ComponentRenderer::new(registry).render(&store, "dashboard", &data);
//! ```

pub mod builder;
pub mod error;
pub mod lists;
pub mod registry;
pub mod renderer;
pub mod widgets;

pub use builder::{BuilderState, BuilderView, ListKind, PaletteEntry, PageBuilder};
pub use error::{LayoutError, Result};
pub use registry::{
    RegisteredWidget, Resolution, Widget, WidgetError, WidgetFactory, WidgetMeta, WidgetRegistry,
};
pub use renderer::{default_components, ComponentRenderer, PageView, Slot};
pub use widgets::{DashboardData, WidgetBody, WidgetContext, WidgetView};
