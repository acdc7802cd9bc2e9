//! ComponentRenderer: turns a page's stored layout into widget slots.
//!
//! Each slot is resolved and rendered on its own. An unknown identifier, a
//! widget error or a widget panic only affects that slot.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crm_config::{ConfigStore, Configuration};
use serde::Serialize;
use tracing::warn;

use crate::error::LayoutError;
use crate::registry::{RegisteredWidget, Resolution, WidgetMeta, WidgetRegistry};
use crate::widgets::{DashboardData, WidgetContext, WidgetView};

const NO_COMPONENTS: &str = "No components configured for this page.";
const DASHBOARD_HINT: &str =
    "You can add components using the Page Builder in the Customization settings.";

/// Widgets shown on a page that has never had a layout saved.
pub fn default_components(page: &str) -> Vec<String> {
    match page {
        "dashboard" => ["CustomerStats", "RecentQuotes", "SalesChart"]
            .map(String::from)
            .to_vec(),
        _ => Vec::new(),
    }
}

/// One rendered position on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "slot", rename_all = "kebab-case")]
pub enum Slot {
    Mounted {
        id: String,
        meta: WidgetMeta,
        view: WidgetView,
    },
    NotFound {
        id: String,
        message: String,
    },
    Failed {
        id: String,
        message: String,
    },
}

impl Slot {
    pub fn id(&self) -> &str {
        match self {
            Self::Mounted { id, .. } | Self::NotFound { id, .. } | Self::Failed { id, .. } => id,
        }
    }

    pub fn is_mounted(&self) -> bool {
        matches!(self, Self::Mounted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum PageView {
    Loading {
        message: String,
    },
    Empty {
        message: String,
        hint: Option<String>,
    },
    Widgets {
        slots: Vec<Slot>,
    },
}

impl PageView {
    pub fn slots(&self) -> &[Slot] {
        match self {
            Self::Widgets { slots } => slots,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComponentRenderer {
    registry: Arc<WidgetRegistry>,
}

impl ComponentRenderer {
    pub fn new(registry: Arc<WidgetRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    /// Render `page` from the store's current document.
    pub fn render(&self, store: &ConfigStore, page: &str, data: &DashboardData) -> PageView {
        if store.loading() {
            return PageView::Loading {
                message: "Loading components...".into(),
            };
        }
        self.render_config(store.config(), page, data)
    }

    /// Render `page` from a document snapshot.
    pub fn render_config(
        &self,
        config: Arc<Configuration>,
        page: &str,
        data: &DashboardData,
    ) -> PageView {
        let ids = config
            .page_layout(page)
            .map(|layout| layout.active_components.clone())
            .unwrap_or_else(|| default_components(page));

        if ids.is_empty() {
            return PageView::Empty {
                message: NO_COMPONENTS.into(),
                hint: (page == "dashboard").then(|| DASHBOARD_HINT.to_string()),
            };
        }

        let ctx = WidgetContext::new(config, data.clone());
        let slots = ids
            .into_iter()
            .map(|id| match self.registry.resolve(&id) {
                Resolution::Found(entry) => mount(entry, &ctx),
                Resolution::Unregistered => {
                    let message = LayoutError::UnknownWidget { id: id.clone() }.to_string();
                    warn!(page, id = %id, "widget not found in registry");
                    Slot::NotFound { id, message }
                }
            })
            .collect();
        PageView::Widgets { slots }
    }
}

/// Instantiate and render one widget, containing any failure to its slot.
fn mount(entry: &RegisteredWidget, ctx: &WidgetContext) -> Slot {
    let id = entry.id().to_string();
    let outcome = catch_unwind(AssertUnwindSafe(|| entry.instantiate().render(ctx)));
    let message = match outcome {
        Ok(Ok(view)) => {
            return Slot::Mounted {
                id,
                meta: entry.meta().clone(),
                view,
            }
        }
        Ok(Err(e)) => e.message,
        Err(payload) => panic_message(payload.as_ref()),
    };
    warn!(id = %id, error = %message, "widget failed to render");
    Slot::Failed { id, message }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "widget panicked".to_string()
    }
}
