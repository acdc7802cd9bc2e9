//! PageBuilder: edits which widgets a page shows and in what order.
//!
//! The builder holds two disjoint working lists: `available` (registered
//! widgets not on the page) and `active` (the page's ordered widgets). Edits
//! only touch the working lists; `save` writes the active list through the
//! configuration store.

use std::fmt;
use std::sync::Arc;

use crm_config::{ConfigStore, Configuration, PageLayout};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{LayoutError, Result};
use crate::lists::{insert_at, remove_from};
use crate::registry::{WidgetMeta, WidgetRegistry};

const ALL_IN_USE: &str = "All components are being used";

/// Whether the working lists differ from what was last loaded or saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuilderState {
    Viewing,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Available,
    Active,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Active => write!(f, "active"),
        }
    }
}

/// A widget as shown in either list. `meta` is `None` for identifiers the
/// registry does not know.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteEntry {
    pub id: String,
    pub meta: Option<WidgetMeta>,
}

/// What the builder shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum BuilderView {
    Loading {
        message: String,
    },
    Ready {
        title: String,
        available: Vec<PaletteEntry>,
        active: Vec<PaletteEntry>,
        hint: Option<String>,
        can_save: bool,
        can_reset: bool,
    },
}

pub struct PageBuilder {
    page: String,
    registry: Arc<WidgetRegistry>,
    available: Vec<String>,
    active: Vec<String>,
    grid_layout: Value,
    state: BuilderState,
}

impl PageBuilder {
    /// Load the builder for `page` from the stored layout, or an empty one.
    pub fn load(page: impl Into<String>, registry: Arc<WidgetRegistry>, config: &Configuration) -> Self {
        let mut builder = Self {
            page: page.into(),
            registry,
            available: Vec::new(),
            active: Vec::new(),
            grid_layout: Value::Object(Default::default()),
            state: BuilderState::Viewing,
        };
        builder.reset(config);
        builder
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub fn available(&self) -> &[String] {
        &self.available
    }

    pub fn active(&self) -> &[String] {
        &self.active
    }

    pub fn can_save(&self) -> bool {
        self.state == BuilderState::Editing
    }

    pub fn can_reset(&self) -> bool {
        self.state == BuilderState::Editing
    }

    /// `"Page Builder: Dashboard"` for the `dashboard` page.
    pub fn title(&self) -> String {
        let mut chars = self.page.chars();
        let page: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        format!("Page Builder: {page}")
    }

    /// Shown in place of the palette once every widget is on the page.
    pub fn empty_hint(&self) -> Option<&'static str> {
        self.available.is_empty().then_some(ALL_IN_USE)
    }

    pub fn palette(&self, list: ListKind) -> Vec<PaletteEntry> {
        self.list(list)
            .iter()
            .map(|id| PaletteEntry {
                id: id.clone(),
                meta: self.registry.meta(id).cloned(),
            })
            .collect()
    }

    /// Move `id` from one list to another, or within a list.
    ///
    /// Into `active`, `index` is the target position (clamped; `None` appends).
    /// Into `available` the widget always goes to the end.
    pub fn move_widget(
        &mut self,
        id: &str,
        from: ListKind,
        to: ListKind,
        index: Option<usize>,
    ) -> Result<()> {
        let source = self.list(from);
        let Some(current) = source.iter().position(|item| item == id) else {
            return Err(LayoutError::NotInList {
                id: id.to_string(),
                list: from,
            });
        };

        let index = match to {
            ListKind::Available => None,
            ListKind::Active => index,
        };
        if from == to && index.map_or(current + 1 == source.len(), |i| i == current) {
            return Ok(());
        }

        let Some(without) = remove_from(source, id) else {
            return Err(LayoutError::NotInList {
                id: id.to_string(),
                list: from,
            });
        };
        *self.list_mut(from) = without;
        let target = insert_at(self.list(to), id, index);
        *self.list_mut(to) = target;

        self.state = BuilderState::Editing;
        debug!(page = %self.page, id, %from, %to, "widget moved");
        Ok(())
    }

    /// Put a widget from the palette onto the page.
    pub fn add(&mut self, id: &str, index: Option<usize>) -> Result<()> {
        self.move_widget(id, ListKind::Available, ListKind::Active, index)
    }

    /// Take a widget off the page; it returns to the end of the palette.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        self.move_widget(id, ListKind::Active, ListKind::Available, None)
    }

    /// Persist the active list. A no-op while nothing has changed.
    ///
    /// On failure the builder stays in `Editing` with its lists intact.
    pub async fn save(&mut self, store: &ConfigStore) -> Result<()> {
        if self.state == BuilderState::Viewing {
            return Ok(());
        }
        let layout = PageLayout {
            active_components: self.active.clone(),
            grid_layout: self.grid_layout.clone(),
        };
        match store.update_layout(&self.page, layout).await {
            Ok(()) => {
                self.state = BuilderState::Viewing;
                debug!(page = %self.page, widgets = self.active.len(), "layout saved");
                Ok(())
            }
            Err(e) => {
                warn!(page = %self.page, error = %e, "layout save failed");
                Err(e.into())
            }
        }
    }

    /// Discard edits and reload the working lists from `config`.
    pub fn reset(&mut self, config: &Configuration) {
        let stored = config.page_layout(&self.page);
        self.active = stored
            .map(|layout| layout.active_components.clone())
            .unwrap_or_default();
        self.grid_layout = stored
            .map(|layout| layout.grid_layout.clone())
            .unwrap_or_else(|| Value::Object(Default::default()));
        self.available = self
            .registry
            .keys()
            .filter(|key| !self.active.iter().any(|a| a == key))
            .map(str::to_string)
            .collect();
        self.state = BuilderState::Viewing;
    }

    pub fn render(&self, loading: bool) -> BuilderView {
        if loading {
            return BuilderView::Loading {
                message: "Loading page builder...".into(),
            };
        }
        BuilderView::Ready {
            title: self.title(),
            available: self.palette(ListKind::Available),
            active: self.palette(ListKind::Active),
            hint: self.empty_hint().map(str::to_string),
            can_save: self.can_save(),
            can_reset: self.can_reset(),
        }
    }

    fn list(&self, kind: ListKind) -> &[String] {
        match kind {
            ListKind::Available => &self.available,
            ListKind::Active => &self.active,
        }
    }

    fn list_mut(&mut self, kind: ListKind) -> &mut Vec<String> {
        match kind {
            ListKind::Available => &mut self.available,
            ListKind::Active => &mut self.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_config::MemoryBackend;

    fn registry() -> Arc<WidgetRegistry> {
        Arc::new(WidgetRegistry::with_builtins())
    }

    fn dashboard(active: &[&str]) -> Configuration {
        let mut config = Configuration::default();
        config.layout.insert(
            "dashboard".into(),
            PageLayout::new(active.iter().map(|s| s.to_string()).collect()),
        );
        config
    }

    #[test]
    fn load_splits_registry_into_disjoint_lists() {
        let builder = PageBuilder::load("dashboard", registry(), &dashboard(&["SalesChart"]));
        assert_eq!(builder.active(), ["SalesChart"]);
        assert_eq!(
            builder.available(),
            ["CustomerStats", "RecentQuotes", "QuickActions", "UpcomingTasks", "RecentActivity"]
        );
        assert_eq!(builder.state(), BuilderState::Viewing);
        assert!(!builder.can_save());
    }

    #[test]
    fn missing_layout_loads_empty() {
        let builder = PageBuilder::load("dashboard", registry(), &Configuration::default());
        assert!(builder.active().is_empty());
        assert_eq!(builder.available().len(), 6);
    }

    #[test]
    fn add_at_front_then_remove_returns_to_end() {
        let mut builder = PageBuilder::load("dashboard", registry(), &dashboard(&["SalesChart"]));
        builder.add("RecentQuotes", Some(0)).unwrap();
        assert_eq!(builder.active(), ["RecentQuotes", "SalesChart"]);
        assert_eq!(builder.state(), BuilderState::Editing);

        builder.remove("RecentQuotes").unwrap();
        assert_eq!(builder.active(), ["SalesChart"]);
        assert_eq!(builder.available().last().map(String::as_str), Some("RecentQuotes"));
    }

    #[test]
    fn reorder_within_active() {
        let config = dashboard(&["CustomerStats", "RecentQuotes", "SalesChart"]);
        let mut builder = PageBuilder::load("dashboard", registry(), &config);
        builder
            .move_widget("SalesChart", ListKind::Active, ListKind::Active, Some(0))
            .unwrap();
        assert_eq!(builder.active(), ["SalesChart", "CustomerStats", "RecentQuotes"]);
    }

    #[test]
    fn move_to_same_position_is_noop() {
        let config = dashboard(&["CustomerStats", "RecentQuotes"]);
        let mut builder = PageBuilder::load("dashboard", registry(), &config);
        builder
            .move_widget("RecentQuotes", ListKind::Active, ListKind::Active, Some(1))
            .unwrap();
        builder
            .move_widget("RecentQuotes", ListKind::Active, ListKind::Active, None)
            .unwrap();
        assert_eq!(builder.state(), BuilderState::Viewing);
        assert_eq!(builder.active(), ["CustomerStats", "RecentQuotes"]);
    }

    #[test]
    fn index_is_clamped() {
        let mut builder = PageBuilder::load("dashboard", registry(), &dashboard(&["SalesChart"]));
        builder.add("QuickActions", Some(42)).unwrap();
        assert_eq!(builder.active(), ["SalesChart", "QuickActions"]);
    }

    #[test]
    fn moving_from_wrong_list_leaves_lists_untouched() {
        let mut builder = PageBuilder::load("dashboard", registry(), &dashboard(&["SalesChart"]));
        let err = builder.add("SalesChart", None).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::NotInList {
                list: ListKind::Available,
                ..
            }
        ));
        assert_eq!(builder.active(), ["SalesChart"]);
        assert_eq!(builder.available().len(), 5);
        assert_eq!(builder.state(), BuilderState::Viewing);
    }

    #[test]
    fn unregistered_ids_stay_on_the_page() {
        let mut builder = PageBuilder::load("dashboard", registry(), &dashboard(&["Nonexistent"]));
        assert_eq!(builder.available().len(), 6);
        let active = builder.palette(ListKind::Active);
        assert_eq!(active[0].id, "Nonexistent");
        assert!(active[0].meta.is_none());

        builder.remove("Nonexistent").unwrap();
        assert_eq!(builder.available().last().map(String::as_str), Some("Nonexistent"));
    }

    #[test]
    fn reset_discards_edits() {
        let config = dashboard(&["SalesChart"]);
        let mut builder = PageBuilder::load("dashboard", registry(), &config);
        builder.add("CustomerStats", None).unwrap();
        builder.reset(&config);
        assert_eq!(builder.active(), ["SalesChart"]);
        assert_eq!(builder.state(), BuilderState::Viewing);
    }

    #[test]
    fn title_and_hint() {
        let config = dashboard(&[
            "CustomerStats",
            "RecentQuotes",
            "SalesChart",
            "QuickActions",
            "UpcomingTasks",
            "RecentActivity",
        ]);
        let builder = PageBuilder::load("dashboard", registry(), &config);
        assert_eq!(builder.title(), "Page Builder: Dashboard");
        assert_eq!(builder.empty_hint(), Some("All components are being used"));
        match builder.render(false) {
            BuilderView::Ready { hint, active, .. } => {
                assert_eq!(hint.as_deref(), Some("All components are being used"));
                assert_eq!(active[0].meta.as_ref().unwrap().name, "Customer Statistics");
            }
            other => panic!("expected ready view, got {other:?}"),
        }
        assert!(matches!(builder.render(true), BuilderView::Loading { .. }));
    }

    #[tokio::test]
    async fn save_persists_active_list_and_keeps_grid() {
        let mut seeded = dashboard(&["SalesChart"]);
        if let Some(layout) = seeded.layout.get_mut("dashboard") {
            layout.grid_layout = serde_json::json!({"cols": 12});
        }
        let store = ConfigStore::open(MemoryBackend::with_document(seeded))
            .build()
            .await
            .unwrap();

        let mut builder = PageBuilder::load("dashboard", registry(), &store.config());
        builder.add("CustomerStats", Some(0)).unwrap();
        builder.save(&store).await.unwrap();

        assert_eq!(builder.state(), BuilderState::Viewing);
        let config = store.config();
        let stored = config.page_layout("dashboard").unwrap();
        assert_eq!(stored.active_components, vec!["CustomerStats", "SalesChart"]);
        assert_eq!(stored.grid_layout, serde_json::json!({"cols": 12}));
    }

    #[tokio::test]
    async fn save_without_changes_is_noop() {
        let store = ConfigStore::open(MemoryBackend::new()).build().await.unwrap();
        let mut builder = PageBuilder::load("dashboard", registry(), &store.config());
        builder.save(&store).await.unwrap();
        assert_eq!(builder.state(), BuilderState::Viewing);
        assert!(store.config().page_layout("dashboard").is_none());
    }

    #[tokio::test]
    async fn failed_save_keeps_editing() {
        let store = ConfigStore::open(MemoryBackend::new()).build().await.unwrap();
        let mut builder = PageBuilder::load("dashboard", registry(), &store.config());
        builder.add("SalesChart", None).unwrap();
        store.close();

        let err = builder.save(&store).await.unwrap_err();
        assert!(matches!(err, LayoutError::Store(_)));
        assert_eq!(builder.state(), BuilderState::Editing);
        assert_eq!(builder.active(), ["SalesChart"]);
    }
}
