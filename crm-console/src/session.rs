//! ConsoleSession: owns the store, widget registry and API client for one console.

use std::sync::Arc;

use crm_api::{ApiClient, QuoteDraft, Record};
use crm_config::{
    ConfigBackend, ConfigStore, Configuration, ConsoleSettings, FileBackend, MemoryBackend,
};
use crm_forms::{DynamicForm, FormFieldDescriptor};
use crm_layout::{ComponentRenderer, DashboardData, PageBuilder, PageView, WidgetRegistry};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{ConsoleError, Result};
use crate::field_manager::FieldManager;
use crate::navigation::{match_route, RouteMatch, Sidebar};
use crate::notify::Notices;

pub struct ConsoleSession {
    settings: ConsoleSettings,
    store: Arc<ConfigStore>,
    registry: Arc<WidgetRegistry>,
    renderer: ComponentRenderer,
    api: ApiClient,
    notices: Arc<Notices>,
    fields: FieldManager,
    current_path: RwLock<String>,
}

impl ConsoleSession {
    /// Start a session: file-backed store when `config_path` is set, in-memory otherwise.
    pub async fn start(settings: ConsoleSettings) -> Result<Self> {
        let backend: Arc<dyn ConfigBackend> = match &settings.config_path {
            Some(path) => Arc::new(FileBackend::new(path)),
            None => Arc::new(MemoryBackend::new()),
        };
        Self::with_backend(settings, backend).await
    }

    /// Start a session over an explicit backend.
    pub async fn with_backend(
        settings: ConsoleSettings,
        backend: Arc<dyn ConfigBackend>,
    ) -> Result<Self> {
        let store = Arc::new(
            ConfigStore::open_shared(backend)
                .with_policy(settings.save_policy())
                .build()
                .await?,
        );
        let registry = Arc::new(WidgetRegistry::with_builtins());
        let api = ApiClient::new(&settings.api_url)?;
        let notices = Arc::new(Notices::new());

        info!(
            api_url = %settings.api_url,
            config_path = ?settings.config_path,
            widgets = registry.len(),
            "console session started"
        );

        Ok(Self {
            renderer: ComponentRenderer::new(registry.clone()),
            fields: FieldManager::new(store.clone(), notices.clone()),
            settings,
            store,
            registry,
            api,
            notices,
            current_path: RwLock::new("/".into()),
        })
    }

    /// Close the store. Later writes fail with `Closed`; reads keep working.
    pub fn shutdown(&self) {
        self.store.close();
        info!("console session stopped");
    }

    pub fn settings(&self) -> &ConsoleSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<WidgetRegistry> {
        &self.registry
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn notices(&self) -> &Arc<Notices> {
        &self.notices
    }

    pub fn field_manager(&self) -> &FieldManager {
        &self.fields
    }

    pub fn config(&self) -> Arc<Configuration> {
        self.store.config()
    }

    /// Queue a notice for failures the user can retry.
    pub async fn report(&self, err: &ConsoleError) {
        if err.is_retryable() {
            self.notices.error(err.to_string()).await;
        }
    }

    // --- Navigation ---

    /// Move to `path`. Returns the matched route, or `None` for an unknown path
    /// (the current path is left unchanged).
    pub async fn navigate(&self, path: &str) -> Option<RouteMatch> {
        let route = match_route(path)?;
        *self.current_path.write().await = path.to_string();
        debug!(path, page = route.page, "navigated");
        Some(route)
    }

    pub async fn sidebar(&self) -> Sidebar {
        let path = self.current_path.read().await.clone();
        Sidebar::build(&self.store.config(), &path)
    }

    // --- Pages ---

    pub fn page_builder(&self, page: &str) -> PageBuilder {
        PageBuilder::load(page, self.registry.clone(), &self.store.config())
    }

    /// Save a page builder's layout, raising a notice either way.
    pub async fn save_layout(&self, builder: &mut PageBuilder) -> Result<()> {
        match builder.save(&self.store).await {
            Ok(()) => {
                self.notices.success("Layout saved successfully!").await;
                Ok(())
            }
            Err(e) => {
                self.notices
                    .error("Error saving layout. Please try again.")
                    .await;
                Err(e.into())
            }
        }
    }

    /// Customers and quotes for dashboard widgets, fetched concurrently.
    pub async fn dashboard_data(&self) -> Result<DashboardData> {
        let (customers, quotes) = tokio::try_join!(self.api.customers(), self.api.quotes())?;
        Ok(DashboardData { customers, quotes })
    }

    /// Render a page. Backend failures degrade to widgets rendered without data.
    pub async fn render_page(&self, page: &str) -> PageView {
        let data = match self.dashboard_data().await {
            Ok(data) => data,
            Err(e) => {
                warn!(page, error = %e, "dashboard data unavailable");
                self.report(&e).await;
                DashboardData::default()
            }
        };
        self.renderer.render(&self.store, page, &data)
    }

    // --- Forms ---

    /// Form for `entity` over its standard fields plus its custom fields.
    pub fn form(
        &self,
        entity: &str,
        standard: Vec<FormFieldDescriptor>,
        initial: Map<String, Value>,
    ) -> DynamicForm {
        let mut form = DynamicForm::new(entity, standard, initial, &self.store.config());
        form.set_loading(self.store.loading());
        form
    }

    /// Send a quote draft to the backend.
    pub async fn submit_quote(&self, draft: &QuoteDraft) -> Result<Record> {
        match self.api.create_quote(draft).await {
            Ok(record) => {
                self.notices.success("Quote created").await;
                Ok(record)
            }
            Err(e) => {
                let err = ConsoleError::from(e);
                self.report(&err).await;
                Err(err)
            }
        }
    }
}
