use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crm_config::{ConfigBackend, ConfigError, Configuration, MemoryBackend};
use crm_console::{ConsoleError, ConsoleSession, ConsoleSettings, Editor, NoticeLevel};
use crm_layout::{PageView, Slot};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Memory backend whose saves can be made to fail or stall.
#[derive(Default)]
struct SwitchableBackend {
    inner: MemoryBackend,
    failing: AtomicBool,
    slow: AtomicBool,
}

#[async_trait]
impl ConfigBackend for SwitchableBackend {
    async fn load(&self) -> crm_config::Result<Option<Configuration>> {
        self.inner.load().await
    }

    async fn save(&self, config: &Configuration) -> crm_config::Result<()> {
        if self.slow.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ConfigError::persistence("backend offline"));
        }
        self.inner.save(config).await
    }
}

fn settings(api_url: &str) -> ConsoleSettings {
    ConsoleSettings {
        api_url: api_url.to_string(),
        save_retries: 1,
        retry_backoff_ms: 1,
        ..ConsoleSettings::default()
    }
}

async fn session_with(backend: Arc<SwitchableBackend>) -> ConsoleSession {
    ConsoleSession::with_backend(settings("http://127.0.0.1:9/api"), backend)
        .await
        .unwrap()
}

async fn fill_field(session: &ConsoleSession, name: &str) {
    let manager = session.field_manager();
    manager.open_add().await;
    manager.set_input("entity", "customer").await.unwrap();
    manager.set_input("name", name).await.unwrap();
    manager.set_input("label", "Industry").await.unwrap();
}

#[test_log::test(tokio::test)]
async fn dashboard_renders_default_widgets_with_backend_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "Acme"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/quotes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 5, "customerId": 1, "quoteDate": "2026-10-01", "totalAmount": 120}
        ])))
        .mount(&server)
        .await;

    let session = ConsoleSession::start(settings(&format!("{}/api", server.uri())))
        .await
        .unwrap();
    let view = session.render_page("dashboard").await;
    let ids: Vec<_> = view.slots().iter().map(Slot::id).collect();
    assert_eq!(ids, vec!["CustomerStats", "RecentQuotes", "SalesChart"]);
    assert!(view.slots().iter().all(Slot::is_mounted));
    assert!(session.notices().pending().await.is_empty());
}

#[test_log::test(tokio::test)]
async fn backend_outage_degrades_to_empty_widgets_and_notice() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&server)
        .await;

    let session = ConsoleSession::start(settings(&format!("{}/api", server.uri())))
        .await
        .unwrap();
    let view = session.render_page("dashboard").await;
    assert_eq!(view.slots().len(), 3);

    let notices = session.notices().pending().await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[test_log::test(tokio::test)]
async fn failed_save_keeps_draft_and_raises_notice() {
    let backend = Arc::new(SwitchableBackend::default());
    let session = session_with(backend.clone()).await;
    fill_field(&session, "customer_industry").await;

    backend.failing.store(true, Ordering::SeqCst);
    let err = session.field_manager().submit().await.unwrap_err();
    assert!(err.is_retryable());

    let manager = session.field_manager();
    assert_eq!(manager.editor().await, Editor::Adding);
    assert_eq!(manager.draft().await.name, "customer_industry");
    assert!(session.config().custom_fields.is_empty());
    let notices = session.notices().pending().await;
    assert_eq!(
        notices[0].message,
        "Failed to add custom field. Please try again."
    );

    backend.failing.store(false, Ordering::SeqCst);
    let def = manager.submit().await.unwrap().unwrap();
    assert_eq!(def.name, "customer_industry");
    assert_eq!(session.config().custom_fields.len(), 1);
}

#[test_log::test(tokio::test)]
async fn second_submit_while_in_flight_is_busy() {
    let backend = Arc::new(SwitchableBackend::default());
    let session = session_with(backend.clone()).await;
    fill_field(&session, "customer_industry").await;
    backend.slow.store(true, Ordering::SeqCst);

    let manager = session.field_manager();
    let (first, second) = tokio::join!(manager.submit(), manager.submit());
    assert!(first.unwrap().is_some());
    assert!(matches!(second, Err(ConsoleError::Busy)));
    assert!(!manager.is_submitting());
    assert_eq!(session.config().custom_fields.len(), 1);
}

#[test_log::test(tokio::test)]
async fn page_builder_save_raises_notices() {
    let backend = Arc::new(SwitchableBackend::default());
    let session = session_with(backend.clone()).await;

    let mut builder = session.page_builder("dashboard");
    builder.add("QuickActions", None).unwrap();
    session.save_layout(&mut builder).await.unwrap();
    assert_eq!(
        session.notices().pending().await[0].message,
        "Layout saved successfully!"
    );

    builder.remove("QuickActions").unwrap();
    backend.failing.store(true, Ordering::SeqCst);
    assert!(session.save_layout(&mut builder).await.is_err());
    assert!(builder.can_save());
    assert_eq!(
        session.notices().pending().await[1].message,
        "Error saving layout. Please try again."
    );
}

#[test_log::test(tokio::test)]
async fn file_backed_sessions_share_configuration() {
    let tmp = TempDir::new().unwrap();
    let mut settings = settings("http://127.0.0.1:9/api");
    settings.config_path = Some(tmp.path().join("console.yaml"));

    let session = ConsoleSession::start(settings.clone()).await.unwrap();
    fill_field(&session, "customer_industry").await;
    session.field_manager().submit().await.unwrap();
    session.shutdown();

    let reopened = ConsoleSession::start(settings).await.unwrap();
    let fields = reopened.store().list_custom_fields(Some("customer"));
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "customer_industry");
}

#[test_log::test(tokio::test)]
async fn writes_fail_after_shutdown() {
    let session = session_with(Arc::new(SwitchableBackend::default())).await;
    session.shutdown();
    fill_field(&session, "late_field").await;
    let err = session.field_manager().submit().await.unwrap_err();
    assert!(matches!(err, ConsoleError::Config(ConfigError::Closed)));
}

#[test_log::test(tokio::test)]
async fn forms_pick_up_custom_fields() {
    let session = session_with(Arc::new(SwitchableBackend::default())).await;
    fill_field(&session, "customer_industry").await;
    session.field_manager().submit().await.unwrap();

    let form = session.form("Customer", Vec::new(), serde_json::Map::new());
    assert_eq!(form.custom_fields().len(), 1);
    assert_eq!(form.value("customer_industry"), Some(&json!("")));
}

#[test_log::test(tokio::test)]
async fn navigation_updates_sidebar() {
    let session = session_with(Arc::new(SwitchableBackend::default())).await;
    let route = session.navigate("/customers/42").await.unwrap();
    assert_eq!(route.param("id"), Some("42"));

    let sidebar = session.sidebar().await;
    assert_eq!(sidebar.title, "CRM System");
    let active: Vec<_> = sidebar.items.iter().filter(|i| i.active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].label, "Customers");

    assert!(session.navigate("/nowhere").await.is_none());
    let sidebar = session.sidebar().await;
    assert!(sidebar.items.iter().any(|i| i.active && i.label == "Customers"));
}

#[test_log::test(tokio::test)]
async fn empty_dashboard_shows_hint() {
    let session = session_with(Arc::new(SwitchableBackend::default())).await;
    session
        .store()
        .update_layout("dashboard", crm_config::PageLayout::default())
        .await
        .unwrap();
    let view = session.render_page("dashboard").await;
    assert!(matches!(view, PageView::Empty { hint: Some(_), .. }));
}
