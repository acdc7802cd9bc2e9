//! ConfigStore: the single owner of the configuration document.
//!
//! Readers get `Arc<Configuration>` snapshots or subscribe to a watch channel.
//! Writers go through the mutators, which build the next document, persist it
//! through the backend under the save policy, and only then publish it. A failed
//! write leaves the published document untouched.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crm_fields::{validate_draft, CustomFieldDefinition, FieldDraft};
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};
use ulid::Ulid;

use crate::backend::ConfigBackend;
use crate::document::{Configuration, GeneralSettings, PageLayout, Theme};
use crate::error::{ConfigError, Result};

/// Timeout and retry policy for backend saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavePolicy {
    /// Upper bound for a single backend call.
    pub timeout: Duration,
    /// Extra attempts after the first failure.
    pub retries: u32,
    /// Delay before the first retry; doubled for each further retry.
    pub backoff: Duration,
}

impl Default for SavePolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retries: 2,
            backoff: Duration::from_millis(200),
        }
    }
}

/// Builder for `ConfigStore`. Created by `ConfigStore::open()`.
pub struct ConfigStoreBuilder {
    backend: Arc<dyn ConfigBackend>,
    defaults: Option<Configuration>,
    policy: SavePolicy,
}

impl ConfigStoreBuilder {
    /// Document to seed when the backend has nothing stored yet.
    pub fn with_defaults(mut self, defaults: Configuration) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn with_policy(mut self, policy: SavePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the store: load from the backend, seeding defaults if it is empty.
    pub async fn build(self) -> Result<ConfigStore> {
        let seed = self.defaults.unwrap_or_default();
        let (current, _) = watch::channel(Arc::new(seed.clone()));

        let store = ConfigStore {
            backend: self.backend,
            policy: self.policy,
            current,
            loading: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            write_guard: Mutex::new(()),
        };

        if !store.reload().await? {
            store.persist(&seed).await?;
            debug!("seeded default configuration");
        }

        let config = store.config();
        debug!(
            fields = config.custom_fields.len(),
            pages = config.layout.len(),
            "configuration store opened"
        );
        Ok(store)
    }
}

/// Injectable owner of the configuration document.
pub struct ConfigStore {
    backend: Arc<dyn ConfigBackend>,
    policy: SavePolicy,
    current: watch::Sender<Arc<Configuration>>,
    loading: AtomicBool,
    closed: AtomicBool,
    write_guard: Mutex<()>,
}

impl ConfigStore {
    /// Open a store over a backend. Returns a builder for optional configuration.
    ///
    /// ```rust,ignore
    /// let store = ConfigStore::open(FileBackend::new(path))
    ///     .with_policy(settings.save_policy())
    ///     .build()
    ///     .await?;
    /// ```
    pub fn open(backend: impl ConfigBackend + 'static) -> ConfigStoreBuilder {
        Self::open_shared(Arc::new(backend))
    }

    /// Like [`ConfigStore::open`] for a backend that is already shared.
    pub fn open_shared(backend: Arc<dyn ConfigBackend>) -> ConfigStoreBuilder {
        ConfigStoreBuilder {
            backend,
            defaults: None,
            policy: SavePolicy::default(),
        }
    }

    // --- Reads ---

    /// Current document snapshot.
    pub fn config(&self) -> Arc<Configuration> {
        self.current.borrow().clone()
    }

    /// True while the document is being (re)loaded from the backend.
    pub fn loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Receive every committed document. The receiver starts at the current one.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Configuration>> {
        self.current.subscribe()
    }

    pub fn policy(&self) -> SavePolicy {
        self.policy
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Custom field definitions, optionally filtered to one entity (`"all"` = no filter).
    pub fn list_custom_fields(&self, entity: Option<&str>) -> Vec<CustomFieldDefinition> {
        let config = self.config();
        crm_fields::filter_by_entity(&config.custom_fields, entity)
            .into_iter()
            .cloned()
            .collect()
    }

    // --- Lifecycle ---

    /// Re-read the document from the backend. Returns false if the backend is empty.
    pub async fn reload(&self) -> Result<bool> {
        self.ensure_open()?;
        self.loading.store(true, Ordering::SeqCst);
        let loaded = self.backend.load().await;
        self.loading.store(false, Ordering::SeqCst);

        match loaded? {
            Some(config) => {
                self.current.send_replace(Arc::new(config));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Shut the store down. Reads keep returning the last document; writes fail.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!("configuration store closed");
        }
    }

    // --- Custom fields ---

    /// Validate a draft and append it as a new definition with a fresh id.
    pub async fn add_custom_field(&self, draft: &FieldDraft) -> Result<CustomFieldDefinition> {
        self.commit("add custom field", |config| {
            let field = validate_draft(draft, &config.custom_fields, None)?;
            let def = field.into_definition(Ulid::new());
            config.custom_fields.push(def.clone());
            Ok(def)
        })
        .await
    }

    /// Replace a definition in place, keeping its id and position.
    pub async fn update_custom_field(
        &self,
        id: &Ulid,
        draft: &FieldDraft,
    ) -> Result<CustomFieldDefinition> {
        self.commit("update custom field", |config| {
            let idx = field_index(config, id)?;
            let field = validate_draft(draft, &config.custom_fields, Some(*id))?;
            let def = field.into_definition(*id);
            config.custom_fields[idx] = def.clone();
            Ok(def)
        })
        .await
    }

    /// Remove a definition. Stored entity values are not migrated.
    pub async fn delete_custom_field(&self, id: &Ulid) -> Result<CustomFieldDefinition> {
        self.commit("delete custom field", |config| {
            let idx = field_index(config, id)?;
            Ok(config.custom_fields.remove(idx))
        })
        .await
    }

    // --- Sections ---

    pub async fn update_theme(&self, theme: Theme) -> Result<()> {
        self.commit("update theme", |config| {
            theme.validate()?;
            config.theme = theme;
            Ok(())
        })
        .await
    }

    pub async fn update_general(&self, general: GeneralSettings) -> Result<()> {
        self.commit("update general settings", |config| {
            general.validate()?;
            config.general = general;
            Ok(())
        })
        .await
    }

    /// Store the layout for a page, replacing any previous one.
    pub async fn update_layout(&self, page: &str, layout: PageLayout) -> Result<()> {
        self.commit("update layout", |config| {
            config.layout.insert(page.to_string(), layout);
            Ok(())
        })
        .await
    }

    // --- Internal ---

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(ConfigError::Closed);
        }
        Ok(())
    }

    /// Apply `mutate` to a copy of the document, persist it, then publish it.
    async fn commit<T, F>(&self, op: &'static str, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut Configuration) -> Result<T>,
    {
        self.ensure_open()?;
        let _guard = self.write_guard.try_lock().map_err(|_| ConfigError::Busy)?;

        let mut next = (*self.config()).clone();
        let output = mutate(&mut next)?;
        self.persist(&next).await?;
        self.current.send_replace(Arc::new(next));

        debug!(op, "configuration committed");
        Ok(output)
    }

    async fn persist(&self, config: &Configuration) -> Result<()> {
        let mut delay = self.policy.backoff;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let outcome = match tokio::time::timeout(self.policy.timeout, self.backend.save(config))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(ConfigError::Timeout {
                    elapsed_ms: self.policy.timeout.as_millis() as u64,
                }),
            };

            let err = match outcome {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };

            if err.is_retryable() && attempt <= self.policy.retries {
                warn!(attempt, error = %err, delay_ms = delay.as_millis() as u64, "configuration save failed, retrying");
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
                continue;
            }

            warn!(attempt, error = %err, "configuration save failed");
            return Err(match err {
                ConfigError::Timeout { .. } => err,
                other if other.is_retryable() => ConfigError::Persistence {
                    attempts: attempt,
                    message: other.to_string(),
                },
                other => other,
            });
        }
    }
}

fn field_index(config: &Configuration, id: &Ulid) -> Result<usize> {
    config
        .custom_fields
        .iter()
        .position(|f| &f.id == id)
        .ok_or_else(|| ConfigError::FieldNotFound { id: id.to_string() })
}
