//! Persistence backends for the configuration document.
//!
//! A backend stores exactly one document. The store decides when to call it,
//! how long to wait and how often to retry.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;
use ulid::Ulid;

use crate::document::Configuration;
use crate::error::Result;

/// Where the configuration document lives.
#[async_trait]
pub trait ConfigBackend: Send + Sync {
    /// Read the stored document. `None` means nothing has been saved yet.
    async fn load(&self) -> Result<Option<Configuration>>;

    /// Replace the stored document.
    async fn save(&self, config: &Configuration) -> Result<()>;
}

/// Keeps the document in memory for the lifetime of the session.
#[derive(Default)]
pub struct MemoryBackend {
    stored: Mutex<Option<Configuration>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already stored document.
    pub fn with_document(config: Configuration) -> Self {
        Self {
            stored: Mutex::new(Some(config)),
        }
    }
}

#[async_trait]
impl ConfigBackend for MemoryBackend {
    async fn load(&self) -> Result<Option<Configuration>> {
        Ok(self.stored.lock().await.clone())
    }

    async fn save(&self, config: &Configuration) -> Result<()> {
        *self.stored.lock().await = Some(config.clone());
        Ok(())
    }
}

/// Stores the document as a single YAML file.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigBackend for FileBackend {
    async fn load(&self) -> Result<Option<Configuration>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).await?;
        let config = serde_yaml_ng::from_str::<Configuration>(&content)?;
        debug!(path = %self.path.display(), fields = config.custom_fields.len(), "loaded configuration file");
        Ok(Some(config))
    }

    async fn save(&self, config: &Configuration) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let yaml = serde_yaml_ng::to_string(config)?;
        atomic_write(&self.path, yaml.as_bytes()).await
    }
}

/// Write to a temp file then rename for atomic persistence.
async fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent dir"))?;
    let tmp = dir.join(format!(".tmp_{}", Ulid::new()));
    fs::write(&tmp, data).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
