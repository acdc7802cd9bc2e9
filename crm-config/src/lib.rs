//! Configuration store for the CRM console
//!
//! The configuration document (general settings, theme, custom field
//! definitions, page layouts) is owned by a single [`ConfigStore`] per session.
//! Consumers read immutable snapshots and subscribe to changes; every write goes
//! through a store mutator, which persists the next document through a
//! [`ConfigBackend`] before swapping it in.
//!
//! ```rust,ignore
//! let store = ConfigStore::open(MemoryBackend::new()).build().await?;
//! let field = store.add_custom_field(&draft).await?;
//! let snapshot = store.config();
//! ```

pub mod backend;
pub mod document;
pub mod error;
pub mod settings;
pub mod store;

pub use backend::{ConfigBackend, FileBackend, MemoryBackend};
pub use document::{Configuration, GeneralSettings, PageLayout, Theme};
pub use error::{ConfigError, Result};
pub use settings::ConsoleSettings;
pub use store::{ConfigStore, ConfigStoreBuilder, SavePolicy};
