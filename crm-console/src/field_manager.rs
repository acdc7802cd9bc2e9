//! FieldManager: add, edit and delete custom field definitions.
//!
//! At most one editor is open: the add form or the edit form for one field.
//! Drafts are validated locally before the store is asked to commit them; a
//! failed commit keeps the editor open with the same draft and raises a notice.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crm_config::{ConfigError, ConfigStore};
use crm_fields::{validate_draft, CustomFieldDefinition, FieldDraft, ValidationErrors};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use ulid::Ulid;

use crate::error::{ConsoleError, Result};
use crate::notify::Notices;

pub const DELETE_WARNING: &str =
    "Are you sure you want to delete this field? This action cannot be undone and may result in data loss.";

/// Which editor is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "id", rename_all = "lowercase")]
pub enum Editor {
    Closed,
    Adding,
    Editing(Ulid),
}

#[derive(Debug)]
struct ManagerState {
    editor: Editor,
    draft: FieldDraft,
    errors: ValidationErrors,
    filter: String,
    pending_delete: Option<Ulid>,
}

impl Default for ManagerState {
    fn default() -> Self {
        Self {
            editor: Editor::Closed,
            draft: FieldDraft::new(),
            errors: ValidationErrors::new(),
            filter: "all".into(),
            pending_delete: None,
        }
    }
}

impl ManagerState {
    fn close_editor(&mut self) {
        self.editor = Editor::Closed;
        self.draft = FieldDraft::new();
        self.errors.clear();
    }
}

/// Resets the in-flight flag when a submit finishes, however it finishes.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            return Err(ConsoleError::Busy);
        }
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct FieldManager {
    store: Arc<ConfigStore>,
    notices: Arc<Notices>,
    state: RwLock<ManagerState>,
    submitting: AtomicBool,
}

impl FieldManager {
    pub fn new(store: Arc<ConfigStore>, notices: Arc<Notices>) -> Self {
        Self {
            store,
            notices,
            state: RwLock::new(ManagerState::default()),
            submitting: AtomicBool::new(false),
        }
    }

    // --- Listing ---

    /// Definitions matching the current entity filter, in insertion order.
    pub async fn fields(&self) -> Vec<CustomFieldDefinition> {
        let filter = self.state.read().await.filter.clone();
        self.store.list_custom_fields(Some(&filter))
    }

    pub async fn filter(&self) -> String {
        self.state.read().await.filter.clone()
    }

    /// Filter the listing to one entity, or `"all"`.
    pub async fn set_filter(&self, entity: impl Into<String>) {
        self.state.write().await.filter = entity.into();
    }

    // --- Editor ---

    pub async fn editor(&self) -> Editor {
        self.state.read().await.editor
    }

    pub async fn draft(&self) -> FieldDraft {
        self.state.read().await.draft.clone()
    }

    pub async fn errors(&self) -> ValidationErrors {
        self.state.read().await.errors.clone()
    }

    /// True while a commit is in flight; the submit control is disabled.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Open the add form with an empty draft, closing any edit form.
    pub async fn open_add(&self) {
        let mut state = self.state.write().await;
        state.close_editor();
        state.editor = Editor::Adding;
    }

    /// Open the edit form for a stored field, closing the add form.
    pub async fn open_edit(&self, id: &Ulid) -> Result<()> {
        let config = self.store.config();
        let def = config
            .find_field(id)
            .ok_or_else(|| ConfigError::FieldNotFound { id: id.to_string() })?;
        let mut state = self.state.write().await;
        state.close_editor();
        state.draft = FieldDraft::from_definition(def);
        state.editor = Editor::Editing(*id);
        Ok(())
    }

    /// Close whichever editor is open and discard the draft.
    pub async fn cancel(&self) {
        self.state.write().await.close_editor();
    }

    /// Apply one form input and clear the error shown for it.
    pub async fn set_input(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.draft.set(key, value)?;
        let error_key = if key == "default_value" { "defaultValue" } else { key };
        state.errors.remove(error_key);
        Ok(())
    }

    /// Validate the draft and commit it through the store.
    ///
    /// Returns `Ok(None)` when no editor is open. A second call while one is in
    /// flight fails with [`ConsoleError::Busy`].
    pub async fn submit(&self) -> Result<Option<CustomFieldDefinition>> {
        let _in_flight = InFlight::acquire(&self.submitting)?;

        let (editor, draft) = {
            let state = self.state.read().await;
            (state.editor, state.draft.clone())
        };
        let editing = match editor {
            Editor::Closed => return Ok(None),
            Editor::Adding => None,
            Editor::Editing(id) => Some(id),
        };

        let existing = self.store.config();
        if let Err(errors) = validate_draft(&draft, &existing.custom_fields, editing) {
            self.state.write().await.errors = errors.clone();
            return Err(errors.into());
        }

        let committed = match editing {
            None => self.store.add_custom_field(&draft).await,
            Some(id) => self.store.update_custom_field(&id, &draft).await,
        };

        match committed {
            Ok(def) => {
                self.state.write().await.close_editor();
                debug!(id = %def.id, name = %def.name, "custom field saved");
                Ok(Some(def))
            }
            Err(e) => {
                if let Some(errors) = e.validation_errors() {
                    self.state.write().await.errors = errors.clone();
                } else {
                    let verb = if editing.is_some() { "update" } else { "add" };
                    warn!(error = %e, "custom field {verb} failed");
                    self.notices
                        .error(format!("Failed to {verb} custom field. Please try again."))
                        .await;
                }
                Err(e.into())
            }
        }
    }

    // --- Deletion ---

    /// Ask to delete a field. Returns the warning to confirm; nothing is deleted yet.
    pub async fn request_delete(&self, id: &Ulid) -> Result<&'static str> {
        if self.store.config().find_field(id).is_none() {
            return Err(ConfigError::FieldNotFound { id: id.to_string() }.into());
        }
        self.state.write().await.pending_delete = Some(*id);
        Ok(DELETE_WARNING)
    }

    pub async fn pending_delete(&self) -> Option<Ulid> {
        self.state.read().await.pending_delete
    }

    pub async fn cancel_delete(&self) {
        self.state.write().await.pending_delete = None;
    }

    /// Delete the field named by the last [`FieldManager::request_delete`].
    pub async fn confirm_delete(&self) -> Result<CustomFieldDefinition> {
        let id = self
            .state
            .write()
            .await
            .pending_delete
            .take()
            .ok_or(ConsoleError::NoPendingDeletion)?;

        match self.store.delete_custom_field(&id).await {
            Ok(def) => {
                let mut state = self.state.write().await;
                if state.editor == Editor::Editing(id) {
                    state.close_editor();
                }
                debug!(id = %id, "custom field deleted");
                Ok(def)
            }
            Err(e) => {
                warn!(error = %e, "custom field delete failed");
                self.notices
                    .error("Failed to delete custom field. Please try again.")
                    .await;
                Err(e.into())
            }
        }
    }
}
