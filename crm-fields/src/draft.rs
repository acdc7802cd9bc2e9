//! Editable drafts for the custom field management form.
//!
//! Drafts mirror the form inputs: every attribute is held as text (apart from
//! the type picker and the required toggle) until validation parses it.

use serde::{Deserialize, Serialize};

use crate::error::{FieldsError, Result};
use crate::types::{CustomFieldDefinition, FieldType};

/// Uncommitted custom field input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDraft {
    pub entity: String,
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub type_: FieldType,
    pub required: bool,
    /// Comma-separated option list, only read for dropdowns.
    pub options: String,
    pub placeholder: String,
    pub default_value: String,
}

impl FieldDraft {
    /// An empty draft: no entity, text type, not required.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = entity.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_type(mut self, type_: FieldType) -> Self {
        self.type_ = type_;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = options.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }

    /// Build an editable draft from a stored definition.
    ///
    /// The option list is presented as `"A, B, C"`.
    pub fn from_definition(def: &CustomFieldDefinition) -> Self {
        Self {
            entity: def.entity.as_str().to_string(),
            name: def.name.clone(),
            label: def.label.clone(),
            type_: def.type_,
            required: def.required,
            options: def.options().join(", "),
            placeholder: def.placeholder.clone().unwrap_or_default(),
            default_value: def.default_value.clone().unwrap_or_default(),
        }
    }

    /// Apply a text input change by attribute key, the way a form input names it.
    ///
    /// `type` is parsed into a [`FieldType`]; `required` accepts `true`/`on`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "entity" => self.entity = value.to_string(),
            "name" => self.name = value.to_string(),
            "label" => self.label = value.to_string(),
            "type" => self.type_ = value.parse()?,
            "required" => {
                self.required = matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "on")
            }
            "options" => self.options = value.to_string(),
            "placeholder" => self.placeholder = value.to_string(),
            "defaultValue" | "default_value" => self.default_value = value.to_string(),
            other => {
                return Err(FieldsError::UnknownDraftKey {
                    key: other.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Parsed option list for this draft (empty unless the type is dropdown).
    pub fn parsed_options(&self) -> Vec<String> {
        if self.type_.uses_options() {
            parse_options(&self.options)
        } else {
            Vec::new()
        }
    }
}

/// Split comma-separated option input into an ordered list.
///
/// Segments are trimmed and empty segments are dropped, so a trailing comma or
/// a doubled comma never produces a blank option.
pub fn parse_options(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
