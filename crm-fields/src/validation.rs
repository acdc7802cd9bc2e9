//! Draft validation for custom field definitions.
//!
//! Every rule runs; failures are collected into [`ValidationErrors`] keyed by
//! the draft attribute they belong to, so a form can show them all inline.

use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::draft::FieldDraft;
use crate::types::{CustomFieldDefinition, EntityType, FieldType};

static FIELD_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("Failed to compile field name regex"));

/// Field-level validation messages, keyed by attribute name, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(IndexMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a key. A later message for the same key replaces the earlier one.
    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.insert(key.into(), message.into());
    }

    /// Drop the message for a key, returning it if present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{key}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// A draft that passed validation, with its text inputs parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedField {
    pub entity: EntityType,
    pub name: String,
    pub label: String,
    pub type_: FieldType,
    pub required: bool,
    pub options: Vec<String>,
    pub placeholder: Option<String>,
    pub default_value: Option<String>,
}

impl ValidatedField {
    /// Attach an id and produce the storable definition.
    pub fn into_definition(self, id: Ulid) -> CustomFieldDefinition {
        CustomFieldDefinition {
            id,
            entity: self.entity,
            name: self.name,
            label: self.label,
            type_: self.type_,
            required: self.required,
            options: self.options,
            placeholder: self.placeholder,
            default_value: self.default_value,
        }
    }
}

/// Validate a draft against the rules and the definitions already stored.
///
/// `editing` is the id of the definition being updated, if any; its own name
/// does not count as a duplicate.
pub fn validate_draft(
    draft: &FieldDraft,
    existing: &[CustomFieldDefinition],
    editing: Option<Ulid>,
) -> std::result::Result<ValidatedField, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let entity_input = draft.entity.trim();
    let entity = if entity_input.is_empty() {
        errors.insert("entity", "Entity is required");
        None
    } else {
        match entity_input.parse::<EntityType>() {
            Ok(entity) => Some(entity),
            Err(_) => {
                errors.insert("entity", format!("Unknown entity type '{entity_input}'"));
                None
            }
        }
    };

    let name = draft.name.as_str();
    if name.trim().is_empty() {
        errors.insert("name", "Field name is required");
    } else if !FIELD_NAME.is_match(name) {
        errors.insert(
            "name",
            "Field name can only contain letters, numbers, and underscores",
        );
    } else if let Some(entity) = entity {
        let taken = existing
            .iter()
            .any(|f| f.entity == entity && f.name == name && Some(f.id) != editing);
        if taken {
            errors.insert(
                "name",
                format!("A field named '{name}' already exists for {entity}"),
            );
        }
    }

    let label = draft.label.trim();
    if label.is_empty() {
        errors.insert("label", "Display label is required");
    }

    let options = draft.parsed_options();
    if draft.type_.uses_options() && options.is_empty() {
        errors.insert("options", "Options are required for dropdown fields");
    }

    match entity {
        Some(entity) if errors.is_empty() => Ok(ValidatedField {
            entity,
            name: name.to_string(),
            label: label.to_string(),
            type_: draft.type_,
            required: draft.required,
            options,
            placeholder: non_empty(&draft.placeholder),
            default_value: non_empty(&draft.default_value),
        }),
        _ => Err(errors),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
