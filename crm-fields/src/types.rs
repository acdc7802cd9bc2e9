//! Core custom field types.
//!
//! A custom field definition describes one named, typed attribute attached to
//! a single entity type. Definitions serialize with camelCase keys so the same
//! document can be stored as YAML and exchanged as JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::FieldsError;

/// The business entities that can carry custom fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Customer,
    Quote,
    Project,
    Invoice,
    Product,
}

impl EntityType {
    /// Every entity type, in the order they are offered to users.
    pub const ALL: [EntityType; 5] = [
        EntityType::Customer,
        EntityType::Quote,
        EntityType::Project,
        EntityType::Invoice,
        EntityType::Product,
    ];

    /// Internal identifier (`"customer"`, `"quote"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Customer => "customer",
            EntityType::Quote => "quote",
            EntityType::Project => "project",
            EntityType::Invoice => "invoice",
            EntityType::Product => "product",
        }
    }

    /// Display label for select controls.
    pub fn label(&self) -> &'static str {
        match self {
            EntityType::Customer => "Customer",
            EntityType::Quote => "Quote",
            EntityType::Project => "Project",
            EntityType::Invoice => "Invoice",
            EntityType::Product => "Product",
        }
    }

    /// Case-insensitive comparison against a user- or caller-supplied name.
    pub fn matches(&self, name: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(name.trim())
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = FieldsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|e| e.matches(s))
            .ok_or_else(|| FieldsError::UnknownEntity {
                value: s.to_string(),
            })
    }
}

/// The type of a custom field. Determines its control and default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Number,
    Date,
    Checkbox,
    Dropdown,
}

impl FieldType {
    pub const ALL: [FieldType; 6] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Number,
        FieldType::Date,
        FieldType::Checkbox,
        FieldType::Dropdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Checkbox => "checkbox",
            FieldType::Dropdown => "dropdown",
        }
    }

    /// Display label for the field type picker.
    pub fn label(&self) -> &'static str {
        match self {
            FieldType::Text => "Text Input",
            FieldType::Textarea => "Text Area",
            FieldType::Number => "Number",
            FieldType::Date => "Date",
            FieldType::Checkbox => "Checkbox",
            FieldType::Dropdown => "Dropdown",
        }
    }

    /// Only dropdowns carry an option list.
    pub fn uses_options(&self) -> bool {
        matches!(self, FieldType::Dropdown)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = FieldsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FieldsError::UnknownFieldType {
                value: s.to_string(),
            })
    }
}

/// A committed custom field definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldDefinition {
    pub id: Ulid,
    pub entity: EntityType,
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub type_: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl CustomFieldDefinition {
    /// Option list as seen by consumers: empty for every type but dropdown.
    pub fn options(&self) -> &[String] {
        if self.type_.uses_options() {
            &self.options
        } else {
            &[]
        }
    }

    /// Whether this field is attached to the named entity (case-insensitive).
    pub fn belongs_to(&self, entity: &str) -> bool {
        self.entity.matches(entity)
    }
}

/// Filter definitions to one entity type, preserving insertion order.
///
/// `None` and `"all"` (any case) return every definition. Any other filter is
/// compared case-insensitively against the entity name, so an unknown filter
/// simply matches nothing.
pub fn filter_by_entity<'a>(
    fields: &'a [CustomFieldDefinition],
    filter: Option<&str>,
) -> Vec<&'a CustomFieldDefinition> {
    match filter.map(str::trim) {
        None => fields.iter().collect(),
        Some(f) if f.is_empty() || f.eq_ignore_ascii_case("all") => fields.iter().collect(),
        Some(f) => fields.iter().filter(|d| d.belongs_to(f)).collect(),
    }
}
