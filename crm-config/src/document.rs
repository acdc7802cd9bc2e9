//! The configuration document.
//!
//! One document per session. It is cloned into a new value for every write and
//! shared read-only behind an `Arc` everywhere else.

use std::collections::BTreeMap;

use crm_fields::{CustomFieldDefinition, ValidationErrors};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ulid::Ulid;

static COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("Failed to compile color regex")
});

static CURRENCY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("Failed to compile currency regex"));

/// Company-wide display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSettings {
    pub company_name: String,
    pub currency: String,
    pub date_format: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            company_name: "CRM System".into(),
            currency: "USD".into(),
            date_format: "MM/DD/YYYY".into(),
        }
    }
}

impl GeneralSettings {
    pub fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.company_name.trim().is_empty() {
            errors.insert("companyName", "Company name is required");
        }
        if !CURRENCY.is_match(&self.currency) {
            errors.insert("currency", "Currency must be a three-letter code such as USD");
        }
        if self.date_format.trim().is_empty() {
            errors.insert("dateFormat", "Date format is required");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Console colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub primary: String,
    pub secondary: String,
    pub sidebar: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: "#4a6cf7".into(),
            secondary: "#6c757d".into(),
            sidebar: "#2a3042".into(),
        }
    }
}

impl Theme {
    /// Every color must be `#rgb` or `#rrggbb`.
    pub fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (key, value) in [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("sidebar", &self.sidebar),
        ] {
            if !COLOR.is_match(value) {
                errors.insert(key, format!("'{value}' is not a hex color"));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Widget placement for one named page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLayout {
    #[serde(default)]
    pub active_components: Vec<String>,
    /// Reserved positioning data, carried through untouched.
    #[serde(default = "empty_grid")]
    pub grid_layout: Value,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            active_components: Vec::new(),
            grid_layout: empty_grid(),
        }
    }
}

impl PageLayout {
    pub fn new(active_components: Vec<String>) -> Self {
        Self {
            active_components,
            grid_layout: empty_grid(),
        }
    }
}

fn empty_grid() -> Value {
    Value::Object(serde_json::Map::new())
}

/// The whole configuration document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldDefinition>,
    #[serde(default)]
    pub layout: BTreeMap<String, PageLayout>,
}

impl Configuration {
    /// Stored layout for a page, if one was ever saved.
    pub fn page_layout(&self, page: &str) -> Option<&PageLayout> {
        self.layout.get(page)
    }

    /// Custom fields attached to an entity, case-insensitive, in insertion order.
    ///
    /// Unlike the listing filter there is no "all" wildcard: a name that is not
    /// an entity type matches nothing.
    pub fn custom_fields_for(&self, entity: &str) -> Vec<&CustomFieldDefinition> {
        self.custom_fields
            .iter()
            .filter(|f| f.belongs_to(entity))
            .collect()
    }

    pub fn find_field(&self, id: &Ulid) -> Option<&CustomFieldDefinition> {
        self.custom_fields.iter().find(|f| &f.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_fields::{EntityType, FieldType};

    #[test]
    fn defaults_match_console_defaults() {
        let config = Configuration::default();
        assert_eq!(config.general.company_name, "CRM System");
        assert_eq!(config.general.currency, "USD");
        assert_eq!(config.theme.primary, "#4a6cf7");
        assert!(config.custom_fields.is_empty());
        assert!(config.layout.is_empty());
    }

    #[test]
    fn theme_validation_rejects_non_hex() {
        let theme = Theme {
            primary: "blue".into(),
            secondary: "#fff".into(),
            sidebar: "#2a3042".into(),
        };
        let errors = theme.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.get("primary").unwrap().contains("blue"));
    }

    #[test]
    fn general_validation_checks_currency() {
        let general = GeneralSettings {
            currency: "usd".into(),
            ..GeneralSettings::default()
        };
        let errors = general.validate().unwrap_err();
        assert!(errors.contains_key("currency"));
        assert!(GeneralSettings::default().validate().is_ok());
    }

    #[test]
    fn document_deserializes_from_partial_yaml() {
        let yaml = r#"
general:
  companyName: Acme
  currency: EUR
  dateFormat: DD/MM/YYYY
layout:
  dashboard:
    activeComponents: [CustomerStats, SalesChart]
"#;
        let config: Configuration = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.general.company_name, "Acme");
        assert_eq!(config.theme, Theme::default());
        let dashboard = config.page_layout("dashboard").unwrap();
        assert_eq!(dashboard.active_components, vec!["CustomerStats", "SalesChart"]);
        assert!(dashboard.grid_layout.is_object());
    }

    #[test]
    fn custom_fields_for_filters_by_entity() {
        let mut config = Configuration::default();
        config.custom_fields.push(CustomFieldDefinition {
            id: Ulid::new(),
            entity: EntityType::Quote,
            name: "channel".into(),
            label: "Channel".into(),
            type_: FieldType::Text,
            required: false,
            options: Vec::new(),
            placeholder: None,
            default_value: None,
        });
        assert_eq!(config.custom_fields_for("Quote").len(), 1);
        assert!(config.custom_fields_for("customer").is_empty());
        assert!(config.custom_fields_for("all").is_empty());
        assert!(config.custom_fields_for("").is_empty());
        let id = config.custom_fields[0].id;
        assert_eq!(config.find_field(&id).unwrap().name, "channel");
    }
}
