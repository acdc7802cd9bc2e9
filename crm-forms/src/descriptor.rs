//! Form field descriptors and the fixed type-to-control mapping.

use crm_fields::{CustomFieldDefinition, FieldType};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// How a field is edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "control", rename_all = "kebab-case")]
pub enum Control {
    TextInput {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    TextArea {
        rows: u8,
    },
    NumberInput {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        step: f64,
    },
    DatePicker,
    Toggle,
    /// Closed choice. `prompt` is the empty entry shown before the options.
    Choice {
        prompt: String,
        options: Vec<String>,
    },
}

/// One field of a form, standard or custom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldDescriptor {
    pub name: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl FormFieldDescriptor {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            options: Vec::new(),
            placeholder: None,
            min: None,
            max: None,
            step: None,
            default_value: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Label shown to users, falling back to the field name.
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.name
        } else {
            &self.label
        }
    }

    pub fn control(&self) -> Control {
        match self.kind {
            FieldType::Text => Control::TextInput {
                placeholder: self.placeholder.clone(),
            },
            FieldType::Textarea => Control::TextArea { rows: 4 },
            FieldType::Number => Control::NumberInput {
                min: self.min,
                max: self.max,
                step: self.step.unwrap_or(1.0),
            },
            FieldType::Date => Control::DatePicker,
            FieldType::Checkbox => Control::Toggle,
            FieldType::Dropdown => Control::Choice {
                prompt: format!("Select {}", self.display_label()),
                options: self.options.clone(),
            },
        }
    }

    /// Starting value when the draft has none.
    ///
    /// A stored default wins when it fits the type; otherwise checkboxes start
    /// unchecked, numbers at zero, dropdowns on their first option, and text empty.
    pub fn seed_value(&self) -> Value {
        if let Some(value) = self.default_value.as_deref().and_then(|d| self.coerce_default(d)) {
            return value;
        }
        match self.kind {
            FieldType::Checkbox => Value::Bool(false),
            FieldType::Number => json!(0),
            FieldType::Dropdown => Value::String(self.options.first().cloned().unwrap_or_default()),
            _ => Value::String(String::new()),
        }
    }

    /// Convert raw control input into a draft value of the right shape.
    pub fn parse_input(&self, raw: &str) -> Value {
        match self.kind {
            FieldType::Checkbox => Value::Bool(parse_flag(raw).unwrap_or(false)),
            FieldType::Number => parse_number(raw).unwrap_or_else(|| {
                if raw.trim().is_empty() {
                    Value::Null
                } else {
                    Value::String(raw.to_string())
                }
            }),
            _ => Value::String(raw.to_string()),
        }
    }

    fn coerce_default(&self, raw: &str) -> Option<Value> {
        match self.kind {
            FieldType::Checkbox => parse_flag(raw).map(Value::Bool),
            FieldType::Number => parse_number(raw),
            FieldType::Dropdown => self
                .options
                .iter()
                .any(|o| o == raw)
                .then(|| Value::String(raw.to_string())),
            _ => Some(Value::String(raw.to_string())),
        }
    }
}

impl From<&CustomFieldDefinition> for FormFieldDescriptor {
    fn from(def: &CustomFieldDefinition) -> Self {
        Self {
            name: def.name.clone(),
            label: def.label.clone(),
            kind: def.type_,
            required: def.required,
            options: def.options().to_vec(),
            placeholder: def.placeholder.clone(),
            min: None,
            max: None,
            step: None,
            default_value: def.default_value.clone(),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Some(true),
        "false" | "off" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if let Ok(i) = raw.parse::<i64>() {
        return Some(json!(i));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}
