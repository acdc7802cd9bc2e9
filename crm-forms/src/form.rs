//! DynamicForm: working draft, validation and view model for one entity form.

use crm_config::Configuration;
use crm_fields::{FieldType, ValidationErrors};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::descriptor::{Control, FormFieldDescriptor};

const CUSTOM_SECTION_TITLE: &str = "Additional Information";

/// A rendered field: control, current value and inline error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub required: bool,
    #[serde(flatten)]
    pub control: Control,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub title: String,
    pub fields: Vec<FieldView>,
}

/// What the form shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum FormView {
    Loading {
        message: String,
    },
    Ready {
        fields: Vec<FieldView>,
        /// Present only when at least one custom field applies.
        custom: Option<SectionView>,
        submit_label: String,
    },
}

/// Form for one entity type: standard fields plus that entity's custom fields.
#[derive(Debug, Clone)]
pub struct DynamicForm {
    entity: String,
    standard: Vec<FormFieldDescriptor>,
    custom: Vec<FormFieldDescriptor>,
    values: Map<String, Value>,
    errors: ValidationErrors,
    loading: bool,
    submit_label: String,
}

impl DynamicForm {
    /// Build the form for `entity` from its standard fields, initial values and
    /// the current configuration. Custom fields missing from `initial` are seeded.
    pub fn new(
        entity: impl Into<String>,
        standard: Vec<FormFieldDescriptor>,
        initial: Map<String, Value>,
        config: &Configuration,
    ) -> Self {
        let mut form = Self {
            entity: entity.into(),
            standard,
            custom: Vec::new(),
            values: initial,
            errors: ValidationErrors::new(),
            loading: false,
            submit_label: "Save".into(),
        };
        form.refresh(config);
        form
    }

    pub fn with_submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = label.into();
        self
    }

    /// Mirror the store's loading flag; the view shows a placeholder meanwhile.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Re-read custom fields after a configuration change.
    ///
    /// New fields are seeded; values already in the draft are kept. Values of
    /// custom fields that no longer apply are dropped.
    pub fn refresh(&mut self, config: &Configuration) {
        let previous = std::mem::replace(
            &mut self.custom,
            config
                .custom_fields_for(&self.entity)
                .into_iter()
                .map(FormFieldDescriptor::from)
                .collect(),
        );

        for gone in previous
            .iter()
            .filter(|old| !self.custom.iter().any(|f| f.name == old.name))
        {
            if !self.standard.iter().any(|f| f.name == gone.name) {
                self.values.remove(&gone.name);
                self.errors.remove(&gone.name);
            }
        }

        for field in &self.custom {
            if !self.values.contains_key(&field.name) {
                self.values.insert(field.name.clone(), field.seed_value());
            }
        }
        debug!(entity = %self.entity, custom = self.custom.len(), "form fields refreshed");
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Standard fields followed by custom fields.
    pub fn fields(&self) -> impl Iterator<Item = &FormFieldDescriptor> {
        self.standard.iter().chain(self.custom.iter())
    }

    pub fn custom_fields(&self) -> &[FormFieldDescriptor] {
        &self.custom
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Store a value and clear any error shown for that field.
    pub fn set_value(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
        self.errors.remove(name);
    }

    /// Apply raw control input, converting it to the field's value shape.
    pub fn set_input(&mut self, name: &str, raw: &str) {
        let value = match self.field(name) {
            Some(field) => field.parse_input(raw),
            None => Value::String(raw.to_string()),
        };
        self.set_value(name, value);
    }

    pub fn toggle(&mut self, name: &str, checked: bool) {
        self.set_value(name, Value::Bool(checked));
    }

    /// Check every field, replacing the stored errors with the result.
    pub fn validate(&mut self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for field in self.fields() {
            let value = self.values.get(&field.name).unwrap_or(&Value::Null);
            if field.required && is_blank(value) {
                errors.insert(
                    field.name.clone(),
                    format!("{} is required", field.display_label()),
                );
                continue;
            }
            if field.kind == FieldType::Number && !value.is_number() && !is_blank(value) {
                errors.insert(
                    field.name.clone(),
                    format!("{} must be a number", field.display_label()),
                );
                continue;
            }
            if let Some(message) = range_violation(field, value) {
                errors.insert(field.name.clone(), message);
            }
        }
        self.errors = errors;
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors.clone())
        }
    }

    /// Validate, then hand the complete draft to `on_submit`.
    ///
    /// Nothing is called while any field is invalid.
    pub fn submit<F, R>(&mut self, on_submit: F) -> Result<R, ValidationErrors>
    where
        F: FnOnce(Map<String, Value>) -> R,
    {
        self.validate()?;
        Ok(on_submit(self.values.clone()))
    }

    pub fn render(&self) -> FormView {
        if self.loading {
            return FormView::Loading {
                message: "Loading form...".into(),
            };
        }
        let fields = self.standard.iter().map(|f| self.field_view(f)).collect();
        let custom = (!self.custom.is_empty()).then(|| SectionView {
            title: CUSTOM_SECTION_TITLE.into(),
            fields: self.custom.iter().map(|f| self.field_view(f)).collect(),
        });
        FormView::Ready {
            fields,
            custom,
            submit_label: self.submit_label.clone(),
        }
    }

    fn field(&self, name: &str) -> Option<&FormFieldDescriptor> {
        self.fields().find(|f| f.name == name)
    }

    fn field_view(&self, field: &FormFieldDescriptor) -> FieldView {
        FieldView {
            name: field.name.clone(),
            label: field.display_label().to_string(),
            required: field.required,
            control: field.control(),
            value: self
                .values
                .get(&field.name)
                .cloned()
                .unwrap_or_else(|| Value::String(String::new())),
            error: self.errors.get(&field.name).map(str::to_string),
        }
    }
}

/// Missing, empty text, unchecked, or an empty collection.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(_) => false,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn range_violation(field: &FormFieldDescriptor, value: &Value) -> Option<String> {
    let n = value.as_f64()?;
    let label = field.display_label();
    match (field.min, field.max) {
        (Some(min), _) if n < min => Some(format!("{label} must be at least {min}")),
        (_, Some(max)) if n > max => Some(format!("{label} must be at most {max}")),
        _ => None,
    }
}
