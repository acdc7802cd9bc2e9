//! Custom field schema for the CRM console
//!
//! `crm-fields` is a schema-only crate. It owns the shape of user-defined fields
//! that an administrator attaches to business entities, the editable draft used
//! by management forms, and the rules a draft must pass before it is committed.
//! It knows nothing about where definitions are stored; the configuration store
//! owns that.
//!
//! # Architecture
//!
//! - **Closed catalogues**: entity types and field types are fixed enums
//! - **Drafts are strings**: form input stays text until validation parses it
//! - **Collect, don't short-circuit**: validation reports every failing rule at once

pub mod draft;
pub mod error;
pub mod types;
pub mod validation;

pub use draft::{parse_options, FieldDraft};
pub use error::{FieldsError, Result};
pub use types::{filter_by_entity, CustomFieldDefinition, EntityType, FieldType};
pub use validation::{validate_draft, ValidatedField, ValidationErrors};
