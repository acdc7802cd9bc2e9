//! Dynamic entity forms
//!
//! A [`DynamicForm`] combines the standard fields a page declares with the
//! custom fields the administrator attached to that entity type. It owns the
//! working draft and its validation errors, and hands the complete draft to a
//! caller-supplied callback on submit. It never persists anything itself.

pub mod descriptor;
pub mod form;

pub use descriptor::{Control, FormFieldDescriptor};
pub use form::{DynamicForm, FieldView, FormView, SectionView};
