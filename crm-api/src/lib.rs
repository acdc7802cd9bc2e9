//! REST backend access for the CRM console
//!
//! [`ApiClient`] wraps the backend's customer and quote endpoints. Records are
//! opaque JSON objects; the console only relies on their `id`. [`QuoteDraft`]
//! is the working copy behind the quote creation page.

pub mod client;
pub mod error;
pub mod quote;

pub use client::{ApiClient, Record, DEFAULT_API_URL};
pub use error::{ApiError, Result};
pub use quote::{Product, QuoteDraft, QuoteItem};
