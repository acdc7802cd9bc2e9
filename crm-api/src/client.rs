//! HTTP client for the CRM REST backend.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{ApiError, Result};
use crate::quote::QuoteDraft;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// A backend record: an `id` plus arbitrary attributes.
pub type Record = Value;

/// Thin wrapper over the customer and quote endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// Client for `base_url` with a default `reqwest` client.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("crm-console/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `GET /customers`
    #[instrument(skip(self))]
    pub async fn customers(&self) -> Result<Vec<Record>> {
        self.get(&["customers"]).await
    }

    /// `GET /customers/:id`
    #[instrument(skip(self))]
    pub async fn customer(&self, id: &str) -> Result<Record> {
        self.get(&["customers", id]).await
    }

    /// `GET /quotes`
    #[instrument(skip(self))]
    pub async fn quotes(&self) -> Result<Vec<Record>> {
        self.get(&["quotes"]).await
    }

    /// `POST /quotes`. The draft is checked locally first and never sent when invalid.
    #[instrument(skip(self, draft))]
    pub async fn create_quote(&self, draft: &QuoteDraft) -> Result<Record> {
        draft.validate()?;
        let url = self.endpoint(&["quotes"]);
        debug!(%url, items = draft.items.len(), "creating quote");
        let response = self.client.post(url).json(draft).send().await?;
        read(response).await
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments);
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        read(response).await
    }

    /// Append path segments to the base URL, escaping each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

async fn read<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "backend request failed");
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}
