//! Firestore REST client

use super::decode::{decode_collection_ids, decode_run_query};
use super::endpoints::Endpoints;
use crate::error::Result;
use crate::http::HttpClient;
use crate::pagination::{Page, PageFetcher, PageRequest, PageToken};
use crate::query::build_query;
use crate::types::JsonValue;
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

/// Explicit page limit used unless configured otherwise
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Client for one project's database
#[derive(Debug)]
pub struct FirestoreClient {
    http: HttpClient,
    endpoints: Endpoints,
    page_size: Option<u32>,
}

impl FirestoreClient {
    /// Create a client over an authenticated HTTP client
    pub fn new(http: HttpClient, endpoints: Endpoints) -> Self {
        Self {
            http,
            endpoints,
            page_size: Some(DEFAULT_PAGE_SIZE),
        }
    }

    /// Set the page limit; `None` leaves the page size to the server
    #[must_use]
    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size;
        self
    }

    /// Endpoint URLs in use
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Page limit in use
    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    /// Authenticate before any data call
    pub async fn authenticate(&self) -> Result<()> {
        self.http.authenticate().await
    }

    /// List the collection ids at the database root
    ///
    /// One round-trip; the ids come back in response order.
    pub async fn list_collections(&self) -> Result<Vec<String>> {
        let url = self.endpoints.list_collection_ids();
        debug!("Listing collections at {}", url);
        let response: JsonValue = self.http.post_json(&url, &json!({})).await?;
        let ids = decode_collection_ids(&response)?;
        info!("Found {} collections", ids.len());
        Ok(ids)
    }
}

#[async_trait]
impl PageFetcher for FirestoreClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page> {
        let body = build_query(
            &request.collection,
            request.cursor_key.as_deref(),
            request.last_cursor_value,
            request.token.as_ref(),
            self.page_size,
        );
        debug!(
            "Querying {} (cursor {:?}, after {:?})",
            request.collection,
            request.cursor_key,
            request.token.as_ref().map(PageToken::to_value)
        );

        let response: JsonValue = self
            .http
            .post_json(&self.endpoints.run_query(), &body)
            .await?;
        let records = decode_run_query(&response)?;

        Ok(Page::from_records(records, request.cursor_key.as_deref()))
    }
}
