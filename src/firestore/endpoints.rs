//! Endpoint URLs

use crate::error::{Error, Result};
use url::Url;

/// Public REST root
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1/";

/// Database id used when none is configured
pub const DEFAULT_DATABASE: &str = "(default)";

/// URLs of one project's database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    documents: Url,
}

impl Endpoints {
    /// Resolve the documents root of a database
    ///
    /// A base URL without a trailing slash is treated as a directory so
    /// that its last path segment is kept.
    pub fn new(base_url: &str, project_id: &str, database_id: &str) -> Result<Self> {
        if project_id.trim().is_empty() {
            return Err(Error::missing_field("project_id"));
        }
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let documents = Url::parse(&base)?.join(&format!(
            "projects/{project_id}/databases/{database_id}/documents"
        ))?;
        Ok(Self { documents })
    }

    /// `documents` root
    pub fn documents(&self) -> &str {
        self.documents.as_str()
    }

    /// `documents:runQuery`
    pub fn run_query(&self) -> String {
        format!("{}:runQuery", self.documents)
    }

    /// `documents:listCollectionIds`
    pub fn list_collection_ids(&self) -> String {
        format!("{}:listCollectionIds", self.documents)
    }
}
