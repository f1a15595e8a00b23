//! Blocking HTTP client for the knowledge-base page API.

use super::{PageId, StorageError};
use crate::config::StorageConfig;
use crate::model::Recipe;
use crate::storage::render;
use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

/// Page CRUD client. Transient failures (429/5xx) are retried here with a
/// short backoff; 404 surfaces as [`StorageError::NotFound`].
pub struct KnowledgeBaseClient {
    http: Client,
    base_url: String,
    api_token: String,
    collection_id: String,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl KnowledgeBaseClient {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            collection_id: config.collection_id.clone(),
            retry_attempts: config.retry_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Creates a page holding the rendered recipe, returning its id.
    pub fn create_page(&self, recipe: &Recipe) -> Result<PageId, StorageError> {
        let body = json!({
            "parent": { "database_id": self.collection_id },
            "properties": render::recipe_properties(recipe),
            "children": render::recipe_to_blocks(recipe),
        });
        let value = self.execute(|| {
            self.http
                .post(format!("{}/pages", self.base_url))
                .json(&body)
        })?;
        Ok(PageId(value["id"].as_str().unwrap_or_default().to_string()))
    }

    /// Fetches a page by id.
    pub fn get_page(&self, id: &PageId) -> Result<Value, StorageError> {
        self.execute_for(id, || {
            self.http.get(format!("{}/pages/{}", self.base_url, id))
        })
    }

    /// Replaces a page's properties with a re-rendered recipe.
    pub fn update_page(&self, id: &PageId, recipe: &Recipe) -> Result<(), StorageError> {
        let body = json!({ "properties": render::recipe_properties(recipe) });
        self.execute_for(id, || {
            self.http
                .patch(format!("{}/pages/{}", self.base_url, id))
                .json(&body)
        })?;
        Ok(())
    }

    /// Archives (soft-deletes) a page.
    pub fn archive_page(&self, id: &PageId) -> Result<(), StorageError> {
        let body = json!({ "archived": true });
        self.execute_for(id, || {
            self.http
                .patch(format!("{}/pages/{}", self.base_url, id))
                .json(&body)
        })?;
        Ok(())
    }

    /// Lists the pages of the configured collection.
    pub fn list_pages(&self) -> Result<Vec<Value>, StorageError> {
        let value = self.execute(|| {
            self.http.post(format!(
                "{}/databases/{}/query",
                self.base_url, self.collection_id
            ))
        })?;
        Ok(value["results"].as_array().cloned().unwrap_or_default())
    }

    /// Full-text search over stored pages.
    pub fn search_pages(&self, query: &str) -> Result<Vec<Value>, StorageError> {
        let body = json!({ "query": query });
        let value = self.execute(|| {
            self.http
                .post(format!("{}/search", self.base_url))
                .json(&body)
        })?;
        Ok(value["results"].as_array().cloned().unwrap_or_default())
    }

    fn execute<F>(&self, build: F) -> Result<Value, StorageError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut last_status = 0u16;
        for attempt in 1..=self.retry_attempts {
            let response = build()
                .bearer_auth(&self.api_token)
                .send()?;

            match classify(&response) {
                Disposition::Ok => return Ok(response.json()?),
                Disposition::Transient(status) => {
                    last_status = status;
                    warn!(
                        "Transient storage failure (HTTP {}), attempt {}/{}",
                        status, attempt, self.retry_attempts
                    );
                    if attempt < self.retry_attempts {
                        std::thread::sleep(self.retry_delay * attempt);
                    }
                }
                Disposition::NotFound => {
                    return Err(StorageError::NotFound(PageId(String::new())))
                }
                Disposition::Rejected(status) => {
                    let message = response.text().unwrap_or_default();
                    return Err(StorageError::Api { status, message });
                }
            }
        }
        Err(StorageError::Transient {
            status: last_status,
            attempts: self.retry_attempts,
        })
    }

    /// Same as [`execute`], but 404 carries the page id it was about.
    fn execute_for<F>(&self, id: &PageId, build: F) -> Result<Value, StorageError>
    where
        F: Fn() -> RequestBuilder,
    {
        debug!("Storage request for page {}", id);
        self.execute(build).map_err(|err| match err {
            StorageError::NotFound(_) => StorageError::NotFound(id.clone()),
            other => other,
        })
    }
}

enum Disposition {
    Ok,
    NotFound,
    Transient(u16),
    Rejected(u16),
}

fn classify(response: &Response) -> Disposition {
    let status = response.status();
    if status.is_success() {
        Disposition::Ok
    } else if status == StatusCode::NOT_FOUND {
        Disposition::NotFound
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        Disposition::Transient(status.as_u16())
    } else {
        Disposition::Rejected(status.as_u16())
    }
}
