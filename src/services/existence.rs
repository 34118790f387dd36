//! Existence checks against the User and Book services
//!
//! A lookup answers only "yes" or "no". Anything other than `200 OK`,
//! including transport failures, is a "no": the check fails closed and
//! never retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExistenceCheck: Send + Sync {
    async fn exists(&self, entity_id: &str) -> bool;
}

/// `GET {base_url}/{id}` lookup client
#[derive(Clone)]
pub struct HttpExistenceClient {
    client: Client,
    base_url: String,
    entity: &'static str,
}

impl HttpExistenceClient {
    /// `entity` names what is being looked up, for log output only
    pub fn new(base_url: &str, entity: &'static str, timeout: Option<Duration>) -> AppResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            entity,
        })
    }

    pub fn lookup_url(&self, entity_id: &str) -> String {
        format!("{}/{}", self.base_url, entity_id)
    }
}

#[async_trait]
impl ExistenceCheck for HttpExistenceClient {
    async fn exists(&self, entity_id: &str) -> bool {
        let url = self.lookup_url(entity_id);
        match self.client.get(&url).send().await {
            Ok(response) => {
                let status = response.status();
                if status != StatusCode::OK {
                    tracing::debug!(entity = self.entity, id = entity_id, %status, "Lookup returned non-OK status");
                }
                status == StatusCode::OK
            }
            Err(e) => {
                tracing::error!(entity = self.entity, id = entity_id, error = %e, "Error checking {} existence", self.entity);
                false
            }
        }
    }
}
