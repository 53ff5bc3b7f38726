//! Catalog collaborator client.
//!
//! `GET {base_url}/api/services/{id}` returns the service metadata the
//! engine prices carts from. A 404 is a domain answer (no such service),
//! not an error; transport and protocol failures are errors and the
//! caller decides whether they are fatal (add-to-cart) or a silent
//! enrichment degradation (read paths).

use async_trait::async_trait;

use subcart_core::{ServiceId, ServiceSummary};

/// Errors that can occur when querying the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalog returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Read access to the catalog collaborator.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch a service by ID. `Ok(None)` means the catalog has no such
    /// service.
    async fn get_service(&self, id: &ServiceId) -> Result<Option<ServiceSummary>, CatalogError>;
}

/// Plain REST client for the catalog collaborator.
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogClient {
    /// Create a new catalog client for the given base URL.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn get_service(&self, id: &ServiceId) -> Result<Option<ServiceSummary>, CatalogError> {
        let url = format!("{}/api/services/{}", self.base_url, id);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let service: ServiceSummary = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        Ok(Some(service))
    }
}
