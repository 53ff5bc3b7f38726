//! Identity collaborator client.
//!
//! `GET {base_url}/api/users/{id}` requires the caller's own bearer token;
//! the identity service enforces that users only read themselves. Only
//! used for best-effort enrichment - token verification is local.

use async_trait::async_trait;

use subcart_core::{UserId, UserSummary};

/// Errors that can occur when querying the identity collaborator.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Identity service returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Read access to the identity collaborator.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Fetch a user by ID, authenticated with the caller's bearer token.
    /// `Ok(None)` means the identity service has no such user.
    async fn get_user(
        &self,
        id: &UserId,
        token: &str,
    ) -> Result<Option<UserSummary>, IdentityError>;
}

/// Plain REST client for the identity collaborator.
#[derive(Clone)]
pub struct HttpIdentityClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIdentityClient {
    /// Create a new identity client for the given base URL.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl IdentityClient for HttpIdentityClient {
    async fn get_user(
        &self,
        id: &UserId,
        token: &str,
    ) -> Result<Option<UserSummary>, IdentityError> {
        let url = format!("{}/api/users/{}", self.base_url, id);

        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(IdentityError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let user: UserSummary = response
            .json()
            .await
            .map_err(|e| IdentityError::Parse(e.to_string()))?;

        Ok(Some(user))
    }
}
