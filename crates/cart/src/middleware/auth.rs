//! Authentication extractor for bearer tokens.
//!
//! The cart service never issues tokens. It verifies HS256 tokens from the
//! identity collaborator against the shared secret and trusts the decoded
//! claims. The raw token is kept around because identity enrichment calls
//! pass it through.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{Algorithm, Validation, decode};

use subcart_core::{Claims, UserId};

use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// Missing, malformed, or expired tokens reject the request with 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(user: CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.claims.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Verified token claims.
    pub claims: Claims,
    /// The raw bearer token, for pass-through to collaborators.
    pub token: String,
}

impl CurrentUser {
    /// The authenticated user's ID.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.claims.user_id()
    }

    /// Whether the caller holds the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.claims.role.is_admin()
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(parts)?;

        let data = decode::<Claims>(
            token,
            state.decoding_key(),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Bearer token rejected");
            AppError::Unauthorized("invalid token".to_owned())
        })?;

        Ok(Self {
            claims: data.claims,
            token: token.to_owned(),
        })
    }
}

/// Pull the bearer token out of the `Authorization` header.
fn extract_bearer(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?;

    let header = header
        .to_str()
        .map_err(|_| AppError::Unauthorized("invalid authorization header".to_owned()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?
        .trim();

    if token.is_empty() {
        return Err(AppError::Unauthorized("missing bearer token".to_owned()));
    }

    Ok(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/cart");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_extract_bearer_happy_path() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer(&parts).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_extract_bearer_missing_header() {
        let parts = parts_with_auth(None);
        assert!(matches!(
            extract_bearer(&parts),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_extract_bearer_wrong_scheme() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert!(matches!(
            extract_bearer(&parts),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_extract_bearer_empty_token() {
        let parts = parts_with_auth(Some("Bearer    "));
        assert!(matches!(
            extract_bearer(&parts),
            Err(AppError::Unauthorized(_))
        ));
    }
}
