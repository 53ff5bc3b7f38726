//! JWT claims shape shared with the identity collaborator.
//!
//! The cart service never issues tokens; it only verifies them against the
//! shared HS256 secret and trusts the decoded identity claims. Keeping the
//! claims struct here pins the field names for both sides.

use serde::{Deserialize, Serialize};

use crate::types::{UserId, UserRole};

/// Decoded bearer token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's ID at the identity collaborator.
    pub sub: String,

    /// Display name, as issued.
    pub name: String,

    /// Email, as issued.
    pub email: String,

    /// Role granted by the identity collaborator.
    pub role: UserRole,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,

    /// Expiration, seconds since the Unix epoch.
    pub exp: i64,
}

impl Claims {
    /// The subject as a typed user ID.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::new(self.sub.clone())
    }
}
