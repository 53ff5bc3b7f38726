//! Cart item states and user roles.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a cart item.
///
/// Transitions only move forward: `InProgress` -> `Purchased` -> `Expired`.
/// A purchased record is never deleted and never returns to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CartState {
    /// Sitting in the user's cart, not yet paid for.
    #[default]
    InProgress,
    /// Paid for; an active subscription until `expires_at` passes.
    Purchased,
    /// Past its expiration date, flipped by the sweep.
    Expired,
}

impl CartState {
    /// Wire/storage representation of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Purchased => "PURCHASED",
            Self::Expired => "EXPIRED",
        }
    }
}

impl std::fmt::Display for CartState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CartState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN_PROGRESS" => Ok(Self::InProgress),
            "PURCHASED" => Ok(Self::Purchased),
            "EXPIRED" => Ok(Self::Expired),
            _ => Err(format!("invalid cart state: {s}")),
        }
    }
}

/// Role carried in the identity collaborator's JWT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Regular shopper.
    Buyer,
    /// Operator; may trigger maintenance operations like the sweep.
    Admin,
}

impl UserRole {
    /// Wire representation of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "BUYER",
            Self::Admin => "ADMIN",
        }
    }

    /// Whether this role may call operator-only endpoints.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUYER" => Ok(Self::Buyer),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_cart_state_serde_uses_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&CartState::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(
            serde_json::from_str::<CartState>("\"PURCHASED\"").unwrap(),
            CartState::Purchased
        );
    }

    #[test]
    fn test_cart_state_from_str_matches_as_str() {
        for state in [CartState::InProgress, CartState::Purchased, CartState::Expired] {
            assert_eq!(CartState::from_str(state.as_str()).unwrap(), state);
        }
        assert!(CartState::from_str("PENDING").is_err());
    }

    #[test]
    fn test_user_role_admin_check() {
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Buyer.is_admin());
        assert_eq!(UserRole::from_str("ADMIN").unwrap(), UserRole::Admin);
    }
}
