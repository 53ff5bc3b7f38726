//! Summary DTOs exchanged with the catalog and identity collaborators.
//!
//! These are the read-side shapes the cart service consumes; both
//! collaborators serve a superset and the extra fields are ignored here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::price::deserialize_optional_price;
use crate::types::status::UserRole;

/// Catalog collaborator's view of a service.
///
/// Price fields go through the canonical flexible parser: the catalog may
/// serve them as numbers, numeric strings, or tagged decimal wrappers.
/// A plan's price being absent is a valid catalog state - adding that plan
/// to a cart is rejected, nothing else breaks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub active: bool,
    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub price_per_month: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub price_per_quarter: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub price_per_year: Option<Decimal>,
}

/// Identity collaborator's view of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}
