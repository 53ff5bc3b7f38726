//! The cart item / subscription record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use subcart_core::{CartItemId, CartState, PlanType, ServiceId, ServiceSummary, UserId, UserSummary};

/// A single state-tagged record: a cart item before checkout, a
/// subscription after.
///
/// `purchased_at`/`expires_at` are present iff the record has left
/// `InProgress`; `purchase_price` is fixed when the item is added (or its
/// plan changed) and never changes after purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub service_id: ServiceId,
    pub state: CartState,
    pub plan_type: PlanType,
    pub added_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchased_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub purchase_price: Decimal,
}

impl CartItem {
    /// Create a fresh `InProgress` record with a generated ID.
    #[must_use]
    pub fn new(
        user_id: UserId,
        service_id: ServiceId,
        plan_type: PlanType,
        purchase_price: Decimal,
        added_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CartItemId::generate(),
            user_id,
            service_id,
            state: CartState::InProgress,
            plan_type,
            added_at,
            purchased_at: None,
            expires_at: None,
            purchase_price,
        }
    }

    /// Whether the record is still sitting in the cart.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.state == CartState::InProgress
    }

    /// Date-based activity check, independent of the stored state.
    ///
    /// A purchased record whose `expires_at` has passed counts as inactive
    /// even before the sweep has flipped it to `Expired`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.state == CartState::Purchased && self.expires_at.is_some_and(|exp| exp > now)
    }
}

/// A cart item decorated with best-effort collaborator snapshots.
///
/// Enrichment failures leave the optional fields absent; they never fail
/// the surrounding call.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedCartItem {
    #[serde(flatten)]
    pub item: CartItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn sample_item() -> CartItem {
        CartItem::new(
            UserId::new("u-1"),
            ServiceId::new("svc-1"),
            PlanType::Monthly,
            Decimal::from_str("100.00").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_new_item_starts_in_progress_without_purchase_fields() {
        let item = sample_item();
        assert!(item.is_in_progress());
        assert!(item.purchased_at.is_none());
        assert!(item.expires_at.is_none());
    }

    #[test]
    fn test_active_check_is_date_based() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let mut item = sample_item();
        item.state = CartState::Purchased;
        item.purchased_at = Some(now - chrono::Duration::days(10));
        item.expires_at = Some(now + chrono::Duration::days(20));
        assert!(item.is_active_at(now));

        // Past expiry but not yet swept: still inactive
        item.expires_at = Some(now - chrono::Duration::days(1));
        assert!(!item.is_active_at(now));

        // In-progress records are never active
        let item = sample_item();
        assert!(!item.is_active_at(now));
    }

    #[test]
    fn test_serialization_omits_absent_purchase_fields_and_keeps_price_scale() {
        let item = sample_item();
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("purchased_at").is_none());
        assert_eq!(json["purchase_price"], "100.00");
        assert_eq!(json["state"], "IN_PROGRESS");
        assert_eq!(json["plan_type"], "MONTHLY");
    }
}
