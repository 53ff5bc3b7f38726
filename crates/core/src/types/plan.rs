//! Billing plan types and calendar expiry arithmetic.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

/// Billing interval for a subscription.
///
/// The plan determines both which catalog price applies and how long the
/// subscription lives after purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    Monthly,
    Quarterly,
    Yearly,
}

impl PlanType {
    /// Subscription length in calendar months.
    #[must_use]
    pub const fn months(self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::Yearly => 12,
        }
    }

    /// Compute the expiration instant for a purchase made at `purchased_at`.
    ///
    /// Calendar arithmetic, not a fixed day count: a monthly purchase on
    /// Jan 31 expires on the last valid day of February, and leap years
    /// are honored.
    #[must_use]
    pub fn expires_after(self, purchased_at: DateTime<Utc>) -> DateTime<Utc> {
        purchased_at + Months::new(self.months())
    }

    /// Wire/storage representation of the plan.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "MONTHLY",
            Self::Quarterly => "QUARTERLY",
            Self::Yearly => "YEARLY",
        }
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PlanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MONTHLY" => Ok(Self::Monthly),
            "QUARTERLY" => Ok(Self::Quarterly),
            "YEARLY" => Ok(Self::Yearly),
            _ => Err(format!("invalid plan type: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_monthly_expiry_clamps_to_end_of_february() {
        // Jan 31 + 1 calendar month lands on the last valid day of February
        let expires = PlanType::Monthly.expires_after(utc(2024, 1, 31));
        assert_eq!(expires, utc(2024, 2, 29));

        let expires = PlanType::Monthly.expires_after(utc(2023, 1, 31));
        assert_eq!(expires, utc(2023, 2, 28));
    }

    #[test]
    fn test_quarterly_expiry_spans_calendar_months() {
        let expires = PlanType::Quarterly.expires_after(utc(2024, 11, 30));
        assert_eq!(expires, utc(2025, 2, 28));

        // Ordinary case: exact same day three months later
        let expires = PlanType::Quarterly.expires_after(utc(2024, 3, 15));
        assert_eq!(expires, utc(2024, 6, 15));
    }

    #[test]
    fn test_yearly_expiry_handles_leap_day() {
        let expires = PlanType::Yearly.expires_after(utc(2024, 2, 29));
        assert_eq!(expires, utc(2025, 2, 28));

        let expires = PlanType::Yearly.expires_after(utc(2024, 6, 1));
        assert_eq!(expires, utc(2025, 6, 1));
    }

    #[test]
    fn test_expiry_is_strictly_later_and_preserves_time_of_day() {
        let purchased = Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 45).unwrap();
        for plan in [PlanType::Monthly, PlanType::Quarterly, PlanType::Yearly] {
            let expires = plan.expires_after(purchased);
            assert!(expires > purchased);
            assert_eq!(expires.time(), purchased.time());
        }
    }

    #[test]
    fn test_plan_serde_uses_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&PlanType::Quarterly).unwrap(),
            "\"QUARTERLY\""
        );
        assert_eq!(
            serde_json::from_str::<PlanType>("\"YEARLY\"").unwrap(),
            PlanType::Yearly
        );
    }
}
