//! Shared type definitions.
//!
//! # Modules
//!
//! - [`contract`] - Summary DTOs exchanged with the catalog and identity
//!   collaborators
//! - [`id`] - Newtype wrappers for type-safe IDs
//! - [`plan`] - Billing plan types and calendar expiry arithmetic
//! - [`price`] - Canonical flexible decimal price parsing
//! - [`status`] - Cart item states and user roles

pub mod contract;
pub mod id;
pub mod plan;
pub mod price;
pub mod status;

pub use contract::{ServiceSummary, UserSummary};
pub use id::{CartItemId, ServiceId, UserId};
pub use plan::PlanType;
pub use price::{PriceParseError, parse_price};
pub use status::{CartState, UserRole};
