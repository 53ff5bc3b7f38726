//! Domain models for the cart service.

pub mod cart_item;

pub use cart_item::{CartItem, EnrichedCartItem};
