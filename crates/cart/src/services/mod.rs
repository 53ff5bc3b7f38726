//! Business logic services.

pub mod cart;

pub use cart::{CartContents, CartEngine, UserStatistics};
