//! Shared Domain Types
//!
//! Identifiers shared across the market, vendor and allocation contexts.

pub mod identifiers;

pub use identifiers::{CategoryId, MarketId, RegistrationNumber, StallId, StallIndex, VendorIndex};
