//! Application Ports (Driven)
//!
//! Interfaces the application uses to reach the outside world.

mod seed_source;

pub use seed_source::{InMemorySeedSource, MarketSeedSource, SeedSourceError};
