//! Market Seed Source Port (Driven Port)
//!
//! Interface for loading the normalised input of one market day.

use thiserror::Error;

use crate::domain::seed::MarketSeed;

/// Errors loading a market seed.
#[derive(Debug, Error)]
pub enum SeedSourceError {
    /// The seed could not be read.
    #[error("Failed to read seed from {origin}: {source}")]
    Read {
        /// File path or `stdin`.
        origin: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The seed is not valid JSON for a market seed.
    #[error("Failed to parse seed from {origin}: {source}")]
    Parse {
        /// File path or `stdin`.
        origin: String,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// Port for loading market seeds.
pub trait MarketSeedSource: Send + Sync {
    /// Load the seed.
    fn load(&self) -> Result<MarketSeed, SeedSourceError>;
}

/// In-memory implementation for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemorySeedSource {
    seed: MarketSeed,
}

impl InMemorySeedSource {
    /// Serve a fixed seed.
    #[must_use]
    pub const fn new(seed: MarketSeed) -> Self {
        Self { seed }
    }
}

impl MarketSeedSource for InMemorySeedSource {
    fn load(&self) -> Result<MarketSeed, SeedSourceError> {
        Ok(self.seed.clone())
    }
}
