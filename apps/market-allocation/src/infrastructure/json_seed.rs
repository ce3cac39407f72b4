//! JSON seed adapter.

use std::io::Read;
use std::path::PathBuf;

use tracing::debug;

use crate::application::ports::{MarketSeedSource, SeedSourceError};
use crate::domain::seed::MarketSeed;

/// Reads a [`MarketSeed`] from a JSON file, or from stdin for `-`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileSeedSource {
    path: Option<PathBuf>,
}

impl JsonFileSeedSource {
    /// Read from a file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Read from stdin.
    #[must_use]
    pub const fn stdin() -> Self {
        Self { path: None }
    }

    /// Source for a command line argument; `-` means stdin.
    #[must_use]
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::stdin()
        } else {
            Self::new(arg)
        }
    }

    fn origin(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| "stdin".to_string(), |path| path.display().to_string())
    }

    fn read(&self) -> std::io::Result<String> {
        match &self.path {
            Some(path) => std::fs::read_to_string(path),
            None => {
                let mut contents = String::new();
                std::io::stdin().read_to_string(&mut contents)?;
                Ok(contents)
            }
        }
    }
}

impl MarketSeedSource for JsonFileSeedSource {
    fn load(&self) -> Result<MarketSeed, SeedSourceError> {
        let contents = self.read().map_err(|source| SeedSourceError::Read {
            origin: self.origin(),
            source,
        })?;

        let seed: MarketSeed =
            serde_json::from_str(&contents).map_err(|source| SeedSourceError::Parse {
                origin: self.origin(),
                source,
            })?;

        debug!(
            origin = %self.origin(),
            market_id = %seed.market_id,
            vendors = seed.vendors.len(),
            stalls = seed.stalls.len(),
            "Loaded market seed"
        );

        Ok(seed)
    }
}
