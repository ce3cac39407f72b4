//! Calculate Allocation Use Case

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::dto::AllocationReportDto;
use crate::application::ports::{MarketSeedSource, SeedSourceError};
use crate::config::EngineConfig;
use crate::domain::allocation::{AllocationContext, AllocationEngine, AllocationOutcome};
use crate::error::AllocationError;

/// Errors from calculating an allocation.
#[derive(Debug, Error)]
pub enum CalculateAllocationError {
    /// The seed could not be loaded.
    #[error(transparent)]
    Source(#[from] SeedSourceError),

    /// The allocation run failed.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// Use case for allocating one market day.
pub struct CalculateAllocationUseCase<S>
where
    S: MarketSeedSource,
{
    source: Arc<S>,
    engine: EngineConfig,
}

impl<S> CalculateAllocationUseCase<S>
where
    S: MarketSeedSource,
{
    /// Create a new CalculateAllocationUseCase.
    pub const fn new(source: Arc<S>, engine: EngineConfig) -> Self {
        Self { source, engine }
    }

    /// Execute the use case.
    pub fn execute(&self) -> Result<AllocationReportDto, CalculateAllocationError> {
        // 1. Load the seed, filling in the configured expansion limit
        let mut seed = self.source.load()?;
        if seed.expansion_limit.is_none() {
            seed.expansion_limit = self.engine.expansion_limit;
        }

        // 2. Resolve market and roster
        let context = AllocationContext::initialize(&seed)?;

        // 3. Run both phases
        let state = AllocationEngine::new(&context).run();

        // 4. Check the ledger
        if self.engine.verify_invariants {
            state
                .verify(context.market().active_stalls())
                .map_err(AllocationError::from)?;
        }

        let report = AllocationReportDto::from(AllocationOutcome::from_state(&context, &state));
        info!(
            market_id = %report.market_id,
            assigned = report.summary.assigned,
            rejected = report.summary.rejected,
            "Allocation report ready"
        );

        Ok(report)
    }
}
