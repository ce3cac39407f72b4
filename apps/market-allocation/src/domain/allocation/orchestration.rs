//! Two-phase run over the whole roster.

use tracing::{info, info_span};

use super::context::AllocationContext;
use super::engine::AllocationEngine;
use super::outcome::AllocationOutcome;
use super::state::AllocationState;
use crate::domain::seed::MarketSeed;
use crate::domain::shared::VendorIndex;
use crate::error::AllocationResult;

impl AllocationEngine<'_> {
    /// Allocate the whole market.
    ///
    /// With a priority list, fixed-place holders and list members are
    /// calculated first and everyone else afterwards on what is left.
    #[must_use]
    pub fn run(&self) -> AllocationState {
        let context = self.context();
        let market = context.market();
        let span = info_span!(
            "allocation",
            market_id = %market.id(),
            market_date = %market.date()
        );
        let _guard = span.enter();

        info!(
            vendors = context.vendor_count(),
            stalls = market.active_stalls().len(),
            a_list = context.a_list().len(),
            "Starting allocation"
        );

        let roster: Vec<VendorIndex> = context.roster().collect();
        let state = if context.a_list().is_empty() {
            self.perform_calculation(context.initial_state(), &roster)
        } else {
            let (first, rest): (Vec<VendorIndex>, Vec<VendorIndex>) = roster
                .into_iter()
                .partition(|&vendor| context.facts(vendor).fixed || context.on_a_list(vendor));
            let state = self.perform_calculation(context.initial_state(), &first);
            self.perform_calculation(state, &rest)
        };

        info!(
            assigned = state.assignments().len(),
            rejected = state.rejections().len(),
            open = state.open_stalls().len(),
            "Allocation finished"
        );

        state
    }
}

/// Allocate one market day from its seed.
///
/// # Errors
///
/// Returns an error for an invalid seed or when the final state breaks a
/// ledger invariant.
pub fn calculate_allocation(seed: &MarketSeed) -> AllocationResult<AllocationOutcome> {
    let context = AllocationContext::initialize(seed)?;
    let state = AllocationEngine::new(&context).run();
    state.verify(context.market().active_stalls())?;
    Ok(AllocationOutcome::from_state(&context, &state))
}
