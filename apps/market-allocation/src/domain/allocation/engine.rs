//! Allocation engine.
//!
//! Places vendors one at a time. A fixed-place holder moving onto stalls of
//! other holders is simulated forward; when that causes one of them to be
//! rejected, the offending stalls are excluded and the placement retried.
//! After the first pass, assignments grow one stall per round.

use std::collections::HashSet;

use tracing::{debug, trace};

use super::context::AllocationContext;
use super::rejection::RejectionReason;
use super::state::AllocationState;
use super::strategy::AllocationStrategy;
use crate::domain::shared::{StallIndex, VendorIndex};

/// Runs the placement passes over an [`AllocationContext`].
#[derive(Debug, Clone, Copy)]
pub struct AllocationEngine<'a> {
    context: &'a AllocationContext,
}

impl<'a> AllocationEngine<'a> {
    /// Engine over a context.
    #[must_use]
    pub const fn new(context: &'a AllocationContext) -> Self {
        Self { context }
    }

    /// The context being allocated.
    #[must_use]
    pub const fn context(&self) -> &'a AllocationContext {
        self.context
    }

    /// Choose stalls for one placement attempt.
    ///
    /// The size is the start size unless `size_override` asks for a specific
    /// round, which is still capped at the vendor's target.
    pub fn try_place(
        &self,
        state: &AllocationState,
        contenders: &[VendorIndex],
        vendor: VendorIndex,
        candidates: &[StallIndex],
        size_override: Option<usize>,
    ) -> Result<Vec<StallIndex>, RejectionReason> {
        let context = self.context;
        let facts = context.facts(vendor);
        let size = size_override.map_or_else(
            || context.start_size_for(state, contenders, vendor),
            |size| size.min(facts.target),
        );

        if state.open_stalls().is_empty() {
            return Err(RejectionReason::MarketFull);
        }
        if size == 0 && context.available_count(state, vendor) > 0 {
            return Err(RejectionReason::CategoryFull);
        }

        let best =
            context.find_best_stalls(state, contenders, vendor, candidates, size, facts.accepts_any);
        if best.is_empty() {
            Err(RejectionReason::AdjacentUnavailable)
        } else {
            Ok(best)
        }
    }

    /// Place one vendor, rolling back relocations that would push out
    /// another holder.
    ///
    /// `queue` is the vendor's own position onwards in the current pass and
    /// is used to simulate the rest of that pass.
    #[must_use]
    pub fn allocate_vendor(
        &self,
        state: AllocationState,
        contenders: &[VendorIndex],
        queue: &[VendorIndex],
        vendor: VendorIndex,
        size_override: Option<usize>,
    ) -> AllocationState {
        let context = self.context;
        let mut excluded: HashSet<StallIndex> = HashSet::new();

        loop {
            let candidates: Vec<StallIndex> = state
                .open_stalls()
                .iter()
                .copied()
                .filter(|stall| !excluded.contains(stall))
                .collect();

            let chosen = match self.try_place(&state, contenders, vendor, &candidates, size_override)
            {
                Ok(chosen) => chosen,
                Err(reason) => {
                    debug!(vendor = %vendor, reason = %reason, "Vendor rejected");
                    let mut rejected = state;
                    rejected.reject(vendor, reason);
                    return rejected;
                }
            };

            let mut tentative = state.clone();
            for &stall in &chosen {
                tentative.assign(vendor, stall);
            }

            if !context.vendor(vendor).has_owned_stalls() || !context.will_move(&state, vendor) {
                return tentative;
            }

            let affected: Vec<VendorIndex> = chosen
                .iter()
                .filter_map(|&stall| context.owner_of(stall))
                .filter(|&owner| owner != vendor)
                .collect();
            if affected.is_empty() {
                return tentative;
            }

            let others = |vendors: &[VendorIndex]| -> Vec<VendorIndex> {
                vendors.iter().copied().filter(|&other| other != vendor).collect()
            };
            let simulated =
                self.perform_allocation(tentative.clone(), others(contenders), &others(queue));

            let displaced = affected
                .iter()
                .any(|&owner| simulated.rejection_for(owner).is_some());
            if !displaced {
                return tentative;
            }

            let before = excluded.len();
            let facts = context.facts(vendor);
            excluded.extend(chosen.iter().copied().filter(|&stall| !facts.owns(stall)));
            if excluded.len() == before {
                return tentative;
            }

            debug!(
                vendor = %vendor,
                excluded = excluded.len(),
                "Relocation displaces another holder, retrying"
            );
        }
    }

    /// One placement pass over `queue`, shrinking the contenders as vendors
    /// are handled.
    #[must_use]
    pub fn perform_allocation(
        &self,
        mut state: AllocationState,
        mut contenders: Vec<VendorIndex>,
        queue: &[VendorIndex],
    ) -> AllocationState {
        for (position, &vendor) in queue.iter().enumerate() {
            state = self.allocate_vendor(state, &contenders, &queue[position..], vendor, None);
            contenders.retain(|&contender| contender != vendor);
        }
        state
    }

    /// One expansion round.
    ///
    /// Assigned vendors below `min(target, iteration)` grab their best
    /// adjacent stall. Unassigned vendors whose minimum equals the round are
    /// placed at that size.
    #[must_use]
    pub fn perform_expansion(
        &self,
        mut state: AllocationState,
        iteration: usize,
        queue: &[VendorIndex],
    ) -> AllocationState {
        let context = self.context;
        let mut contenders: Vec<VendorIndex> = queue.to_vec();

        for &vendor in queue {
            let facts = context.facts(vendor);

            if let Some(assigned) = state.assignment_for(vendor).map(|a| a.stalls().to_vec()) {
                match context.best_expansion(&state, &contenders, vendor, &assigned) {
                    None => {
                        contenders.retain(|&contender| contender != vendor);
                        if facts.minimum > assigned.len() {
                            trace!(vendor = %vendor, iteration, "Minimum out of reach");
                            state.reject(vendor, RejectionReason::MinimumUnavailable);
                        }
                    }
                    Some(stall) if assigned.len() < facts.target.min(iteration) => {
                        contenders.retain(|&contender| contender != vendor);
                        trace!(vendor = %vendor, stall = %stall, iteration, "Expanding assignment");
                        state.assign(vendor, stall);
                    }
                    Some(_) => {}
                }
            } else if facts.minimum == iteration {
                contenders.retain(|&contender| contender != vendor);
                trace!(vendor = %vendor, iteration, "Placing at minimum size");
                state = self.allocate_vendor(state, &contenders, &contenders, vendor, Some(iteration));
            }
        }

        state
    }

    /// Initial placement followed by expansion rounds for one queue.
    ///
    /// Conservative applicants needing more than one stall skip the initial
    /// pass and are placed once the round reaches their minimum.
    #[must_use]
    pub fn perform_calculation(
        &self,
        state: AllocationState,
        queue: &[VendorIndex],
    ) -> AllocationState {
        let context = self.context;

        let immediate: Vec<VendorIndex> = queue
            .iter()
            .copied()
            .filter(|&vendor| {
                let facts = context.facts(vendor);
                let deferred = !facts.fixed
                    && facts.minimum > 1
                    && context.strategy_for(&state, queue, vendor) == AllocationStrategy::Conservative;
                !deferred
            })
            .collect();
        if immediate.len() < queue.len() {
            debug!(
                deferred = queue.len() - immediate.len(),
                "Deferring conservative multi-stall applicants"
            );
        }

        let mut state = self.perform_allocation(state, queue.to_vec(), &immediate);

        for iteration in 2..=context.expansion_limit() {
            let contenders: Vec<VendorIndex> = queue
                .iter()
                .copied()
                .filter(|&vendor| {
                    state
                        .assignment_for(vendor)
                        .is_none_or(|assignment| assignment.len() < context.facts(vendor).target)
                })
                .collect();

            state = self.perform_expansion(state, iteration, &contenders);

            if state.open_stalls().is_empty() || contenders.is_empty() {
                break;
            }
        }

        for &vendor in queue {
            let minimum = context.facts(vendor).minimum;
            if state
                .assignment_for(vendor)
                .is_some_and(|assignment| assignment.len() < minimum)
            {
                debug!(vendor = %vendor, minimum, "Assignment ended below minimum");
                state.reject(vendor, RejectionReason::MinimumUnavailable);
            }
        }

        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::{Obstacle, Stall};
    use crate::domain::seed::MarketSeed;
    use crate::domain::shared::StallId;
    use crate::domain::vendor::{AttendanceRecord, LocationPreference, Vendor, VendorProfile, VendorStatus};

    fn s(index: usize) -> StallIndex {
        StallIndex::new(index)
    }

    fn seed(stalls: usize, vendors: Vec<Vendor>) -> MarketSeed {
        let attendance = vendors
            .iter()
            .map(|vendor| AttendanceRecord {
                vendor: vendor.registration.clone(),
                attending: true,
                date: None,
            })
            .collect();
        MarketSeed {
            market_id: "m".into(),
            market_date: Some("2019-02-04".to_string()),
            stalls: (1..=stalls).map(|id| Stall::new(id.to_string())).collect(),
            rows: vec![(1..=stalls).map(|id| StallId::new(id.to_string())).collect()],
            vendors,
            attendance,
            ..MarketSeed::default()
        }
    }

    fn run(seed: &MarketSeed) -> (AllocationContext, AllocationState) {
        let context = AllocationContext::initialize(seed).unwrap();
        let queue: Vec<VendorIndex> = context.roster().collect();
        let state = AllocationEngine::new(&context).perform_calculation(context.initial_state(), &queue);
        (context, state)
    }

    fn stalls_of(context: &AllocationContext, state: &AllocationState, registration: &str) -> Vec<usize> {
        let vendor = context.find_vendor(&registration.into()).unwrap();
        let mut stalls: Vec<usize> = state
            .assignment_for(vendor)
            .map(|assignment| assignment.stalls().iter().map(|stall| stall.get() + 1).collect())
            .unwrap_or_default();
        stalls.sort_unstable();
        stalls
    }

    fn reason_of(context: &AllocationContext, state: &AllocationState, registration: &str) -> Option<RejectionReason> {
        let vendor = context.find_vendor(&registration.into()).unwrap();
        state.rejection_for(vendor).map(|rejection| rejection.reason)
    }

    #[test]
    fn try_place_reports_full_market() {
        let seed = seed(1, vec![Vendor::new("a", 1)]);
        let context = AllocationContext::initialize(&seed).unwrap();
        let engine = AllocationEngine::new(&context);
        let mut state = context.initial_state();
        state.assign(VendorIndex::new(0), s(0));

        let result = engine.try_place(&state, &[VendorIndex::new(0)], VendorIndex::new(0), &[], None);
        assert_eq!(result, Err(RejectionReason::MarketFull));
    }

    #[test]
    fn try_place_reports_no_fitting_stalls() {
        let seed = seed(2, vec![Vendor::new("a", 1)]);
        let context = AllocationContext::initialize(&seed).unwrap();
        let engine = AllocationEngine::new(&context);
        let state = context.initial_state();

        let result = engine.try_place(&state, &[VendorIndex::new(0)], VendorIndex::new(0), &[], None);
        assert_eq!(result, Err(RejectionReason::AdjacentUnavailable));
    }

    #[test]
    fn single_applicant_gets_one_stall() {
        let (context, state) = run(&seed(5, vec![Vendor::new("a", 1)]));
        assert_eq!(stalls_of(&context, &state, "a").len(), 1);
        assert!(state.verify(context.market().active_stalls()).is_ok());
    }

    #[test]
    fn second_applicant_finds_the_market_full() {
        let (context, state) = run(&seed(1, vec![Vendor::new("a", 1), Vendor::new("b", 2)]));
        assert_eq!(stalls_of(&context, &state, "a"), vec![1]);
        assert_eq!(reason_of(&context, &state, "b"), Some(RejectionReason::MarketFull));
    }

    #[test]
    fn holder_keeps_own_stalls() {
        let holder = Vendor::new("vpl", 2)
            .with_status(VendorStatus::Permanent)
            .with_owned_stalls(["2", "3"]);
        let (context, state) = run(&seed(4, vec![Vendor::new("a", 1), holder]));

        assert_eq!(stalls_of(&context, &state, "vpl"), vec![2, 3]);
        assert_eq!(stalls_of(&context, &state, "a").len(), 1);
    }

    #[test]
    fn expansion_grows_towards_target() {
        let vendor = Vendor::new("a", 1).with_profile(VendorProfile {
            maximum: Some(3),
            ..VendorProfile::default()
        });
        let (context, state) = run(&seed(5, vec![vendor]));
        let stalls = stalls_of(&context, &state, "a");

        assert_eq!(stalls.len(), 3);
        assert!(stalls.windows(2).all(|pair| pair[1] == pair[0] + 1));
    }

    #[test]
    fn unreachable_minimum_is_rejected() {
        let vendor = Vendor::new("a", 1).with_profile(VendorProfile {
            minimum: Some(2),
            ..VendorProfile::default()
        });
        let mut seed = seed(2, vec![vendor]);
        seed.obstacles = vec![Obstacle::between("1", "2")];
        let (context, state) = run(&seed);

        assert!(state.assignment_for(VendorIndex::new(0)).is_none());
        assert!(reason_of(&context, &state, "a").is_some());
        assert_eq!(state.open_stalls().len(), 2);
    }

    #[test]
    fn relocating_holder_moves_to_preferred_stall() {
        let holder = Vendor::new("vpl", 1)
            .with_status(VendorStatus::Permanent)
            .with_owned_stalls(["1"]);
        let mut seed = seed(3, vec![holder]);
        seed.preferences = vec![LocationPreference::new("vpl", "3")];
        let (context, state) = run(&seed);

        assert_eq!(stalls_of(&context, &state, "vpl"), vec![3]);
    }

    #[test]
    fn expansion_limit_of_one_skips_rounds() {
        let vendor = Vendor::new("a", 1).with_profile(VendorProfile {
            maximum: Some(3),
            ..VendorProfile::default()
        });
        let mut seed = seed(6, vec![vendor]);
        seed.expansion_limit = Some(1);
        let (context, state) = run(&seed);

        assert_eq!(stalls_of(&context, &state, "a").len(), 2);
    }

    #[test]
    fn minimum_above_market_size_is_rejected() {
        let vendor = Vendor::new("a", 1).with_profile(VendorProfile {
            minimum: Some(5),
            ..VendorProfile::default()
        });
        let (context, state) = run(&seed(4, vec![vendor]));

        assert!(stalls_of(&context, &state, "a").is_empty());
        assert_eq!(
            reason_of(&context, &state, "a"),
            Some(RejectionReason::MinimumUnavailable)
        );
        assert_eq!(state.open_stalls().len(), 4);
    }

    #[test]
    fn minimum_beyond_last_round_is_rejected() {
        let vendor = Vendor::new("a", 1).with_profile(VendorProfile {
            minimum: Some(3),
            ..VendorProfile::default()
        });
        let mut seed = seed(3, vec![vendor]);
        seed.expansion_limit = Some(2);
        let (context, state) = run(&seed);

        assert!(stalls_of(&context, &state, "a").is_empty());
        assert_eq!(
            reason_of(&context, &state, "a"),
            Some(RejectionReason::MinimumUnavailable)
        );
    }
}
