//! Allocation strategy and start sizes.

use std::fmt;

use super::context::AllocationContext;
use super::state::AllocationState;
use crate::domain::shared::VendorIndex;

/// How generously the first placement is sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationStrategy {
    /// Room to spare: applicants get an eager second stall.
    Optimistic,
    /// Tight market: everyone starts at their start size.
    Conservative,
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Optimistic => f.write_str("optimistic"),
            Self::Conservative => f.write_str("conservative"),
        }
    }
}

impl AllocationContext {
    /// Open stalls the vendor could still get, limited by the caps of its
    /// categories.
    #[must_use]
    pub fn available_count(&self, state: &AllocationState, vendor: VendorIndex) -> usize {
        let mut count = state.open_stalls().len();

        for (category, cap) in &self.facts(vendor).capped {
            if count == 0 {
                break;
            }
            let used: usize = state
                .assignments()
                .iter()
                .filter(|assignment| self.vendor(assignment.vendor()).declares(category))
                .map(|assignment| assignment.len())
                .sum();
            count = count.min(cap.saturating_sub(used));
        }

        count
    }

    /// Strategy for a vendor against a set of contenders.
    ///
    /// Only contenders sharing the vendor's most constrained category count
    /// when it has one.
    #[must_use]
    pub fn strategy_for(
        &self,
        state: &AllocationState,
        contenders: &[VendorIndex],
        vendor: VendorIndex,
    ) -> AllocationStrategy {
        let limited = self.facts(vendor).most_constrained.as_ref();
        let required: usize = contenders
            .iter()
            .filter(|&&contender| {
                limited.is_none_or(|category| self.vendor(contender).declares(category))
            })
            .map(|&contender| self.facts(contender).start)
            .sum();

        if self.available_count(state, vendor) > required {
            AllocationStrategy::Optimistic
        } else {
            AllocationStrategy::Conservative
        }
    }

    /// Size of the vendor's first placement attempt.
    #[must_use]
    pub fn start_size_for(
        &self,
        state: &AllocationState,
        contenders: &[VendorIndex],
        vendor: VendorIndex,
    ) -> usize {
        if state.open_stalls().is_empty() {
            return 0;
        }

        let facts = self.facts(vendor);
        let happy = if facts.start == 1 {
            facts.target.min(2)
        } else {
            facts.start
        };
        let size = match self.strategy_for(state, contenders, vendor) {
            AllocationStrategy::Optimistic => happy,
            AllocationStrategy::Conservative => facts.start,
        };

        if facts.fixed {
            size
        } else {
            size.min(self.available_count(state, vendor))
        }
    }
}
