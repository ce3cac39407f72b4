//! Allocation outcome in terms of stall ids and registration numbers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::context::AllocationContext;
use super::rejection::RejectionReason;
use super::state::AllocationState;
use crate::domain::shared::{MarketId, RegistrationNumber, StallId, StallIndex};

/// Stalls handed to one vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorAssignment {
    /// Vendor.
    pub vendor: RegistrationNumber,
    /// Assigned stalls in market order.
    pub stalls: Vec<StallId>,
}

/// A vendor that got no stall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorRejection {
    /// Vendor.
    pub vendor: RegistrationNumber,
    /// Reason.
    pub reason: RejectionReason,
}

/// Result of allocating one market day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    /// Market id.
    pub market_id: MarketId,
    /// Market date.
    pub market_date: NaiveDate,
    /// Attending vendors taken into account.
    pub vendors_considered: usize,
    /// Active stalls nobody got, in market order.
    pub open_stalls: Vec<StallId>,
    /// Assignments in the order they were first made.
    pub assignments: Vec<VendorAssignment>,
    /// Rejections in the order they were made.
    pub rejections: Vec<VendorRejection>,
}

impl AllocationOutcome {
    /// Translate a final state back to ids.
    #[must_use]
    pub fn from_state(context: &AllocationContext, state: &AllocationState) -> Self {
        let market = context.market();
        let to_ids = |stalls: &[StallIndex]| -> Vec<StallId> {
            let mut sorted = stalls.to_vec();
            sorted.sort_unstable();
            sorted
                .into_iter()
                .map(|stall| market.stall_id(stall).clone())
                .collect()
        };

        Self {
            market_id: market.id().clone(),
            market_date: market.date(),
            vendors_considered: context.vendor_count(),
            open_stalls: to_ids(state.open_stalls()),
            assignments: state
                .assignments()
                .iter()
                .map(|assignment| VendorAssignment {
                    vendor: context.vendor(assignment.vendor()).registration.clone(),
                    stalls: to_ids(assignment.stalls()),
                })
                .collect(),
            rejections: state
                .rejections()
                .iter()
                .map(|rejection| VendorRejection {
                    vendor: context.vendor(rejection.vendor).registration.clone(),
                    reason: rejection.reason,
                })
                .collect(),
        }
    }

    /// Stalls assigned to a vendor.
    #[must_use]
    pub fn assignment_for(&self, vendor: &RegistrationNumber) -> Option<&VendorAssignment> {
        self.assignments
            .iter()
            .find(|assignment| &assignment.vendor == vendor)
    }

    /// Why a vendor got nothing.
    #[must_use]
    pub fn rejection_for(&self, vendor: &RegistrationNumber) -> Option<RejectionReason> {
        self.rejections
            .iter()
            .find(|rejection| &rejection.vendor == vendor)
            .map(|rejection| rejection.reason)
    }

    /// Number of stalls handed out.
    #[must_use]
    pub fn assigned_stall_count(&self) -> usize {
        self.assignments
            .iter()
            .map(|assignment| assignment.stalls.len())
            .sum()
    }
}
