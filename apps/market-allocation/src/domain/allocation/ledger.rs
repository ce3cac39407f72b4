//! Assignment and rejection bookkeeping.

use super::rejection::RejectionReason;
use super::state::{AllocationState, Assignment, Rejection};
use crate::domain::shared::{StallIndex, VendorIndex};

impl AllocationState {
    /// Hand a stall to a vendor, merging into an existing assignment.
    ///
    /// Clears any rejection the vendor had.
    pub fn assign(&mut self, vendor: VendorIndex, stall: StallIndex) {
        match self.assignments.iter_mut().find(|a| a.vendor == vendor) {
            Some(assignment) => {
                if !assignment.stalls.contains(&stall) {
                    assignment.stalls.push(stall);
                }
            }
            None => self.assignments.push(Assignment {
                vendor,
                stalls: vec![stall],
            }),
        }

        self.open.retain(|open| *open != stall);
        self.rejections.retain(|rejection| rejection.vendor != vendor);
    }

    /// Drop a vendor's assignment and reopen its stalls in market order.
    pub fn unassign(&mut self, vendor: VendorIndex) {
        let Some(position) = self.assignments.iter().position(|a| a.vendor == vendor) else {
            return;
        };

        let mut freed = self.assignments.remove(position).stalls;
        freed.sort_unstable();
        self.open.extend(freed);
    }

    /// Unassign a vendor and record a rejection unless one exists.
    pub fn reject(&mut self, vendor: VendorIndex, reason: RejectionReason) {
        self.unassign(vendor);

        if self.rejection_for(vendor).is_none() {
            self.rejections.push(Rejection { vendor, reason });
        }
    }

    /// The vendor's assignment.
    #[must_use]
    pub fn assignment_for(&self, vendor: VendorIndex) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.vendor == vendor)
    }

    /// The vendor's rejection.
    #[must_use]
    pub fn rejection_for(&self, vendor: VendorIndex) -> Option<&Rejection> {
        self.rejections.iter().find(|r| r.vendor == vendor)
    }

    /// Number of stalls the vendor holds.
    #[must_use]
    pub fn assigned_count(&self, vendor: VendorIndex) -> usize {
        self.assignment_for(vendor).map_or(0, Assignment::len)
    }
}
