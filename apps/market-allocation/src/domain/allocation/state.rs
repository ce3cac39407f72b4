//! Allocation state.
//!
//! A plain value: cloning it is how the engine branches off a tentative
//! placement or a simulated continuation, and dropping the clone is how it
//! discards one.

use std::collections::HashSet;

use thiserror::Error;

use super::rejection::RejectionReason;
use crate::domain::shared::{StallIndex, VendorIndex};

/// Stalls handed to one vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub(super) vendor: VendorIndex,
    pub(super) stalls: Vec<StallIndex>,
}

impl Assignment {
    /// Vendor holding the stalls.
    #[must_use]
    pub const fn vendor(&self) -> VendorIndex {
        self.vendor
    }

    /// Assigned stalls, in assignment order.
    #[must_use]
    pub fn stalls(&self) -> &[StallIndex] {
        &self.stalls
    }

    /// Number of assigned stalls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stalls.len()
    }

    /// Whether the assignment holds no stall.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stalls.is_empty()
    }
}

/// A vendor turned away, with the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    /// Rejected vendor.
    pub vendor: VendorIndex,
    /// Why.
    pub reason: RejectionReason,
}

/// Ledger invariant broken by a state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A stall is both open and assigned.
    #[error("{stall} is open and assigned at the same time")]
    OpenAndAssigned {
        /// Offending stall.
        stall: StallIndex,
    },

    /// An active stall is neither open nor assigned.
    #[error("{stall} is active but neither open nor assigned")]
    Unaccounted {
        /// Offending stall.
        stall: StallIndex,
    },

    /// An inactive stall shows up as open or assigned.
    #[error("{stall} is inactive but in use")]
    Inactive {
        /// Offending stall.
        stall: StallIndex,
    },

    /// A stall is listed more than once.
    #[error("{stall} is listed more than once")]
    AssignedTwice {
        /// Offending stall.
        stall: StallIndex,
    },

    /// A vendor has more than one assignment.
    #[error("{vendor} has more than one assignment")]
    DuplicateAssignment {
        /// Offending vendor.
        vendor: VendorIndex,
    },

    /// An assignment without stalls.
    #[error("{vendor} has an empty assignment")]
    EmptyAssignment {
        /// Offending vendor.
        vendor: VendorIndex,
    },

    /// A vendor is assigned and rejected.
    #[error("{vendor} is both assigned and rejected")]
    AssignedAndRejected {
        /// Offending vendor.
        vendor: VendorIndex,
    },

    /// A vendor is rejected twice.
    #[error("{vendor} is rejected more than once")]
    DuplicateRejection {
        /// Offending vendor.
        vendor: VendorIndex,
    },
}

/// Open stalls plus the assignments and rejections made so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationState {
    pub(super) open: Vec<StallIndex>,
    pub(super) assignments: Vec<Assignment>,
    pub(super) rejections: Vec<Rejection>,
}

impl AllocationState {
    /// Start with every given stall open.
    #[must_use]
    pub const fn new(open: Vec<StallIndex>) -> Self {
        Self {
            open,
            assignments: Vec::new(),
            rejections: Vec::new(),
        }
    }

    /// Stalls nobody holds yet.
    #[must_use]
    pub fn open_stalls(&self) -> &[StallIndex] {
        &self.open
    }

    /// Whether the stall is open.
    #[must_use]
    pub fn is_open(&self, stall: StallIndex) -> bool {
        self.open.contains(&stall)
    }

    /// Assignments in creation order.
    #[must_use]
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Rejections in creation order.
    #[must_use]
    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    /// Check the ledger invariants against the market's active stalls.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn verify(&self, active: &[StallIndex]) -> Result<(), InvariantViolation> {
        let active: HashSet<StallIndex> = active.iter().copied().collect();
        let mut seen = HashSet::new();

        for &stall in &self.open {
            if !seen.insert(stall) {
                return Err(InvariantViolation::AssignedTwice { stall });
            }
        }

        let mut assigned_vendors = HashSet::new();
        for assignment in &self.assignments {
            if !assigned_vendors.insert(assignment.vendor) {
                return Err(InvariantViolation::DuplicateAssignment {
                    vendor: assignment.vendor,
                });
            }
            if assignment.is_empty() {
                return Err(InvariantViolation::EmptyAssignment {
                    vendor: assignment.vendor,
                });
            }
            for &stall in &assignment.stalls {
                if self.open.contains(&stall) {
                    return Err(InvariantViolation::OpenAndAssigned { stall });
                }
                if !seen.insert(stall) {
                    return Err(InvariantViolation::AssignedTwice { stall });
                }
            }
        }

        if let Some(&stall) = seen.iter().find(|stall| !active.contains(stall)) {
            return Err(InvariantViolation::Inactive { stall });
        }
        if let Some(&stall) = active.iter().find(|stall| !seen.contains(stall)) {
            return Err(InvariantViolation::Unaccounted { stall });
        }

        let mut rejected = HashSet::new();
        for rejection in &self.rejections {
            if assigned_vendors.contains(&rejection.vendor) {
                return Err(InvariantViolation::AssignedAndRejected {
                    vendor: rejection.vendor,
                });
            }
            if !rejected.insert(rejection.vendor) {
                return Err(InvariantViolation::DuplicateRejection {
                    vendor: rejection.vendor,
                });
            }
        }

        Ok(())
    }
}
