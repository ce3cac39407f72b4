//! Allocation report DTOs

use serde::{Deserialize, Serialize};

use crate::domain::allocation::{AllocationOutcome, VendorAssignment, VendorRejection};

/// DTO for one vendor's stalls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDto {
    /// Registration number.
    pub vendor: String,
    /// Stall ids in market order.
    pub stalls: Vec<String>,
}

impl From<VendorAssignment> for AssignmentDto {
    fn from(assignment: VendorAssignment) -> Self {
        Self {
            vendor: assignment.vendor.into_inner(),
            stalls: assignment
                .stalls
                .into_iter()
                .map(|stall| stall.into_inner())
                .collect(),
        }
    }
}

/// DTO for a rejected vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionDto {
    /// Registration number.
    pub vendor: String,
    /// Reason code, 1 to 4.
    pub code: u8,
    /// Vendor-facing message.
    pub message: String,
}

impl From<VendorRejection> for RejectionDto {
    fn from(rejection: VendorRejection) -> Self {
        Self {
            vendor: rejection.vendor.into_inner(),
            code: rejection.reason.code(),
            message: rejection.reason.message().to_string(),
        }
    }
}

/// Per-run counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSummaryDto {
    /// Attending vendors.
    pub vendors_considered: usize,
    /// Vendors with at least one stall.
    pub assigned: usize,
    /// Vendors without a stall.
    pub rejected: usize,
    /// Stalls handed out.
    pub stalls_assigned: usize,
    /// Active stalls left open.
    pub open_stalls: usize,
}

/// DTO for a full allocation report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationReportDto {
    /// Market id.
    pub market_id: String,
    /// Market date, `YYYY-MM-DD`.
    pub market_date: String,
    /// Counts.
    pub summary: AllocationSummaryDto,
    /// Open stall ids.
    pub open_stalls: Vec<String>,
    /// Assignments.
    pub assignments: Vec<AssignmentDto>,
    /// Rejections.
    pub rejections: Vec<RejectionDto>,
}

impl From<AllocationOutcome> for AllocationReportDto {
    fn from(outcome: AllocationOutcome) -> Self {
        let summary = AllocationSummaryDto {
            vendors_considered: outcome.vendors_considered,
            assigned: outcome.assignments.len(),
            rejected: outcome.rejections.len(),
            stalls_assigned: outcome.assigned_stall_count(),
            open_stalls: outcome.open_stalls.len(),
        };

        Self {
            market_id: outcome.market_id.into_inner(),
            market_date: outcome.market_date.format("%Y-%m-%d").to_string(),
            summary,
            open_stalls: outcome
                .open_stalls
                .into_iter()
                .map(|stall| stall.into_inner())
                .collect(),
            assignments: outcome
                .assignments
                .into_iter()
                .map(AssignmentDto::from)
                .collect(),
            rejections: outcome
                .rejections
                .into_iter()
                .map(RejectionDto::from)
                .collect(),
        }
    }
}
