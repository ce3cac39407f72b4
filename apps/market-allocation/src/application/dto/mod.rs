//! Data Transfer Objects (DTOs)
//!
//! The allocation report as handed to callers.

mod report_dto;

pub use report_dto::{AllocationReportDto, AllocationSummaryDto, AssignmentDto, RejectionDto};
