//! Fatal errors for an allocation run.
//!
//! Anything here aborts the run before a single stall is handed out.
//! Per-vendor placement failures are not errors; they end up as
//! [`RejectionReason`](crate::domain::allocation::RejectionReason) entries in
//! the outcome.

use thiserror::Error;

use crate::domain::allocation::InvariantViolation;

/// Errors that abort an allocation run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// The seed carries no market date.
    #[error("market date is missing")]
    MissingMarketDate,

    /// The market date is neither `YYYY-MM-DD` nor RFC 3339.
    #[error("invalid market date: {0}")]
    InvalidMarketDate(String),

    /// A row lists a stall id the stall list does not define.
    #[error("row {row} references unknown stall {stall}")]
    UnknownStall {
        /// Position of the row in the seed.
        row: usize,
        /// Offending stall id.
        stall: String,
    },

    /// The final state broke a ledger invariant.
    #[error("allocation invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Result alias for allocation runs.
pub type AllocationResult<T> = Result<T, AllocationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let err = AllocationError::UnknownStall {
            row: 2,
            stall: "17".to_string(),
        };
        assert_eq!(err.to_string(), "row 2 references unknown stall 17");

        let err = AllocationError::InvalidMarketDate("gisteren".to_string());
        assert!(err.to_string().contains("gisteren"));
    }
}
