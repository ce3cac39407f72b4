//! Allocation Bounded Context
//!
//! The allocation state ledger and the engine working on it: vendor facts
//! derived once per run, placement strategy, candidate scoring, conflict
//! resolution by simulation, expansion rounds and the two-phase run.

pub mod context;
pub mod engine;
pub mod ledger;
pub mod orchestration;
pub mod outcome;
pub mod rejection;
pub mod scoring;
pub mod state;
pub mod strategy;

pub use context::{AllocationContext, VendorFacts};
pub use engine::AllocationEngine;
pub use orchestration::calculate_allocation;
pub use outcome::{AllocationOutcome, VendorAssignment, VendorRejection};
pub use rejection::RejectionReason;
pub use scoring::ScoredStall;
pub use state::{AllocationState, Assignment, InvariantViolation, Rejection};
pub use strategy::AllocationStrategy;
