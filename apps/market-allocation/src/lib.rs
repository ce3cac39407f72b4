// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Market Allocation - Rust Core Library
//!
//! Deterministic stall allocation for one market day.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Pure allocation logic
//!   - `market`: Stalls, categories, rows, obstacles and adjacency
//!   - `vendor`: Vendor records, status taxonomy, preferences
//!   - `allocation`: State ledger, strategy, scoring, engine, outcome
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: `MarketSeedSource`
//!   - `use_cases`: `CalculateAllocation`
//!   - `dto`: The allocation report
//!
//! - **Infrastructure**: Adapters
//!   - `json_seed`: Seeds from a JSON file or stdin
//!
//! # Processing order
//!
//! Vendors are processed by priority tier: fixed-place holders staying put,
//! then mandatory categories, then equipment needs, then everyone else.
//! Seniority breaks ties. With a priority list, holders and listed vendors
//! are calculated before anyone else.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Allocation logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting Modules
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// Fatal allocation errors.
pub mod error;

/// Logging setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use application::{
    AllocationReportDto, CalculateAllocationError, CalculateAllocationUseCase, MarketSeedSource,
};
pub use domain::allocation::{
    AllocationContext, AllocationEngine, AllocationOutcome, AllocationState, RejectionReason,
    calculate_allocation,
};
pub use domain::seed::MarketSeed;
pub use error::{AllocationError, AllocationResult};
pub use infrastructure::JsonFileSeedSource;
