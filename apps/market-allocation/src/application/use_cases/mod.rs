//! Application Use Cases

mod calculate_allocation;

pub use calculate_allocation::{CalculateAllocationError, CalculateAllocationUseCase};
