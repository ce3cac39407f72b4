//! Application Layer
//!
//! Orchestrates the allocation domain for one market day.
//!
//! - **Ports**: Where market seeds come from
//! - **Use Cases**: Calculating an allocation
//! - **DTOs**: The report handed to callers

pub mod dto;
pub mod ports;
pub mod use_cases;

pub use dto::*;
pub use ports::*;
pub use use_cases::*;
