//! Infrastructure Layer
//!
//! Adapters for the ports defined in the application layer.
//!
//! - `json_seed`: Market seeds from a JSON file or stdin

pub mod json_seed;

pub use json_seed::JsonFileSeedSource;
