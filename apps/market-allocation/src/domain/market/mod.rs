//! Market Bounded Context
//!
//! Stall reference data and the physical layout: rows, obstacles and the
//! adjacency queries every placement decision rests on. Nothing in here
//! knows about vendors.

pub mod layout;
pub mod model;
pub mod stall;

pub use layout::{Direction, Layout, LayoutError, Obstacle, Row, any_stall};
pub use model::{Market, parse_market_date};
pub use stall::{Category, Stall};
