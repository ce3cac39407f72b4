//! Domain Layer
//!
//! Pure allocation logic with no I/O. Everything here is a function of the
//! market seed for one day.
//!
//! # Bounded Contexts
//!
//! - [`market`]: Stalls, categories, rows and obstacles
//! - [`vendor`]: Vendor records, statuses and preferences
//! - [`allocation`]: State ledger, engine and outcome

pub mod allocation;
pub mod market;
pub mod seed;
pub mod shared;
pub mod vendor;
