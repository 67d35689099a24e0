//! Error handling for the tiered template cache
//!
//! Store failures carry a recovery hint so callers can tell a transient
//! outage from a misconfiguration.

mod conversions;
mod display;
mod recovery;
mod types;

pub use types::*;
