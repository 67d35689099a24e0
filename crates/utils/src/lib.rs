//! Shared runtime setup for the alumni template services

pub mod tracing;
