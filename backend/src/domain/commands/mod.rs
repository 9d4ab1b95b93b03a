//! Command and query structs taken by the domain services.

pub mod entries;
pub mod goals;
