//! Storage backends for the drink ledger.

pub mod csv;
pub mod memory;
pub mod traits;

pub use traits::{BaselineStorage, Connection, EntryStorage, GoalStorage, SettingsStorage};
