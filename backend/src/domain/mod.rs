//! Domain layer: services, pure day-window math, models, and the ledger
//! facade.

pub mod aggregation_service;
pub mod commands;
pub mod day_window;
pub mod entry_service;
pub mod errors;
pub mod goal_service;
pub mod ledger;
pub mod models;

pub use aggregation_service::AggregationService;
pub use entry_service::EntryService;
pub use errors::{LedgerError, LedgerResult};
pub use goal_service::GoalService;
pub use ledger::DrinkLedger;
