//! # drinklog backend
//!
//! The consumption ledger and aggregation core behind drinklog. This crate
//! persists drink entries durably, answers windowed aggregate queries under a
//! configurable day boundary (an end-of-day hour rather than midnight), and
//! derives baseline-vs-current reduction metrics for progress feedback.
//!
//! The embedding application talks to one [`DrinkLedger`] handle per process:
//!
//! ```no_run
//! use drinklog_backend::domain::commands::entries::AddEntryCommand;
//! use drinklog_backend::DrinkLedger;
//!
//! let ledger = DrinkLedger::new();
//! ledger.init(std::path::Path::new("/data/drinklog"));
//! ledger
//!     .add_entry(AddEntryCommand {
//!         name: "Lager".to_string(),
//!         alcohol_percentage: 5.0,
//!         volume_ml: 500.0,
//!         notes: String::new(),
//!     })
//!     .unwrap();
//! ```
//!
//! Everything UI-shaped (views, dialogs, charts, notifications) lives in the
//! collaborating application; this crate only returns plain structured data.

pub mod domain;
pub mod storage;

pub use domain::errors::{LedgerError, LedgerResult};
pub use domain::ledger::{DrinkLedger, CONSUMPTION_UNAVAILABLE};
