//! # CSV Storage Module
//!
//! File-based durable storage for the drink ledger. One directory holds the
//! whole installation:
//!
//! ```text
//! data/
//! ├── settings.yaml     day-window configuration
//! ├── entries.csv       one row per logged drink
//! ├── goals.csv         append-only goal history (latest row is current)
//! └── baselines.csv     append-only baseline history (latest row is current)
//! ```
//!
//! All writes go through a temp-file-plus-rename so a crash mid-write never
//! corrupts an existing file. Repositories implement the storage traits, so
//! the domain layer never depends on this module directly.
//!
//! ## Entry CSV Format
//!
//! ```csv
//! id,name,alcohol_percentage,volume_ml,date,notes,created_at
//! dr-1715000000123-af3c,Lager,5.0,500,2024-05-10,after work,2024-05-10T19:30:00Z
//! ```

pub mod baseline_repository;
pub mod connection;
pub mod entry_repository;
pub mod goal_repository;
pub mod settings_repository;

pub use baseline_repository::BaselineRepository;
pub use connection::CsvConnection;
pub use entry_repository::EntryRepository;
pub use goal_repository::GoalRepository;
pub use settings_repository::SettingsRepository;
