//! The drink ledger facade.
//!
//! `DrinkLedger` is the single public entry point composing entry storage,
//! day-window math, aggregation, and goal/baseline tracking behind one
//! narrow request/response surface. The UI collaborator holds exactly one
//! instance per process and per storage path; every operation returns plain
//! structured data (DTOs from the `shared` crate) or a typed `LedgerError`.
//!
//! ## Initialization and degraded mode
//!
//! `init(path)` must be called before anything else; operations on an
//! uninitialized handle fail with `NotInitialized`. When the durable store
//! cannot be opened, `init` falls back to the in-memory backend and reports
//! `Degraded`: reads keep working against the (empty) mirror, mutating
//! operations fail explicitly with `Storage`, and `status()` flags the mode
//! so the collaborator can warn the user. Silent data loss is not an option.
//!
//! ## Concurrency
//!
//! A single `RwLock` serializes mutating operations against each other and
//! against reads, so an aggregate can never observe a half-applied update.
//! The ledger is a synchronous, blocking API; scheduling it off an
//! interactive thread is the collaborator's job.

use chrono::{NaiveDate, Utc};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::aggregation_service::AggregationService;
use crate::domain::commands::entries::{
    AddEntryCommand, AddEntryWithDateCommand, EntryRangeQuery, UpdateEntryCommand,
    UpdateEntryDateCommand,
};
use crate::domain::commands::goals::{SetBaselineCommand, SetDayWindowCommand, SetGoalCommand};
use crate::domain::entry_service::EntryService;
use crate::domain::errors::{LedgerError, LedgerResult};
use crate::domain::goal_service::GoalService;
use crate::domain::models::baseline::DomainBaseline;
use crate::domain::models::entry::DrinkEntry;
use crate::domain::models::goal::DomainGoal;
use crate::storage::csv::CsvConnection;
use crate::storage::memory::MemoryConnection;
use crate::storage::traits::{BaselineStorage, Connection, GoalStorage, SettingsStorage};
use shared::{
    DayWindowSettings, EntryListResponse, ExportDataResponse, ExportToPathResponse,
    ImportDataResult, InitStatus, LedgerStatus, ProgressMetrics,
};

/// Sentinel returned by the numeric consumption reads when the ledger is
/// unavailable (not initialized or a storage failure). Totals are never
/// negative, so callers can test for `< 0.0`.
pub const CONSUMPTION_UNAVAILABLE: f64 = -1.0;

const EXPORT_HEADER: [&str; 7] = [
    "id",
    "date",
    "name",
    "alcohol_percentage",
    "volume_ml",
    "notes",
    "created_at",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StorageMode {
    Durable,
    Degraded,
}

struct LedgerInner {
    mode: StorageMode,
    base_directory: Option<PathBuf>,
    entry_service: EntryService,
    aggregation_service: AggregationService,
    goal_service: GoalService,
    goal_repository: Arc<dyn GoalStorage>,
    baseline_repository: Arc<dyn BaselineStorage>,
    settings_repository: Arc<dyn SettingsStorage>,
}

impl LedgerInner {
    fn from_connection(
        connection: &dyn Connection,
        mode: StorageMode,
        base_directory: Option<PathBuf>,
    ) -> Self {
        Self {
            mode,
            base_directory,
            entry_service: EntryService::new(connection),
            aggregation_service: AggregationService::new(connection),
            goal_service: GoalService::new(connection),
            goal_repository: connection.goal_storage(),
            baseline_repository: connection.baseline_storage(),
            settings_repository: connection.settings_storage(),
        }
    }

    fn ensure_writable(&self) -> LedgerResult<()> {
        match self.mode {
            StorageMode::Durable => Ok(()),
            StorageMode::Degraded => Err(LedgerError::Storage(
                "durable storage unavailable; writes are rejected in degraded mode".to_string(),
            )),
        }
    }
}

enum LedgerState {
    Uninitialized,
    Ready(LedgerInner),
}

/// Mapper from domain models to boundary DTOs
struct EntryMapper;

impl EntryMapper {
    fn to_dto(entry: DrinkEntry) -> shared::DrinkEntry {
        shared::DrinkEntry {
            id: entry.id,
            name: entry.name,
            alcohol_percentage: entry.alcohol_percentage,
            volume_ml: entry.volume_ml,
            date: entry.date,
            notes: entry.notes,
        }
    }
}

struct GoalMapper;

impl GoalMapper {
    fn to_dto(goal: DomainGoal) -> shared::ConsumptionGoal {
        shared::ConsumptionGoal {
            id: goal.id,
            daily_target_ml: goal.daily_target_ml,
            weekly_target_ml: goal.weekly_target_ml,
            start_date: goal.start_date,
            end_date: goal.end_date,
        }
    }
}

struct BaselineMapper;

impl BaselineMapper {
    fn to_dto(baseline: DomainBaseline) -> shared::Baseline {
        shared::Baseline {
            id: baseline.id,
            average_daily_ml: baseline.average_daily_ml,
            average_weekly_ml: baseline.average_weekly_ml,
            calculated_date: baseline.calculated_date,
            period_start: baseline.period_start,
            period_end: baseline.period_end,
        }
    }
}

pub struct DrinkLedger {
    state: RwLock<LedgerState>,
}

impl Default for DrinkLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl DrinkLedger {
    /// Create an uninitialized handle. Call `init` before anything else.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState::Uninitialized),
        }
    }

    /// Open (or fall back around) the storage at `storage_path`. Idempotent:
    /// a second call on a ready ledger changes nothing.
    pub fn init(&self, storage_path: &Path) -> InitStatus {
        let mut state = self.write_state();
        if let LedgerState::Ready(_) = &*state {
            info!("Ledger already initialized; ignoring repeated init");
            return InitStatus::AlreadyInitialized;
        }

        match CsvConnection::new(storage_path) {
            Ok(connection) => {
                *state = LedgerState::Ready(LedgerInner::from_connection(
                    &connection,
                    StorageMode::Durable,
                    Some(storage_path.to_path_buf()),
                ));
                info!("Ledger initialized at {:?}", storage_path);
                InitStatus::Ready
            }
            Err(e) => {
                error!(
                    "Durable storage unavailable at {:?}: {:#}. Serving reads from an in-memory store.",
                    storage_path, e
                );
                let connection = MemoryConnection::new();
                *state = LedgerState::Ready(LedgerInner::from_connection(
                    &connection,
                    StorageMode::Degraded,
                    Some(storage_path.to_path_buf()),
                ));
                InitStatus::Degraded
            }
        }
    }

    /// Current handle state for collaborator display logic. Never fails.
    pub fn status(&self) -> LedgerStatus {
        let state = self.read_state();
        match &*state {
            LedgerState::Uninitialized => LedgerStatus {
                initialized: false,
                degraded: false,
                storage_path: None,
            },
            LedgerState::Ready(inner) => LedgerStatus {
                initialized: true,
                degraded: inner.mode == StorageMode::Degraded,
                storage_path: inner
                    .base_directory
                    .as_ref()
                    .map(|p| p.to_string_lossy().to_string()),
            },
        }
    }

    // ---- entry operations ----

    pub fn add_entry(&self, command: AddEntryCommand) -> LedgerResult<shared::DrinkEntry> {
        self.with_writable(|inner| {
            let entry = inner.entry_service.add_entry(command)?;
            Ok(EntryMapper::to_dto(entry))
        })
    }

    pub fn add_entry_with_date(
        &self,
        command: AddEntryWithDateCommand,
    ) -> LedgerResult<shared::DrinkEntry> {
        self.with_writable(|inner| {
            let entry = inner.entry_service.add_entry_with_date(command)?;
            Ok(EntryMapper::to_dto(entry))
        })
    }

    pub fn update_entry(&self, command: UpdateEntryCommand) -> LedgerResult<shared::DrinkEntry> {
        self.with_writable(|inner| {
            let entry = inner.entry_service.update_entry(command)?;
            Ok(EntryMapper::to_dto(entry))
        })
    }

    pub fn update_entry_date(
        &self,
        command: UpdateEntryDateCommand,
    ) -> LedgerResult<shared::DrinkEntry> {
        self.with_writable(|inner| {
            let entry = inner.entry_service.update_entry_date(command)?;
            Ok(EntryMapper::to_dto(entry))
        })
    }

    pub fn delete_entry(&self, entry_id: &str) -> LedgerResult<()> {
        self.with_writable(|inner| inner.entry_service.delete_entry(entry_id))
    }

    /// Remove every entry, the goal/baseline history, and reset the
    /// day-window settings to defaults. Idempotent.
    pub fn delete_all_data(&self) -> LedgerResult<()> {
        self.with_writable(|inner| {
            inner.entry_service.delete_all_entries()?;
            inner
                .goal_repository
                .delete_all_goals()
                .map_err(LedgerError::storage)?;
            inner
                .baseline_repository
                .delete_all_baselines()
                .map_err(LedgerError::storage)?;
            inner
                .settings_repository
                .update_day_window(&DayWindowSettings::default())
                .map_err(LedgerError::storage)?;
            info!("Deleted all ledger data");
            Ok(())
        })
    }

    pub fn entries_in_range(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> LedgerResult<EntryListResponse> {
        self.with_ledger(|inner| {
            let result = inner.entry_service.entries_in_range(EntryRangeQuery {
                start_date,
                end_date,
            })?;
            Ok(EntryListResponse {
                entries: result.entries.into_iter().map(EntryMapper::to_dto).collect(),
            })
        })
    }

    /// Range query serialized as a JSON array, for collaborators that want
    /// an opaque payload rather than typed DTOs.
    pub fn entries_in_range_json(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> LedgerResult<String> {
        let response = self.entries_in_range(start_date, end_date)?;
        serde_json::to_string(&response.entries).map_err(|e| LedgerError::Storage(e.to_string()))
    }

    // ---- aggregate reads ----

    /// Total qualifying volume for one effective date, or
    /// `CONSUMPTION_UNAVAILABLE` when the ledger cannot answer.
    pub fn daily_consumption(&self, date: NaiveDate) -> f64 {
        match self.with_ledger(|inner| inner.aggregation_service.daily_total(date)) {
            Ok(total) => total,
            Err(e) => {
                warn!("Daily consumption unavailable: {}", e);
                CONSUMPTION_UNAVAILABLE
            }
        }
    }

    /// Total qualifying volume for the seven days starting at
    /// `week_start_date`, or `CONSUMPTION_UNAVAILABLE`.
    pub fn weekly_consumption(&self, week_start_date: NaiveDate) -> f64 {
        let week_end = week_start_date + chrono::Duration::days(6);
        match self.with_ledger(|inner| inner.aggregation_service.range_total(week_start_date, week_end))
        {
            Ok(total) => total,
            Err(e) => {
                warn!("Weekly consumption unavailable: {}", e);
                CONSUMPTION_UNAVAILABLE
            }
        }
    }

    /// Per-date totals for charting; dates without qualifying entries are
    /// absent from the map.
    pub fn daily_totals(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> LedgerResult<std::collections::BTreeMap<NaiveDate, f64>> {
        self.with_ledger(|inner| {
            inner
                .aggregation_service
                .daily_totals_by_date(start_date, end_date)
        })
    }

    // ---- goal and baseline operations ----

    pub fn set_goal(&self, command: SetGoalCommand) -> LedgerResult<shared::ConsumptionGoal> {
        self.with_writable(|inner| {
            let goal = inner.goal_service.set_goal(command)?;
            Ok(GoalMapper::to_dto(goal))
        })
    }

    pub fn current_goal(&self) -> LedgerResult<Option<shared::ConsumptionGoal>> {
        self.with_ledger(|inner| Ok(inner.goal_service.current_goal()?.map(GoalMapper::to_dto)))
    }

    pub fn set_baseline(&self, command: SetBaselineCommand) -> LedgerResult<shared::Baseline> {
        self.with_writable(|inner| {
            let baseline = inner.goal_service.set_baseline_direct(command)?;
            Ok(BaselineMapper::to_dto(baseline))
        })
    }

    pub fn set_baseline_from_period(
        &self,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> LedgerResult<shared::Baseline> {
        self.with_writable(|inner| {
            let baseline = inner
                .goal_service
                .set_baseline_from_period(period_start, period_end)?;
            Ok(BaselineMapper::to_dto(baseline))
        })
    }

    pub fn current_baseline(&self) -> LedgerResult<Option<shared::Baseline>> {
        self.with_ledger(|inner| {
            Ok(inner
                .goal_service
                .current_baseline()?
                .map(BaselineMapper::to_dto))
        })
    }

    pub fn clear_baseline(&self) -> LedgerResult<()> {
        self.with_writable(|inner| inner.goal_service.clear_baseline())
    }

    pub fn progress_metrics(&self) -> LedgerResult<Option<ProgressMetrics>> {
        self.with_ledger(|inner| inner.goal_service.progress_metrics())
    }

    // ---- settings ----

    pub fn day_window(&self) -> LedgerResult<DayWindowSettings> {
        self.with_ledger(|inner| {
            inner
                .settings_repository
                .get_day_window()
                .map_err(LedgerError::storage)
        })
    }

    pub fn set_day_window(&self, command: SetDayWindowCommand) -> LedgerResult<DayWindowSettings> {
        if command.end_of_day_hour > 23 {
            return Err(LedgerError::InvalidField(
                "End-of-day hour must be between 0 and 23".to_string(),
            ));
        }
        if !(1..=7).contains(&command.week_start_day) {
            return Err(LedgerError::InvalidField(
                "Week start day must be between 1 (Monday) and 7 (Sunday)".to_string(),
            ));
        }

        self.with_writable(|inner| {
            let settings = DayWindowSettings {
                end_of_day_hour: command.end_of_day_hour,
                week_start_day: command.week_start_day,
            };
            inner
                .settings_repository
                .update_day_window(&settings)
                .map_err(LedgerError::storage)?;
            Ok(settings)
        })
    }

    // ---- export / import ----

    /// Produce the full lossless export document.
    pub fn export_all(&self) -> LedgerResult<ExportDataResponse> {
        self.with_ledger(|inner| {
            let mut entries = inner.entry_service.list_all_entries()?;
            // Chronological, oldest first, stable across re-exports.
            entries.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

            let mut csv_writer = csv::Writer::from_writer(Vec::new());
            csv_writer
                .write_record(EXPORT_HEADER)
                .map_err(|e| LedgerError::Storage(e.to_string()))?;
            for entry in &entries {
                csv_writer
                    .write_record(&[
                        entry.id.clone(),
                        entry.date.to_string(),
                        entry.name.clone(),
                        entry.alcohol_percentage.to_string(),
                        entry.volume_ml.to_string(),
                        entry.notes.clone(),
                        entry.created_at.to_rfc3339(),
                    ])
                    .map_err(|e| LedgerError::Storage(e.to_string()))?;
            }

            let bytes = csv_writer
                .into_inner()
                .map_err(|e| LedgerError::Storage(e.to_string()))?;
            let csv_content =
                String::from_utf8(bytes).map_err(|e| LedgerError::Storage(e.to_string()))?;

            let filename = format!("drinklog_export_{}.csv", Utc::now().format("%Y%m%d"));
            info!("Exported {} entries", entries.len());

            Ok(ExportDataResponse {
                csv_content,
                filename,
                entry_count: entries.len(),
            })
        })
    }

    /// Write the export document to a directory. `custom_path` falls back to
    /// the user's documents directory, then their home directory.
    pub fn export_to_path(&self, custom_path: Option<&str>) -> LedgerResult<ExportToPathResponse> {
        let export = self.export_all()?;

        let export_dir = match custom_path {
            Some(path) if !path.trim().is_empty() => PathBuf::from(sanitize_path(path)),
            _ => match dirs::document_dir().or_else(dirs::home_dir) {
                Some(dir) => dir,
                None => {
                    error!("Could not determine a default export directory");
                    return Ok(ExportToPathResponse {
                        success: false,
                        message: "Failed to determine export directory".to_string(),
                        file_path: String::new(),
                        entry_count: 0,
                    });
                }
            },
        };

        let file_path = export_dir.join(&export.filename);
        if let Err(e) = std::fs::create_dir_all(&export_dir) {
            error!("Failed to create export directory {:?}: {}", export_dir, e);
            return Ok(ExportToPathResponse {
                success: false,
                message: format!("Failed to create export directory: {}", e),
                file_path: export_dir.to_string_lossy().to_string(),
                entry_count: 0,
            });
        }

        match std::fs::write(&file_path, &export.csv_content) {
            Ok(()) => {
                let file_path_str = file_path.to_string_lossy().to_string();
                info!(
                    "Exported {} entries to {}",
                    export.entry_count, file_path_str
                );
                Ok(ExportToPathResponse {
                    success: true,
                    message: format!("File exported successfully to: {}", file_path_str),
                    file_path: file_path_str,
                    entry_count: export.entry_count,
                })
            }
            Err(e) => {
                error!("Failed to write export file to {:?}: {}", file_path, e);
                Ok(ExportToPathResponse {
                    success: false,
                    message: format!("Failed to write export file: {}", e),
                    file_path: file_path.to_string_lossy().to_string(),
                    entry_count: 0,
                })
            }
        }
    }

    /// Import an export document. Rows without an id get a fresh UUID;
    /// malformed rows and duplicate ids are counted as skipped.
    pub fn import_all(&self, data: &str) -> LedgerResult<ImportDataResult> {
        self.with_writable(|inner| {
            let mut csv_reader = csv::Reader::from_reader(data.as_bytes());
            let headers = csv_reader
                .headers()
                .map_err(|e| LedgerError::Parse(e.to_string()))?
                .clone();
            if headers.iter().ne(EXPORT_HEADER) {
                return Err(LedgerError::Parse(format!(
                    "Unrecognized import header: expected '{}'",
                    EXPORT_HEADER.join(",")
                )));
            }

            let mut imported_count = 0;
            let mut skipped_count = 0;

            for record in csv_reader.records() {
                let record = match record {
                    Ok(r) => r,
                    Err(e) => {
                        warn!("Skipping malformed import row: {}", e);
                        skipped_count += 1;
                        continue;
                    }
                };

                let entry = match parse_import_record(&record) {
                    Some(entry) => entry,
                    None => {
                        warn!("Skipping unparseable import row: {:?}", record);
                        skipped_count += 1;
                        continue;
                    }
                };

                match inner.entry_service.import_entry(entry) {
                    Ok(_) => imported_count += 1,
                    Err(LedgerError::DuplicateId(id)) => {
                        warn!("Skipping import row with duplicate id {}", id);
                        skipped_count += 1;
                    }
                    Err(LedgerError::InvalidField(reason)) => {
                        warn!("Skipping invalid import row: {}", reason);
                        skipped_count += 1;
                    }
                    Err(e) => return Err(e),
                }
            }

            info!(
                "Import finished: {} imported, {} skipped",
                imported_count, skipped_count
            );
            Ok(ImportDataResult {
                imported_count,
                skipped_count,
            })
        })
    }

    // ---- lock plumbing ----

    fn with_ledger<T>(&self, f: impl FnOnce(&LedgerInner) -> LedgerResult<T>) -> LedgerResult<T> {
        let state = self.read_state();
        match &*state {
            LedgerState::Ready(inner) => f(inner),
            LedgerState::Uninitialized => Err(LedgerError::NotInitialized),
        }
    }

    /// Like `with_ledger` but takes the write lock (serializing against all
    /// other operations) and rejects the call in degraded mode.
    fn with_writable<T>(&self, f: impl FnOnce(&LedgerInner) -> LedgerResult<T>) -> LedgerResult<T> {
        let state = self.write_state();
        match &*state {
            LedgerState::Ready(inner) => {
                inner.ensure_writable()?;
                f(inner)
            }
            LedgerState::Uninitialized => Err(LedgerError::NotInitialized),
        }
    }

    // A poisoned lock only means some earlier operation panicked while
    // holding it; the guarded state is rebuilt from disk on every access, so
    // recovering the guard is safe.
    fn read_state(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_import_record(record: &csv::StringRecord) -> Option<DrinkEntry> {
    let id_field = record.get(0)?.trim();
    let id = if id_field.is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        id_field.to_string()
    };

    let date: NaiveDate = record.get(1)?.trim().parse().ok()?;
    let name = record.get(2)?.to_string();
    let alcohol_percentage: f64 = record.get(3)?.trim().parse().ok()?;
    let volume_ml: f64 = record.get(4)?.trim().parse().ok()?;
    let notes = record.get(5)?.to_string();
    let created_at = record
        .get(6)
        .and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    Some(DrinkEntry {
        id,
        name,
        alcohol_percentage,
        volume_ml,
        date,
        notes,
        created_at,
    })
}

/// Basic path sanitization to handle common user input issues
fn sanitize_path(path: &str) -> String {
    let mut cleaned = path.trim().to_string();

    // Remove surrounding quotes (single or double)
    if (cleaned.starts_with('"') && cleaned.ends_with('"'))
        || (cleaned.starts_with('\'') && cleaned.ends_with('\''))
    {
        cleaned = cleaned[1..cleaned.len() - 1].to_string();
    }

    cleaned = cleaned.trim().to_string();
    cleaned = cleaned.replace("\\ ", " ");

    while cleaned.ends_with('/') || cleaned.ends_with('\\') {
        cleaned.pop();
    }

    // Tilde expansion for home directory
    if cleaned.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            if cleaned == "~" {
                cleaned = home.to_string_lossy().to_string();
            } else if cleaned.starts_with("~/") || cleaned.starts_with("~\\") {
                cleaned = home.join(&cleaned[2..]).to_string_lossy().to_string();
            }
        }
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn create_test_ledger() -> (DrinkLedger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let ledger = DrinkLedger::new();
        assert_eq!(ledger.init(temp_dir.path()), InitStatus::Ready);
        (ledger, temp_dir)
    }

    fn add_command(name: &str, strength: f64, volume: f64) -> AddEntryCommand {
        AddEntryCommand {
            name: name.to_string(),
            alcohol_percentage: strength,
            volume_ml: volume,
            notes: String::new(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn operations_before_init_fail_deterministically() {
        let ledger = DrinkLedger::new();

        let err = ledger.add_entry(add_command("Lager", 5.0, 500.0)).unwrap_err();
        assert!(matches!(err, LedgerError::NotInitialized));

        assert_eq!(
            ledger.daily_consumption(date(2024, 5, 10)),
            CONSUMPTION_UNAVAILABLE
        );
        assert_eq!(
            ledger.weekly_consumption(date(2024, 5, 6)),
            CONSUMPTION_UNAVAILABLE
        );

        let status = ledger.status();
        assert!(!status.initialized);
        assert!(!status.degraded);
    }

    #[test]
    fn init_is_idempotent() {
        let (ledger, temp_dir) = create_test_ledger();
        assert_eq!(ledger.init(temp_dir.path()), InitStatus::AlreadyInitialized);
    }

    #[test]
    fn unopenable_storage_falls_back_to_degraded_mode() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the data directory should go makes
        // create_dir_all fail.
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let ledger = DrinkLedger::new();
        assert_eq!(ledger.init(&blocker.join("data")), InitStatus::Degraded);

        let status = ledger.status();
        assert!(status.initialized);
        assert!(status.degraded);

        // Reads answer (empty store), writes fail explicitly.
        assert_eq!(ledger.daily_consumption(date(2024, 5, 10)), 0.0);
        let err = ledger.add_entry(add_command("Lager", 5.0, 500.0)).unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));
    }

    #[test]
    fn logged_drink_shows_up_in_daily_consumption() {
        let (ledger, _temp_dir) = create_test_ledger();

        let entry = ledger.add_entry(add_command("Lager", 5.0, 500.0)).unwrap();
        assert_eq!(ledger.daily_consumption(entry.date), 500.0);

        // A non-alcoholic drink is stored but never aggregated.
        ledger
            .add_entry(add_command("Alcohol-free wheat", 0.0, 330.0))
            .unwrap();
        assert_eq!(ledger.daily_consumption(entry.date), 500.0);

        let listed = ledger.entries_in_range(entry.date, entry.date).unwrap();
        assert_eq!(listed.entries.len(), 2);
    }

    #[test]
    fn weekly_consumption_covers_seven_days() {
        let (ledger, _temp_dir) = create_test_ledger();
        let week_start = date(2024, 5, 6);

        for (i, day_offset) in [0i64, 3, 6].iter().enumerate() {
            ledger
                .add_entry_with_date(AddEntryWithDateCommand {
                    id: format!("e{}", i),
                    name: "Lager".to_string(),
                    alcohol_percentage: 5.0,
                    volume_ml: 100.0,
                    date: week_start + Duration::days(*day_offset),
                    notes: String::new(),
                })
                .unwrap();
        }
        // Day 7 is outside the window.
        ledger
            .add_entry_with_date(AddEntryWithDateCommand {
                id: "outside".to_string(),
                name: "Lager".to_string(),
                alcohol_percentage: 5.0,
                volume_ml: 100.0,
                date: week_start + Duration::days(7),
                notes: String::new(),
            })
            .unwrap();

        assert_eq!(ledger.weekly_consumption(week_start), 300.0);
    }

    #[test]
    fn range_queries_return_everything_most_recent_first() {
        let (ledger, _temp_dir) = create_test_ledger();
        let days = [date(2024, 5, 10), date(2024, 5, 12), date(2024, 5, 11)];
        for (i, day) in days.iter().enumerate() {
            ledger
                .add_entry_with_date(AddEntryWithDateCommand {
                    id: format!("e{}", i),
                    name: format!("Drink {}", i),
                    alcohol_percentage: 5.0,
                    volume_ml: 200.0,
                    date: *day,
                    notes: String::new(),
                })
                .unwrap();
        }

        let listed = ledger
            .entries_in_range(date(2024, 5, 10), date(2024, 5, 12))
            .unwrap();
        let ids: Vec<&str> = listed.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2", "e0"]);

        let json = ledger
            .entries_in_range_json(date(2024, 5, 10), date(2024, 5, 12))
            .unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("\"e1\""));
    }

    #[test]
    fn export_import_round_trips_the_entry_set() {
        let (ledger, _temp_dir) = create_test_ledger();
        ledger
            .add_entry_with_date(AddEntryWithDateCommand {
                id: "e1".to_string(),
                name: "Stout, imperial".to_string(),
                alcohol_percentage: 9.5,
                volume_ml: 330.0,
                date: date(2024, 5, 10),
                notes: "notes, with commas".to_string(),
            })
            .unwrap();
        ledger
            .add_entry_with_date(AddEntryWithDateCommand {
                id: "e2".to_string(),
                name: "Alcohol-free".to_string(),
                alcohol_percentage: 0.0,
                volume_ml: 500.0,
                date: date(2024, 5, 11),
                notes: String::new(),
            })
            .unwrap();

        let export = ledger.export_all().unwrap();
        assert_eq!(export.entry_count, 2);
        assert!(export.filename.starts_with("drinklog_export_"));

        // Import into a fresh ledger and compare the stores.
        let temp_dir2 = TempDir::new().unwrap();
        let ledger2 = DrinkLedger::new();
        ledger2.init(temp_dir2.path());

        let result = ledger2.import_all(&export.csv_content).unwrap();
        assert_eq!(result.imported_count, 2);
        assert_eq!(result.skipped_count, 0);

        let original = ledger
            .entries_in_range(date(2024, 5, 1), date(2024, 5, 31))
            .unwrap();
        let reimported = ledger2
            .entries_in_range(date(2024, 5, 1), date(2024, 5, 31))
            .unwrap();
        assert_eq!(original, reimported);
    }

    #[test]
    fn import_skips_duplicates_and_mints_missing_ids() {
        let (ledger, _temp_dir) = create_test_ledger();
        ledger
            .add_entry_with_date(AddEntryWithDateCommand {
                id: "existing".to_string(),
                name: "Lager".to_string(),
                alcohol_percentage: 5.0,
                volume_ml: 500.0,
                date: date(2024, 5, 10),
                notes: String::new(),
            })
            .unwrap();

        let data = "id,date,name,alcohol_percentage,volume_ml,notes,created_at\n\
                    existing,2024-05-10,Lager,5,500,,2024-05-10T19:00:00+00:00\n\
                    ,2024-05-11,Cider,4.5,440,,2024-05-11T19:00:00+00:00\n\
                    bad-row,not-a-date,Cider,4.5,440,,\n";

        let result = ledger.import_all(data).unwrap();
        assert_eq!(result.imported_count, 1);
        assert_eq!(result.skipped_count, 2);

        let listed = ledger
            .entries_in_range(date(2024, 5, 1), date(2024, 5, 31))
            .unwrap();
        assert_eq!(listed.entries.len(), 2);
        let minted = listed.entries.iter().find(|e| e.name == "Cider").unwrap();
        assert!(uuid::Uuid::parse_str(&minted.id).is_ok());
    }

    #[test]
    fn import_rejects_unknown_header() {
        let (ledger, _temp_dir) = create_test_ledger();
        let err = ledger
            .import_all("Date,Name,Alcohol%,Volume(ml),Notes\n2024-05-10,Lager,5,500,\n")
            .unwrap_err();
        assert!(matches!(err, LedgerError::Parse(_)));
    }

    #[test]
    fn delete_all_data_is_idempotent_and_resets_everything() {
        let (ledger, _temp_dir) = create_test_ledger();
        ledger.add_entry(add_command("Lager", 5.0, 500.0)).unwrap();
        ledger
            .set_goal(SetGoalCommand {
                daily_target_ml: 500.0,
                weekly_target_ml: 3500.0,
                start_date: date(2024, 5, 1),
                end_date: date(2024, 5, 31),
            })
            .unwrap();
        ledger
            .set_day_window(SetDayWindowCommand {
                end_of_day_hour: 6,
                week_start_day: 7,
            })
            .unwrap();

        ledger.delete_all_data().unwrap();
        ledger.delete_all_data().unwrap();

        let today = ledger.day_window().unwrap();
        assert_eq!(today, DayWindowSettings::default());
        assert!(ledger.current_goal().unwrap().is_none());
        let listed = ledger
            .entries_in_range(date(2000, 1, 1), date(2100, 1, 1))
            .unwrap();
        assert!(listed.entries.is_empty());
    }

    #[test]
    fn goal_and_baseline_flow_through_the_facade() {
        let (ledger, _temp_dir) = create_test_ledger();
        ledger
            .add_entry_with_date(AddEntryWithDateCommand {
                id: "e1".to_string(),
                name: "Lager".to_string(),
                alcohol_percentage: 5.0,
                volume_ml: 1400.0,
                date: date(2024, 5, 3),
                notes: String::new(),
            })
            .unwrap();

        let baseline = ledger
            .set_baseline_from_period(date(2024, 5, 1), date(2024, 5, 7))
            .unwrap();
        assert_eq!(baseline.average_daily_ml, 200.0);
        assert_eq!(baseline.average_weekly_ml, 1400.0);

        let metrics = ledger.progress_metrics().unwrap().unwrap();
        assert_eq!(metrics.baseline_daily_average, 200.0);

        ledger.clear_baseline().unwrap();
        assert!(ledger.current_baseline().unwrap().is_none());
        assert!(ledger.progress_metrics().unwrap().is_none());
    }

    #[test]
    fn set_day_window_validates_inputs() {
        let (ledger, _temp_dir) = create_test_ledger();

        let err = ledger
            .set_day_window(SetDayWindowCommand {
                end_of_day_hour: 24,
                week_start_day: 1,
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidField(_)));

        let err = ledger
            .set_day_window(SetDayWindowCommand {
                end_of_day_hour: 3,
                week_start_day: 0,
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidField(_)));

        let settings = ledger
            .set_day_window(SetDayWindowCommand {
                end_of_day_hour: 5,
                week_start_day: 7,
            })
            .unwrap();
        assert_eq!(settings.end_of_day_hour, 5);
        assert_eq!(ledger.day_window().unwrap(), settings);
    }

    #[test]
    fn state_survives_reopening_the_same_path() {
        let temp_dir = TempDir::new().unwrap();
        let entry_date;
        {
            let ledger = DrinkLedger::new();
            ledger.init(temp_dir.path());
            let entry = ledger.add_entry(add_command("Lager", 5.0, 500.0)).unwrap();
            entry_date = entry.date;
            ledger
                .set_goal(SetGoalCommand {
                    daily_target_ml: 500.0,
                    weekly_target_ml: 3500.0,
                    start_date: date(2024, 5, 1),
                    end_date: date(2024, 5, 31),
                })
                .unwrap();
        }

        let reopened = DrinkLedger::new();
        assert_eq!(reopened.init(temp_dir.path()), InitStatus::Ready);
        assert_eq!(reopened.daily_consumption(entry_date), 500.0);
        assert_eq!(
            reopened.current_goal().unwrap().unwrap().daily_target_ml,
            500.0
        );
    }

    #[test]
    fn export_to_path_writes_the_document() {
        let (ledger, _temp_dir) = create_test_ledger();
        ledger.add_entry(add_command("Lager", 5.0, 500.0)).unwrap();

        let out_dir = TempDir::new().unwrap();
        let response = ledger
            .export_to_path(Some(out_dir.path().to_str().unwrap()))
            .unwrap();
        assert!(response.success);
        assert_eq!(response.entry_count, 1);

        let written = std::fs::read_to_string(&response.file_path).unwrap();
        assert!(written.starts_with("id,date,name,alcohol_percentage,volume_ml,notes,created_at"));
    }

    #[test]
    fn sanitize_path_handles_common_noise() {
        assert_eq!(sanitize_path("  /tmp/exports/  "), "/tmp/exports");
        assert_eq!(sanitize_path("\"/tmp/exports\""), "/tmp/exports");
        assert_eq!(sanitize_path("/tmp/my\\ exports"), "/tmp/my exports");
    }
}
