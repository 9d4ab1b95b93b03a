//! CSV-backed baseline repository.
//!
//! Same append-only scheme as goals: `baselines.csv` accumulates rows and the
//! latest one wins. Clearing the baseline appends a `cleared` revision of the
//! latest row, so `get_current_baseline` returns nothing while the history
//! stays intact.

use anyhow::{Context, Result};
use csv::{Reader, Writer};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::BufReader;

use super::connection::CsvConnection;
use crate::domain::models::baseline::{BaselineState, DomainBaseline};
use crate::storage::traits::BaselineStorage;

const BASELINES_HEADER: &str =
    "id,average_daily_ml,average_weekly_ml,calculated_date,period_start,period_end,state,created_at";

/// CSV record structure for baselines
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BaselineRecord {
    id: String,
    average_daily_ml: f64,
    average_weekly_ml: f64,
    calculated_date: chrono::NaiveDate,
    period_start: chrono::NaiveDate,
    period_end: chrono::NaiveDate,
    state: String,
    created_at: String,
}

impl From<DomainBaseline> for BaselineRecord {
    fn from(baseline: DomainBaseline) -> Self {
        BaselineRecord {
            id: baseline.id,
            average_daily_ml: baseline.average_daily_ml,
            average_weekly_ml: baseline.average_weekly_ml,
            calculated_date: baseline.calculated_date,
            period_start: baseline.period_start,
            period_end: baseline.period_end,
            state: baseline.state.as_str().to_string(),
            created_at: baseline.created_at,
        }
    }
}

impl TryFrom<BaselineRecord> for DomainBaseline {
    type Error = anyhow::Error;

    fn try_from(record: BaselineRecord) -> Result<Self> {
        let state = BaselineState::from_string(&record.state)
            .map_err(|e| anyhow::anyhow!("Failed to parse baseline state: {}", e))?;

        Ok(DomainBaseline {
            id: record.id,
            average_daily_ml: record.average_daily_ml,
            average_weekly_ml: record.average_weekly_ml,
            calculated_date: record.calculated_date,
            period_start: record.period_start,
            period_end: record.period_end,
            state,
            created_at: record.created_at,
        })
    }
}

/// CSV-based baseline repository with append-only history
#[derive(Clone)]
pub struct BaselineRepository {
    connection: CsvConnection,
}

impl BaselineRepository {
    /// Create a new CSV baseline repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read all baseline records in file (append) order
    fn read_baselines(&self) -> Result<Vec<DomainBaseline>> {
        let file_path = self.connection.baselines_file_path();
        self.connection
            .ensure_csv_file_exists(&file_path, BASELINES_HEADER)?;

        let file = File::open(&file_path)
            .with_context(|| format!("failed to open {:?}", file_path))?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut baselines = Vec::new();
        for result in csv_reader.deserialize::<BaselineRecord>() {
            match result {
                Ok(record) => match DomainBaseline::try_from(record) {
                    Ok(baseline) => baselines.push(baseline),
                    Err(e) => {
                        warn!("Failed to parse baseline record: {}. Skipping.", e);
                        continue;
                    }
                },
                Err(e) => {
                    warn!("Failed to parse baseline record: {}. Skipping.", e);
                    continue;
                }
            }
        }

        Ok(baselines)
    }
}

impl BaselineStorage for BaselineRepository {
    fn append_baseline(&self, baseline: &DomainBaseline) -> Result<()> {
        let file_path = self.connection.baselines_file_path();
        self.connection
            .ensure_csv_file_exists(&file_path, BASELINES_HEADER)?;

        let file = OpenOptions::new()
            .append(true)
            .open(&file_path)
            .with_context(|| format!("failed to open {:?} for append", file_path))?;

        let mut csv_writer = Writer::from_writer(file);
        csv_writer.write_record(&[
            baseline.id.clone(),
            baseline.average_daily_ml.to_string(),
            baseline.average_weekly_ml.to_string(),
            baseline.calculated_date.to_string(),
            baseline.period_start.to_string(),
            baseline.period_end.to_string(),
            baseline.state.as_str().to_string(),
            baseline.created_at.clone(),
        ])?;
        csv_writer.flush()?;

        debug!("Appended baseline {} to {:?}", baseline.id, file_path);
        Ok(())
    }

    fn get_current_baseline(&self) -> Result<Option<DomainBaseline>> {
        let latest = self.read_baselines()?.into_iter().last();
        Ok(latest.filter(|b| b.state == BaselineState::Active))
    }

    fn delete_all_baselines(&self) -> Result<()> {
        let file_path = self.connection.baselines_file_path();
        std::fs::write(&file_path, format!("{}\n", BASELINES_HEADER))
            .with_context(|| format!("failed to reset {:?}", file_path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn setup_test_repo() -> (BaselineRepository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection = CsvConnection::new(temp_dir.path()).expect("Failed to create connection");
        (BaselineRepository::new(connection), temp_dir)
    }

    fn sample_baseline(id: &str, daily: f64, state: BaselineState) -> DomainBaseline {
        DomainBaseline {
            id: id.to_string(),
            average_daily_ml: daily,
            average_weekly_ml: daily * 7.0,
            calculated_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            period_start: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
            state,
            created_at: "2024-05-10T10:00:00Z".to_string(),
        }
    }

    #[test]
    fn latest_active_row_is_current() {
        let (repo, _temp_dir) = setup_test_repo();
        repo.append_baseline(&sample_baseline("baseline::1", 500.0, BaselineState::Active))
            .unwrap();
        repo.append_baseline(&sample_baseline("baseline::2", 400.0, BaselineState::Active))
            .unwrap();

        let current = repo.get_current_baseline().unwrap().unwrap();
        assert_eq!(current.id, "baseline::2");
        assert_eq!(current.average_daily_ml, 400.0);
    }

    #[test]
    fn cleared_revision_hides_the_baseline() {
        let (repo, _temp_dir) = setup_test_repo();
        repo.append_baseline(&sample_baseline("baseline::1", 500.0, BaselineState::Active))
            .unwrap();
        repo.append_baseline(&sample_baseline("baseline::1", 500.0, BaselineState::Cleared))
            .unwrap();

        assert!(repo.get_current_baseline().unwrap().is_none());
    }

    #[test]
    fn setting_after_clear_activates_again() {
        let (repo, _temp_dir) = setup_test_repo();
        repo.append_baseline(&sample_baseline("baseline::1", 500.0, BaselineState::Active))
            .unwrap();
        repo.append_baseline(&sample_baseline("baseline::1", 500.0, BaselineState::Cleared))
            .unwrap();
        repo.append_baseline(&sample_baseline("baseline::2", 300.0, BaselineState::Active))
            .unwrap();

        let current = repo.get_current_baseline().unwrap().unwrap();
        assert_eq!(current.id, "baseline::2");
    }

    #[test]
    fn weekly_average_round_trips() {
        let (repo, _temp_dir) = setup_test_repo();
        repo.append_baseline(&sample_baseline("baseline::1", 214.5, BaselineState::Active))
            .unwrap();

        let current = repo.get_current_baseline().unwrap().unwrap();
        assert_eq!(current.average_weekly_ml, 214.5 * 7.0);
    }
}
