//! CSV-backed goal repository.
//!
//! Append-only history: every `append_goal` adds a row to `goals.csv` and the
//! current goal is simply the last row. Nothing is ever rewritten in place,
//! so the full goal history is preserved for future features even though only
//! the latest record is served today.

use anyhow::{Context, Result};
use csv::{Reader, Writer};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::BufReader;

use super::connection::CsvConnection;
use crate::domain::models::goal::DomainGoal;
use crate::storage::traits::GoalStorage;

const GOALS_HEADER: &str = "id,daily_target_ml,weekly_target_ml,start_date,end_date,created_at";

/// CSV record structure for goals
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GoalRecord {
    id: String,
    daily_target_ml: f64,
    weekly_target_ml: f64,
    start_date: chrono::NaiveDate,
    end_date: chrono::NaiveDate,
    created_at: String,
}

impl From<DomainGoal> for GoalRecord {
    fn from(goal: DomainGoal) -> Self {
        GoalRecord {
            id: goal.id,
            daily_target_ml: goal.daily_target_ml,
            weekly_target_ml: goal.weekly_target_ml,
            start_date: goal.start_date,
            end_date: goal.end_date,
            created_at: goal.created_at,
        }
    }
}

impl From<GoalRecord> for DomainGoal {
    fn from(record: GoalRecord) -> Self {
        DomainGoal {
            id: record.id,
            daily_target_ml: record.daily_target_ml,
            weekly_target_ml: record.weekly_target_ml,
            start_date: record.start_date,
            end_date: record.end_date,
            created_at: record.created_at,
        }
    }
}

/// CSV-based goal repository with append-only history
#[derive(Clone)]
pub struct GoalRepository {
    connection: CsvConnection,
}

impl GoalRepository {
    /// Create a new CSV goal repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read all goal records in file (append) order
    fn read_goals(&self) -> Result<Vec<DomainGoal>> {
        let file_path = self.connection.goals_file_path();
        self.connection
            .ensure_csv_file_exists(&file_path, GOALS_HEADER)?;

        let file = File::open(&file_path)
            .with_context(|| format!("failed to open {:?}", file_path))?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut goals = Vec::new();
        for result in csv_reader.deserialize::<GoalRecord>() {
            match result {
                Ok(record) => goals.push(DomainGoal::from(record)),
                Err(e) => {
                    warn!("Failed to parse goal record: {}. Skipping.", e);
                    continue;
                }
            }
        }

        Ok(goals)
    }
}

impl GoalStorage for GoalRepository {
    fn append_goal(&self, goal: &DomainGoal) -> Result<()> {
        let file_path = self.connection.goals_file_path();
        self.connection
            .ensure_csv_file_exists(&file_path, GOALS_HEADER)?;

        let file = OpenOptions::new()
            .append(true)
            .open(&file_path)
            .with_context(|| format!("failed to open {:?} for append", file_path))?;

        let mut csv_writer = Writer::from_writer(file);
        // The header is already on disk; append the bare record.
        csv_writer.write_record(&[
            &goal.id,
            &goal.daily_target_ml.to_string(),
            &goal.weekly_target_ml.to_string(),
            &goal.start_date.to_string(),
            &goal.end_date.to_string(),
            &goal.created_at,
        ])?;
        csv_writer.flush()?;

        debug!("Appended goal {} to {:?}", goal.id, file_path);
        Ok(())
    }

    fn get_current_goal(&self) -> Result<Option<DomainGoal>> {
        Ok(self.read_goals()?.into_iter().last())
    }

    fn list_goals(&self) -> Result<Vec<DomainGoal>> {
        let mut goals = self.read_goals()?;
        goals.reverse(); // most recent first
        Ok(goals)
    }

    fn delete_all_goals(&self) -> Result<()> {
        let file_path = self.connection.goals_file_path();
        std::fs::write(&file_path, format!("{}\n", GOALS_HEADER))
            .with_context(|| format!("failed to reset {:?}", file_path))?;
        Ok(())
    }
}
