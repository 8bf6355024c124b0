//! Append-only CSV logs of interactions and generated plans.
//!
//! Each log file gets its header row when it is first created. Existing
//! files are only ever opened in append mode, so earlier rows are never
//! rewritten or truncated.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use onboarding_core::models::{InteractionRecord, TaskRecord, TaskStatus, TaskType};

use crate::config::LogsConfig;

pub const INTERACTION_COLUMNS: [&str; 6] =
    ["timestamp", "user_name", "role", "question", "answer", "category"];

pub const TASK_COLUMNS: [&str; 9] = [
    "task_id",
    "user_name",
    "role",
    "start_date",
    "title",
    "day",
    "due_date",
    "type",
    "status",
];

/// One row of the task log: a task plus the plan it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRow {
    pub task_id: String,
    pub user_name: String,
    pub role: String,
    pub start_date: NaiveDate,
    pub title: String,
    pub day: u32,
    pub due_date: NaiveDate,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub status: TaskStatus,
}

impl TaskRow {
    pub fn new(user_name: &str, role: &str, start_date: NaiveDate, task: &TaskRecord) -> Self {
        Self {
            task_id: task.task_id.clone(),
            user_name: user_name.to_string(),
            role: role.to_string(),
            start_date,
            title: task.title.clone(),
            day: task.day,
            due_date: task.due_date,
            task_type: task.task_type,
            status: task.status,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvLogger {
    interactions_path: PathBuf,
    tasks_path: PathBuf,
}

impl CsvLogger {
    pub fn new(interactions_path: impl Into<PathBuf>, tasks_path: impl Into<PathBuf>) -> Self {
        Self {
            interactions_path: interactions_path.into(),
            tasks_path: tasks_path.into(),
        }
    }

    pub fn from_config(config: &LogsConfig) -> Self {
        Self::new(config.interactions_path(), config.tasks_path())
    }

    pub fn interactions_path(&self) -> &Path {
        &self.interactions_path
    }

    pub fn tasks_path(&self) -> &Path {
        &self.tasks_path
    }

    /// Create both log files with headers if they do not exist yet.
    pub fn init(&self) -> Result<()> {
        ensure_header(&self.interactions_path, &INTERACTION_COLUMNS)?;
        ensure_header(&self.tasks_path, &TASK_COLUMNS)?;
        Ok(())
    }

    /// Append one interaction stamped with the current UTC time.
    pub fn log_interaction(
        &self,
        user_name: &str,
        role: &str,
        question: &str,
        answer: &str,
        category: &str,
    ) -> Result<InteractionRecord> {
        let record = InteractionRecord {
            timestamp: Utc::now(),
            user_name: user_name.to_string(),
            role: role.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            category: category.to_string(),
        };

        ensure_header(&self.interactions_path, &INTERACTION_COLUMNS)?;
        let mut writer = appender(&self.interactions_path)?;
        writer.serialize(&record)?;
        writer.flush()?;

        Ok(record)
    }

    /// Append one row per task, all sharing the plan's user, role, and start date.
    pub fn log_tasks(
        &self,
        user_name: &str,
        role: &str,
        start_date: NaiveDate,
        tasks: &[TaskRecord],
    ) -> Result<()> {
        ensure_header(&self.tasks_path, &TASK_COLUMNS)?;
        if tasks.is_empty() {
            return Ok(());
        }

        let mut writer = appender(&self.tasks_path)?;
        for task in tasks {
            writer.serialize(TaskRow::new(user_name, role, start_date, task))?;
        }
        writer.flush()?;

        Ok(())
    }

    /// All logged interactions in file order. A missing log reads as empty;
    /// rows that do not parse are skipped with a warning.
    pub fn read_interactions(&self) -> Result<Vec<InteractionRecord>> {
        read_rows(&self.interactions_path)
    }

    /// All logged task rows in file order. A missing log reads as empty;
    /// rows that do not parse are skipped with a warning.
    pub fn read_tasks(&self) -> Result<Vec<TaskRow>> {
        read_rows(&self.tasks_path)
    }
}

fn ensure_header(path: &Path, columns: &[&str]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }
    }

    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => {
            let mut writer = csv::Writer::from_writer(file);
            writer.write_record(columns)?;
            writer.flush()?;
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to create log file: {}", path.display()))
        }
    }
}

fn appender(path: &Path) -> Result<csv::Writer<File>> {
    let file = OpenOptions::new()
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;
    Ok(csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file))
}

fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        match row {
            Ok(row) => rows.push(row),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "skipping malformed log row");
            }
        }
    }
    Ok(rows)
}
