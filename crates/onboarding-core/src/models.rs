//! Core data models used throughout the onboarding copilot.
//!
//! These types represent the chunks stored in the vector index, the task
//! records produced by the plan generator, and the interaction records
//! appended to the analytics logs.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A bounded piece of a source document, stored as one retrievable unit.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChunk {
    /// Deterministic id; identical input re-ingested yields the same id.
    pub id: String,
    pub text: String,
    /// File name the chunk was extracted from (no directory).
    pub source_file: String,
    /// 1-based page number, or 1 when a whole document is one unit.
    pub page: u32,
    /// Character offset of the chunk within its page (or document).
    pub start_index: usize,
    /// Position of the chunk within its page (or document).
    pub chunk_index: usize,
}

impl DocumentChunk {
    /// Flat string metadata attached to the chunk in the vector index.
    pub fn metadata(&self) -> BTreeMap<String, String> {
        let mut meta = BTreeMap::new();
        meta.insert("source".to_string(), self.source_file.clone());
        meta.insert("page".to_string(), self.page.to_string());
        meta.insert("start_index".to_string(), self.start_index.to_string());
        meta.insert("chunk_index".to_string(), self.chunk_index.to_string());
        meta
    }
}

/// Category of an onboarding task.
///
/// Deserializes leniently: labels are matched case-insensitively and
/// unknown labels become [`TaskType::Other`], so hand-edited logs still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Form,
    Training,
    Meeting,
    Tools,
    Other,
}

impl TaskType {
    pub const ALL: [TaskType; 5] = [
        TaskType::Form,
        TaskType::Training,
        TaskType::Meeting,
        TaskType::Tools,
        TaskType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Form => "form",
            TaskType::Training => "training",
            TaskType::Meeting => "meeting",
            TaskType::Tools => "tools",
            TaskType::Other => "other",
        }
    }

    /// Maps a free-text label to a task type. Unknown labels become
    /// [`TaskType::Other`].
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or(TaskType::Other)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "form" => Ok(TaskType::Form),
            "training" => Ok(TaskType::Training),
            "meeting" => Ok(TaskType::Meeting),
            "tools" => Ok(TaskType::Tools),
            "other" => Ok(TaskType::Other),
            other => Err(format!("unknown task type: '{}'", other)),
        }
    }
}

impl<'de> Deserialize<'de> for TaskType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(TaskType::from_label(&label))
    }
}

/// Completion state of a task. Only ever set to `Done` outside this system
/// (by editing the task log), so parsing ignores case and surrounding
/// whitespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "done" => Ok(TaskStatus::Done),
            other => Err(format!("unknown task status: '{}'", other)),
        }
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a generated onboarding plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// `T1`, `T2`, … scoped to a single plan.
    pub task_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    /// 1-based working day.
    pub day: u32,
    /// `start_date + (day - 1)` days.
    pub due_date: NaiveDate,
    pub status: TaskStatus,
}

/// One logged question/answer exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub timestamp: DateTime<Utc>,
    pub user_name: String,
    pub role: String,
    pub question: String,
    pub answer: String,
    pub category: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_type_parses_case_insensitively() {
        assert_eq!("Training".parse::<TaskType>(), Ok(TaskType::Training));
        assert_eq!(" TOOLS ".parse::<TaskType>(), Ok(TaskType::Tools));
        assert!("lunch".parse::<TaskType>().is_err());
    }

    #[test]
    fn unknown_label_maps_to_other() {
        assert_eq!(TaskType::from_label("team lunch"), TaskType::Other);
        assert_eq!(TaskType::from_label("meeting"), TaskType::Meeting);
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Done".parse::<TaskStatus>(), Ok(TaskStatus::Done));
        assert_eq!(" PENDING ".parse::<TaskStatus>(), Ok(TaskStatus::Pending));
        assert!("in progress".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn status_defaults_to_pending() {
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
        assert_eq!(TaskStatus::Done.to_string(), "done");
    }

    #[test]
    fn chunk_metadata_carries_source() {
        let chunk = DocumentChunk {
            id: "abc".to_string(),
            text: "hello".to_string(),
            source_file: "handbook.pdf".to_string(),
            page: 2,
            start_index: 650,
            chunk_index: 1,
        };
        let meta = chunk.metadata();
        assert_eq!(meta["source"], "handbook.pdf");
        assert_eq!(meta["page"], "2");
        assert_eq!(meta["start_index"], "650");
    }
}
