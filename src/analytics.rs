//! Summaries over the CSV logs.

use std::collections::BTreeMap;

use anyhow::Result;

use onboarding_core::models::{InteractionRecord, TaskStatus, TaskType};

use crate::logger::{CsvLogger, TaskRow};

pub const DEFAULT_RECENT: usize = 15;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSummary {
    pub total: usize,
    pub pending: usize,
    pub done: usize,
    pub by_type: BTreeMap<TaskType, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionSummary {
    pub total: usize,
    /// Newest first.
    pub recent: Vec<InteractionRecord>,
}

pub fn summarize_tasks(rows: &[TaskRow]) -> TaskSummary {
    let mut summary = TaskSummary {
        total: rows.len(),
        ..TaskSummary::default()
    };
    for row in rows {
        match row.status {
            TaskStatus::Pending => summary.pending += 1,
            TaskStatus::Done => summary.done += 1,
        }
        *summary.by_type.entry(row.task_type).or_default() += 1;
    }
    summary
}

pub fn summarize_interactions(records: &[InteractionRecord], recent: usize) -> InteractionSummary {
    let mut sorted: Vec<InteractionRecord> = records.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted.truncate(recent);
    InteractionSummary {
        total: records.len(),
        recent: sorted,
    }
}

/// Read both logs and summarize them.
pub fn load_summaries(
    logger: &CsvLogger,
    recent: usize,
) -> Result<(TaskSummary, InteractionSummary)> {
    let tasks = summarize_tasks(&logger.read_tasks()?);
    let interactions = summarize_interactions(&logger.read_interactions()?, recent);
    Ok((tasks, interactions))
}
