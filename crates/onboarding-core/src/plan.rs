//! Onboarding plan prompt and line parser.
//!
//! The model is asked for ten lines of the form
//!
//! ```text
//! Day X - [type] - Title of task
//! ```
//!
//! and the reply is parsed line by line. Parsing is deliberately lenient:
//! a line that does not fit is dropped and the rest of the reply is still
//! used, so a plan may contain fewer than ten tasks.
//!
//! The split on `-` is capped at two cuts so hyphens inside a title are
//! kept. A title that itself starts with a bracketed word can still be
//! mistaken for the type; the model's output format is not guaranteed, so
//! no stricter grammar is attempted.

use chrono::{Days, NaiveDate};

use crate::models::{TaskRecord, TaskStatus, TaskType};

/// Number of tasks requested from the model.
pub const PLAN_LENGTH: usize = 10;

/// Title used when a line carries no title part.
pub const DEFAULT_TITLE: &str = "Task";

/// One successfully parsed plan line, before ids and dates are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanLine {
    pub day: u32,
    pub task_type: TaskType,
    pub title: String,
}

/// Build the planning prompt for a new hire.
pub fn build_plan_prompt(user_name: &str, role: &str, start_date: NaiveDate) -> String {
    let types = TaskType::ALL
        .iter()
        .map(|t| format!("\"{}\"", t))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are an onboarding coordinator.

Create a simple {n}-day (2-week work days) onboarding plan for a new hire.

New hire name: {user_name}
Role: {role}
Start date: {start}

Return exactly {n} tasks, one per line, in this exact format:
Day X - [type] - Title of task

Where:
- type is one of: {types}.
- Day 1 means the first working day ({start}), Day {n} is day {n}.

Do NOT add explanations, only the {n} lines.",
        n = PLAN_LENGTH,
        user_name = user_name,
        role = role,
        start = start_date.format("%Y-%m-%d"),
        types = types,
    )
}

/// Parse a single line of model output.
///
/// Returns `None` for blank lines, lines that do not start with "day"
/// (case-insensitive, after an optional `-` or `*` bullet), and lines
/// whose day is not a positive integer.
pub fn parse_plan_line(raw: &str) -> Option<PlanLine> {
    let mut line = raw.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(rest) = line.strip_prefix('-').or_else(|| line.strip_prefix('*')) {
        line = rest.trim();
    }

    if !line.to_lowercase().starts_with("day") {
        return None;
    }

    let parts: Vec<&str> = line.splitn(3, '-').map(str::trim).collect();

    let day: u32 = parts[0]
        .to_lowercase()
        .replace("day", "")
        .trim()
        .parse()
        .ok()?;
    if day == 0 {
        return None;
    }

    let task_type = parts
        .get(1)
        .map(|p| TaskType::from_label(p.trim_matches(|c| c == '[' || c == ']')))
        .unwrap_or(TaskType::Other);

    let title = parts
        .get(2)
        .map(|p| p.to_string())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    Some(PlanLine {
        day,
        task_type,
        title,
    })
}

/// Parse a full model reply into task records.
///
/// Task ids are `T1`, `T2`, … counted over accepted lines only. The due
/// date is `start_date + (day - 1)` days, so day 1 is the start date.
pub fn parse_plan(reply: &str, start_date: NaiveDate) -> Vec<TaskRecord> {
    let mut tasks = Vec::new();

    for raw in reply.lines() {
        let Some(line) = parse_plan_line(raw) else {
            if !raw.trim().is_empty() {
                tracing::debug!(line = raw.trim(), "dropping unparseable plan line");
            }
            continue;
        };

        let Some(due_date) = start_date.checked_add_days(Days::new(u64::from(line.day - 1)))
        else {
            tracing::debug!(day = line.day, "dropping plan line with out-of-range day");
            continue;
        };

        tasks.push(TaskRecord {
            task_id: format!("T{}", tasks.len() + 1),
            title: line.title,
            task_type: line.task_type,
            day: line.day,
            due_date,
            status: TaskStatus::Pending,
        });
    }

    tasks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn parses_well_formed_line() {
        let line = parse_plan_line("Day 3 - [training] - Security awareness session").unwrap();
        assert_eq!(line.day, 3);
        assert_eq!(line.task_type, TaskType::Training);
        assert_eq!(line.title, "Security awareness session");
    }

    #[test]
    fn well_formed_line_gets_due_date_and_status() {
        let tasks = parse_plan(
            "Day 3 - [training] - Security awareness session",
            date("2024-01-01"),
        );
        assert_eq!(tasks.len(), 1);
        let t = &tasks[0];
        assert_eq!(t.task_id, "T1");
        assert_eq!(t.day, 3);
        assert_eq!(t.task_type, TaskType::Training);
        assert_eq!(t.title, "Security awareness session");
        assert_eq!(t.due_date, date("2024-01-03"));
        assert_eq!(t.status, TaskStatus::Pending);
    }

    #[test]
    fn hyphens_in_title_are_preserved() {
        let line = parse_plan_line("Day 2 - [tools] - Set up single-sign-on - Okta").unwrap();
        assert_eq!(line.title, "Set up single-sign-on - Okta");
        assert_eq!(line.task_type, TaskType::Tools);
    }

    #[test]
    fn bullet_markers_are_stripped() {
        assert_eq!(parse_plan_line("- Day 1 - [form] - Sign NDA").unwrap().day, 1);
        assert_eq!(parse_plan_line("* Day 4 - [meeting] - 1:1").unwrap().day, 4);
        assert_eq!(parse_plan_line("  -Day 5 - [other] - Lunch").unwrap().day, 5);
    }

    #[test]
    fn day_prefix_is_case_insensitive() {
        let line = parse_plan_line("DAY 7 - [Meeting] - Team retro").unwrap();
        assert_eq!(line.day, 7);
        assert_eq!(line.task_type, TaskType::Meeting);
    }

    #[test]
    fn missing_parts_fall_back_to_defaults() {
        let only_day = parse_plan_line("Day 6").unwrap();
        assert_eq!(only_day.task_type, TaskType::Other);
        assert_eq!(only_day.title, DEFAULT_TITLE);

        let no_title = parse_plan_line("Day 6 - [form]").unwrap();
        assert_eq!(no_title.task_type, TaskType::Form);
        assert_eq!(no_title.title, DEFAULT_TITLE);
    }

    #[test]
    fn unknown_type_becomes_other() {
        let line = parse_plan_line("Day 2 - [social] - Coffee with buddy").unwrap();
        assert_eq!(line.task_type, TaskType::Other);
        assert_eq!(line.title, "Coffee with buddy");
    }

    #[test]
    fn malformed_lines_are_rejected() {
        for bad in [
            "",
            "   ",
            "Day X - [tools] - Set up laptop",
            "Day - [tools] - Set up laptop",
            "Day 0 - [form] - Nothing",
            "Days 3 - [form] - Plural",
            "Day 3: [form] - Colon",
            "1. Day 1 - [form] - Numbered",
            "Here is your plan:",
            "**Day 1** - [form] - Bold",
            "Week 1 - [form] - Wrong unit",
        ] {
            assert!(parse_plan_line(bad).is_none(), "accepted: {:?}", bad);
        }
    }

    #[test]
    fn ten_valid_lines_give_ten_tasks() {
        let reply = (1..=10)
            .map(|d| format!("Day {} - [meeting] - Sync number {}", d, d))
            .collect::<Vec<_>>()
            .join("\n");
        let start = date("2024-02-26");
        let tasks = parse_plan(&reply, start);

        assert_eq!(tasks.len(), 10);
        for (i, t) in tasks.iter().enumerate() {
            let day = i as u32 + 1;
            assert_eq!(t.day, day);
            assert_eq!(t.task_id, format!("T{}", day));
            assert_eq!(t.due_date, start + chrono::Duration::days(i as i64));
        }
        // Crosses the leap day.
        assert_eq!(tasks[3].due_date, date("2024-02-29"));
    }

    #[test]
    fn dropped_line_does_not_leave_id_gap() {
        let reply = "Day 1 - [form] - Sign contract\n\
                     Day X - [tools] - Set up laptop\n\
                     Day 3 - [training] - Security training";
        let tasks = parse_plan(reply, date("2024-01-01"));
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].task_id, "T1");
        assert_eq!(tasks[1].task_id, "T2");
        assert_eq!(tasks[1].day, 3);
    }

    #[test]
    fn empty_reply_gives_empty_plan() {
        assert!(parse_plan("", date("2024-01-01")).is_empty());
        assert!(parse_plan("  \n\t\n ", date("2024-01-01")).is_empty());
    }

    #[test]
    fn chatter_around_the_list_is_ignored() {
        let reply = "Sure! Here is the plan:\n\n\
                     - Day 1 - [form] - HR paperwork\n\
                     - Day 2 - [tools] - Laptop setup\n\n\
                     Let me know if you need changes.";
        let tasks = parse_plan(reply, date("2024-05-06"));
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].title, "Laptop setup");
        assert_eq!(tasks[1].due_date, date("2024-05-07"));
    }

    #[test]
    fn prompt_names_the_hire_and_format() {
        let prompt = build_plan_prompt("Ada", "Backend Developer", date("2024-01-08"));
        assert!(prompt.contains("New hire name: Ada"));
        assert!(prompt.contains("Role: Backend Developer"));
        assert!(prompt.contains("Start date: 2024-01-08"));
        assert!(prompt.contains("Day X - [type] - Title of task"));
        assert!(prompt.contains("\"form\", \"training\", \"meeting\", \"tools\", \"other\""));
        assert!(prompt.contains("exactly 10"));
    }
}
