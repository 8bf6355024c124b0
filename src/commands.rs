//! CLI command implementations.
//!
//! Each function runs one `onboard` subcommand and prints its result to
//! stdout. Diagnostics go through `tracing` to stderr.

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;

use crate::analytics::load_summaries;
use crate::answer::AnswerOutcome;
use crate::config::Config;
use crate::copilot::Copilot;
use crate::ingest::{scan_directory, IngestReport};
use crate::logger::CsvLogger;
use crate::sqlite_store::SqliteStore;

/// `onboard init`: create the index schema and the log files.
pub async fn run_init(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    store.pool().close().await;
    CsvLogger::from_config(&config.logs).init()?;

    println!("Index initialized at {}", config.index.db_path().display());
    println!("Logs ready in {}", config.logs.dir.display());
    Ok(())
}

/// `onboard ingest --dry-run`: chunk without embedding or writing.
pub fn run_ingest_dry_run(config: &Config, dir: Option<&Path>) -> Result<()> {
    let dir = dir.unwrap_or(config.ingest.data_dir.as_path());
    let report = scan_directory(dir, &config.ingest)?;
    print_report(dir, &report, true);
    Ok(())
}

/// `onboard ingest`
pub async fn run_ingest(copilot: &Copilot, dir: Option<&Path>) -> Result<()> {
    let dir = dir.unwrap_or(copilot.config().ingest.data_dir.as_path());
    let report = copilot.ingest(Some(dir)).await?;
    print_report(dir, &report, false);
    if report.files_ingested > 0 {
        println!(
            "  index total: {} chunks",
            copilot.index().count(None).await?
        );
    }
    Ok(())
}

fn print_report(dir: &Path, report: &IngestReport, dry_run: bool) {
    if dry_run {
        println!("ingest {} (dry-run)", dir.display());
    } else {
        println!("ingest {}", dir.display());
    }
    println!("  files found: {}", report.files_seen);
    println!("  files ingested: {}", report.files_ingested);
    println!("  files skipped: {}", report.files_skipped);
    println!("  pages: {}", report.pages);
    println!("  chunks: {}", report.chunks);
    if report.files_seen == 0 {
        println!("No PDF files found.");
    } else {
        println!("ok");
    }
}

/// `onboard search`: show what the retriever would hand to the model.
pub async fn run_search(copilot: &Copilot, query: &str, k: Option<usize>) -> Result<()> {
    let k = k.unwrap_or(copilot.retriever().top_k());
    let hits = copilot.index().query_scored(query, k).await?;

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        let source = hit.metadata.get("source").map(String::as_str).unwrap_or("?");
        let page = hit.metadata.get("page").map(String::as_str).unwrap_or("?");
        println!("{}. [{:.4}] {} (page {})", i + 1, hit.score, source, page);
        println!("   {}", snippet(&hit.text, 240));
    }
    Ok(())
}

fn snippet(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{}...", cut)
}

/// `onboard ask`
pub async fn run_ask(
    copilot: &Copilot,
    question: &str,
    user_name: Option<&str>,
    role: Option<&str>,
) -> Result<()> {
    let answer = copilot.ask(question, user_name, role).await;
    println!("{}", answer.text.trim_end());

    match answer.outcome {
        AnswerOutcome::Grounded => {}
        AnswerOutcome::NoContext => {
            println!();
            println!("(No indexed document matched this question. Has `onboard ingest` been run?)");
        }
        AnswerOutcome::Fallback => {
            tracing::warn!("no answer could be generated");
        }
    }
    Ok(())
}

/// `onboard plan`
pub async fn run_plan(
    copilot: &Copilot,
    user_name: &str,
    role: &str,
    start_date: NaiveDate,
) -> Result<()> {
    let tasks = copilot.plan(user_name, role, start_date).await?;

    if tasks.is_empty() {
        tracing::warn!("could not parse any tasks from the model response");
        println!("No tasks generated. Try again.");
        return Ok(());
    }

    println!(
        "Onboarding plan for {} ({}), starting {}",
        user_name, role, start_date
    );
    for task in &tasks {
        println!(
            "  {:<4} day {:>2}  {}  {:<9} {}",
            task.task_id,
            task.day,
            task.due_date,
            format!("[{}]", task.task_type),
            task.title
        );
    }
    println!(
        "Saved {} tasks to {}",
        tasks.len(),
        copilot.logger().tasks_path().display()
    );
    Ok(())
}

/// `onboard stats`
pub fn run_stats(config: &Config, recent: usize) -> Result<()> {
    let logger = CsvLogger::from_config(&config.logs);
    let (tasks, interactions) = load_summaries(&logger, recent)?;

    println!("Tasks");
    if tasks.total == 0 {
        println!("  No tasks generated yet.");
    } else {
        println!("  total: {}", tasks.total);
        println!("  pending: {}", tasks.pending);
        println!("  done: {}", tasks.done);
        for (task_type, count) in &tasks.by_type {
            println!("  {}: {}", task_type, count);
        }
    }

    println!("Questions");
    if interactions.total == 0 {
        println!("  No questions logged yet.");
    } else {
        println!("  total: {}", interactions.total);
        for record in &interactions.recent {
            println!(
                "  {}  {} ({}): {}",
                record.timestamp.format("%Y-%m-%d %H:%M"),
                record.user_name,
                record.role,
                snippet(&record.question, 80)
            );
        }
    }
    Ok(())
}
