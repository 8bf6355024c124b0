//! Document ingestion.
//!
//! Scans a directory (non-recursively) for PDF files, extracts their text,
//! chunks it, and upserts the chunks into the [`VectorIndex`]. Each file is
//! handled on its own: a file that cannot be read, has no text, or fails to
//! embed is logged and skipped without stopping the run.
//!
//! [`scan_directory`] does the same extraction and chunking without
//! touching the index, for dry runs.
//!
//! Chunk ids are derived from the file name, page, and offset, so
//! ingesting the same file twice overwrites its chunks in place.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use onboarding_core::chunk::chunk_page;
use onboarding_core::models::DocumentChunk;

use crate::config::{Granularity, IngestConfig};
use crate::extract::{extract_pdf_file, ExtractError};
use crate::index::VectorIndex;

/// Counts from one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub files_seen: usize,
    pub files_ingested: usize,
    pub files_skipped: usize,
    pub pages: usize,
    pub chunks: usize,
}

/// The chunks produced from one file.
#[derive(Debug, Clone)]
pub struct FileChunks {
    pub source_file: String,
    pub pages: usize,
    pub chunks: Vec<DocumentChunk>,
}

/// PDF files directly inside `dir`, sorted by name. The extension match
/// is case-insensitive. Entries that cannot be read are skipped.
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read data directory: {}", dir.display()))?;
    Ok(pdf_paths(dir, entries.map(|entry| entry.map(|e| e.path()))))
}

fn pdf_paths(dir: &Path, entries: impl IntoIterator<Item = std::io::Result<PathBuf>>) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    files
}

/// Extract and chunk one PDF according to `config`.
pub fn chunk_file(path: &Path, config: &IngestConfig) -> Result<FileChunks, ExtractError> {
    let source_file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let pages = extract_pdf_file(path)?;
    let page_count = pages.len();

    let chunks = match config.granularity {
        Granularity::Page => pages
            .iter()
            .flat_map(|page| {
                chunk_page(
                    &source_file,
                    page.number,
                    &page.text,
                    config.chunk_size,
                    config.chunk_overlap,
                )
            })
            .collect(),
        Granularity::Document => {
            let text = pages
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            chunk_page(
                &source_file,
                1,
                &text,
                config.chunk_size,
                config.chunk_overlap,
            )
        }
    };

    Ok(FileChunks {
        source_file,
        pages: page_count,
        chunks,
    })
}

/// Extract and chunk every PDF in `dir` without embedding or writing
/// anything. Reports the counts a real run would produce.
pub fn scan_directory(dir: &Path, config: &IngestConfig) -> Result<IngestReport> {
    let files = list_pdfs(dir)?;
    let mut report = IngestReport {
        files_seen: files.len(),
        ..IngestReport::default()
    };

    for path in &files {
        if let Some(file) = prepare(path, config, &mut report) {
            report.record(&file, true);
        }
    }

    Ok(report)
}

impl IngestReport {
    fn record(&mut self, file: &FileChunks, dry_run: bool) {
        tracing::info!(
            file = %file.source_file,
            pages = file.pages,
            chunks = file.chunks.len(),
            dry_run,
            "ingested"
        );
        self.files_ingested += 1;
        self.pages += file.pages;
        self.chunks += file.chunks.len();
    }
}

/// Chunk one file, counting it as skipped when it yields nothing.
fn prepare(path: &Path, config: &IngestConfig, report: &mut IngestReport) -> Option<FileChunks> {
    let file = match chunk_file(path, config) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "skipping unreadable file");
            report.files_skipped += 1;
            return None;
        }
    };

    if file.chunks.is_empty() {
        tracing::warn!(file = %file.source_file, "skipping file with no extractable text");
        report.files_skipped += 1;
        return None;
    }

    Some(file)
}

pub struct Ingestor {
    index: Arc<VectorIndex>,
    config: IngestConfig,
}

impl Ingestor {
    pub fn new(index: Arc<VectorIndex>, config: IngestConfig) -> Self {
        Self { index, config }
    }

    /// Ingest every PDF in `dir` into the index.
    pub async fn ingest(&self, dir: &Path) -> Result<IngestReport> {
        let files = list_pdfs(dir)?;
        let mut report = IngestReport {
            files_seen: files.len(),
            ..IngestReport::default()
        };

        for path in &files {
            let Some(file) = prepare(path, &self.config, &mut report) else {
                continue;
            };

            if let Err(e) = self.store_chunks(&file.chunks).await {
                tracing::warn!(file = %file.source_file, error = %e, "failed to index file");
                report.files_skipped += 1;
                continue;
            }

            report.record(&file, false);
        }

        Ok(report)
    }

    async fn store_chunks(&self, chunks: &[DocumentChunk]) -> Result<()> {
        let ids: Vec<String> = chunks.iter().map(|c| c.id.clone()).collect();
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let metadatas: Vec<_> = chunks.iter().map(DocumentChunk::metadata).collect();
        self.index.upsert(&ids, &texts, &metadatas).await
    }
}
