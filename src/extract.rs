//! PDF text extraction.
//!
//! Pages are read with `lopdf` so each page keeps its own number. When
//! `lopdf` cannot parse the file, or parses it but finds no text on any
//! page, the whole document is handed to `pdf-extract` as a fallback and
//! returned as a single page.

use std::path::Path;

use thiserror::Error;

/// Why a PDF produced no pages.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}

/// Text of one PDF page. Pages without extractable text have empty `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-based page number.
    pub number: u32,
    pub text: String,
}

/// Read and extract a PDF file.
pub fn extract_pdf_file(path: &Path) -> Result<Vec<PageText>, ExtractError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: path.display().to_string(),
        source,
    })?;
    extract_pdf_pages(&bytes)
}

/// Extract per-page text from PDF bytes.
pub fn extract_pdf_pages(bytes: &[u8]) -> Result<Vec<PageText>, ExtractError> {
    match lopdf_pages(bytes) {
        Ok(pages) if pages.iter().any(|p| !p.text.trim().is_empty()) => Ok(pages),
        Ok(_) => {
            tracing::debug!("lopdf found no text, falling back to pdf-extract");
            whole_document(bytes)
        }
        Err(e) => {
            tracing::debug!(error = %e, "lopdf failed, falling back to pdf-extract");
            whole_document(bytes)
        }
    }
}

fn lopdf_pages(bytes: &[u8]) -> Result<Vec<PageText>, ExtractError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;

    Ok(doc
        .get_pages()
        .keys()
        .map(|&number| PageText {
            number,
            text: doc.extract_text(&[number]).unwrap_or_default(),
        })
        .collect())
}

fn whole_document(bytes: &[u8]) -> Result<Vec<PageText>, ExtractError> {
    let text =
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;
    Ok(vec![PageText { number: 1, text }])
}
