// Document loading: plain text and PDF files, single or scanned from a directory.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, SummarizeError};

const SUPPORTED_EXTS: [&str; 2] = ["txt", "pdf"];
const PREVIEW_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Display name: file name, or `Text Input` for typed text.
    pub name: String,
    pub text: String,
}

impl Document {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            name: "Text Input".to_string(),
            text: text.into(),
        }
    }
}

pub fn load_document(path: &Path) -> Result<Document> {
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let text = match ext {
        "txt" => fs::read_to_string(path)?,
        "pdf" => extract_pdf_text(&fs::read(path)?)?,
        _ => return Err(SummarizeError::UnsupportedFormat(path.display().to_string())),
    };
    debug!(path = %path.display(), chars = text.len(), "document loaded");
    Ok(Document {
        name: path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string()),
        text,
    })
}

/// Per-page text, each page followed by a newline. Pages without text
/// contribute only the newline.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| SummarizeError::Pdf(e.to_string()))?;
    Ok(join_pages(pages))
}

fn join_pages(pages: Vec<String>) -> String {
    pages.into_iter().fold(String::new(), |mut text, page| {
        text.push_str(&page);
        text.push('\n');
        text
    })
}

/// All `.txt` and `.pdf` files under `dir`, sorted by path.
pub fn scan_dir(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| SUPPORTED_EXTS.contains(&ext))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// First 1000 characters, with an ellipsis when the text was cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
