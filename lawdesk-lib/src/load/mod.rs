//! Source data ingestion
//!
//! Reads every supported file in a data folder and normalizes each row into a
//! [`LegalDocument`]. Source files use a variety of header spellings; each
//! canonical field is resolved through an ordered list of accepted headers
//! (see [`fields`]).
//!
//! # Usage
//!
//! ```ignore
//! use lawdesk_lib::load::DocumentLoader;
//!
//! let documents = DocumentLoader::new("data").load_documents()?;
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{Error, Result};

pub mod fields;
mod sources;

pub use fields::{NOT_AVAILABLE, resolve_field};
pub use sources::SourceFormat;

/// One parsed source row, keyed by trimmed header name.
pub type Row = HashMap<String, String>;

/// Normalized legal knowledge base entry
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct LegalDocument {
    pub law_category: String,
    pub law_name: String,
    pub summary: String,
    pub details: String,
    pub when_applicable: String,
    pub whom_to_approach: String,
    pub historical_context: String,
    pub example_cases: String,
    /// Labeled concatenation of the fields above, used for chunking
    pub combined_text: String,
    /// File the row was read from
    #[serde(default)]
    pub source: String,
}

impl LegalDocument {
    /// Normalize a source row into a document.
    #[must_use]
    pub fn from_row(row: &Row, source: &str) -> Self {
        let mut doc = Self {
            law_category: fields::LAW_CATEGORY.resolve(row),
            law_name: fields::LAW_NAME.resolve(row),
            summary: fields::SUMMARY.resolve(row),
            details: fields::DETAILS.resolve(row),
            when_applicable: fields::WHEN_APPLICABLE.resolve(row),
            whom_to_approach: fields::WHOM_TO_APPROACH.resolve(row),
            historical_context: fields::HISTORICAL_CONTEXT.resolve(row),
            example_cases: fields::EXAMPLE_CASES.resolve(row),
            combined_text: String::new(),
            source: source.to_owned(),
        };
        doc.combined_text = doc.labeled_fields().join("\n");
        doc
    }

    fn labeled_fields(&self) -> [String; 8] {
        [
            format!("Category: {}", self.law_category),
            format!("Law: {}", self.law_name),
            format!("Details: {}", self.details),
            format!("Summary: {}", self.summary),
            format!("When Applicable: {}", self.when_applicable),
            format!("Whom to Approach: {}", self.whom_to_approach),
            format!("Historical Context: {}", self.historical_context),
            format!("Examples: {}", self.example_cases),
        ]
    }
}

/// Loads every supported source file in a folder.
///
/// Files are read in lexicographic name order and rows keep their file order,
/// so the output is stable across platforms. A file that cannot be parsed is
/// logged and skipped; an empty or missing folder is an error.
pub struct DocumentLoader {
    folder: PathBuf,
}

impl DocumentLoader {
    #[must_use]
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Load and normalize all rows from the folder.
    pub fn load_documents(&self) -> Result<Vec<LegalDocument>> {
        info!(folder = %self.folder.display(), "loading documents");

        let files = self.source_files()?;
        if files.is_empty() {
            return Err(Error::Ingest(format!(
                "no supported source files in {}",
                self.folder.display()
            )));
        }

        let mut documents = Vec::new();
        for (path, format) in &files {
            let name = sources::display_name(path);
            let rows = match sources::read_rows(path, *format) {
                Ok(rows) => rows,
                Err(err) => {
                    error!(file = %name, error = %err, "skipping unreadable source file");
                    continue;
                }
            };

            let before = documents.len();
            documents.extend(
                rows.iter()
                    .filter(|row| row.values().any(|v| !v.trim().is_empty()))
                    .map(|row| LegalDocument::from_row(row, &name)),
            );
            debug!(file = %name, rows = documents.len() - before, "parsed source file");
        }

        if documents.is_empty() {
            return Err(Error::Ingest(format!(
                "no rows could be loaded from {}",
                self.folder.display()
            )));
        }

        info!(documents = documents.len(), files = files.len(), "loaded documents");
        Ok(documents)
    }

    fn source_files(&self) -> Result<Vec<(PathBuf, SourceFormat)>> {
        if !self.folder.is_dir() {
            return Err(Error::Ingest(format!(
                "source folder {} does not exist",
                self.folder.display()
            )));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.folder)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            match SourceFormat::from_path(&path) {
                Some(format) => files.push((path, format)),
                None => debug!(file = %path.display(), "ignoring unsupported file"),
            }
        }
        files.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));

        Ok(files)
    }
}
