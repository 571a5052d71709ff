use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::chat::TranslationFallback;
use crate::{Error, Result};

/// Settings for building the question-answering pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Folder holding the source spreadsheets, CSV and JSON files
    pub data_dir: PathBuf,
    /// Where to persist the index; restored from here when present
    pub index_dir: Option<PathBuf>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per query
    pub top_k: usize,
    pub pivot_language: String,
    pub translation_fallback: TranslationFallback,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            index_dir: None,
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 5,
            pivot_language: "en".to_string(),
            translation_fallback: TranslationFallback::Fail,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Validation("chunk_size must be positive".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::Validation(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(Error::Validation("top_k must be positive".to_string()));
        }
        if self.pivot_language.trim().is_empty() {
            return Err(Error::Validation(
                "pivot_language must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
