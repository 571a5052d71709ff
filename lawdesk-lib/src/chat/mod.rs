//! Query answering
//!
//! One query flows through:
//!
//! ```text
//! query ──► detect ──► translate to pivot ──► retrieve top-k ──► AnswerDraft
//!                                                                     │
//!                          ChatResponse ◄── translate to target ◄─────┘
//! ```
//!
//! Retrieval and answer composition happen in the pivot language. Law names
//! and the answer lead are never sent for translation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::embed::Embedder;
use crate::search::SearchEngine;
use crate::store::VectorStore;
use crate::translate::{Translator, same_language};
use crate::{Error, Result};

mod answer;

pub use answer::*;

/// What to do when the translation provider fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationFallback {
    /// Propagate the error; the request fails
    #[default]
    Fail,
    /// Log a warning and continue in the pivot language
    Pivot,
}

impl FromStr for TranslationFallback {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "pivot" => Ok(Self::Pivot),
            other => Err(Error::Validation(format!(
                "unknown translation fallback '{other}', expected 'fail' or 'pivot'"
            ))),
        }
    }
}

impl fmt::Display for TranslationFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fail => "fail",
            Self::Pivot => "pivot",
        })
    }
}

/// Answers legal questions over an indexed corpus.
///
/// Read-only once built; share it behind an `Arc`.
pub struct ChatService<E: Embedder, S: VectorStore> {
    engine: SearchEngine<E, S>,
    translator: Box<dyn Translator>,
    top_k: usize,
    pivot: String,
    fallback: TranslationFallback,
}

impl<E: Embedder, S: VectorStore> ChatService<E, S> {
    pub const DEFAULT_TOP_K: usize = 5;
    pub const DEFAULT_PIVOT: &'static str = "en";

    #[must_use]
    pub fn new(engine: SearchEngine<E, S>, translator: Box<dyn Translator>) -> Self {
        Self {
            engine,
            translator,
            top_k: Self::DEFAULT_TOP_K,
            pivot: Self::DEFAULT_PIVOT.to_string(),
            fallback: TranslationFallback::default(),
        }
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    #[must_use]
    pub fn with_pivot_language(mut self, pivot: impl Into<String>) -> Self {
        self.pivot = pivot.into();
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: TranslationFallback) -> Self {
        self.fallback = fallback;
        self
    }

    #[must_use]
    pub fn engine(&self) -> &SearchEngine<E, S> {
        &self.engine
    }

    #[must_use]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    #[must_use]
    pub fn pivot_language(&self) -> &str {
        &self.pivot
    }

    /// Answer `query` in `language`.
    ///
    /// A blank `language` means the pivot language. Fails with
    /// [`Error::Validation`] for a blank query.
    pub fn process_query(&self, query: &str, language: &str) -> Result<ChatResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::Validation("Query is required".to_string()));
        }
        let target = match language.trim() {
            "" => self.pivot.as_str(),
            code => code,
        };

        let pivot_query = self.to_pivot(query)?;
        let results = self.engine.retrieve_documents(&pivot_query, self.top_k)?;
        debug!(results = results.len(), "retrieved chunks");

        let mut draft = AnswerDraft::from_results(&results);
        if !same_language(target, &self.pivot) {
            let mut translated = draft.clone();
            match translated.translate(self.translator.as_ref(), target) {
                Ok(calls) => {
                    debug!(target, calls, "translated answer");
                    draft = translated;
                }
                Err(err) if self.fallback == TranslationFallback::Pivot => {
                    warn!(target, error = %err, "answer translation failed, replying in pivot language");
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            language = target,
            references = draft.references.len(),
            "answered query"
        );
        Ok(draft.into_response())
    }

    /// The query in the pivot language, translated when needed.
    fn to_pivot(&self, query: &str) -> Result<String> {
        let converted = self.translator.detect(query).and_then(|detected| {
            if same_language(&detected, &self.pivot) {
                Ok(query.to_owned())
            } else {
                debug!(detected, pivot = %self.pivot, "translating query");
                self.translator.translate(query, &self.pivot)
            }
        });

        match converted {
            Ok(text) => Ok(text),
            Err(err) if self.fallback == TranslationFallback::Pivot => {
                warn!(error = %err, "query translation failed, searching with original text");
                Ok(query.to_owned())
            }
            Err(err) => Err(err),
        }
    }
}
