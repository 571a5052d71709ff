//! Deterministic stand-ins for the embedding model and translation provider.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use crate::chat::ChatService;
use crate::chunk::{RecursiveChunker, split_documents};
use crate::embed::{Embedder, Embedding};
use crate::load::{LegalDocument, Row};
use crate::search::SearchEngine;
use crate::store::FlatStore;
use crate::translate::Translator;
use crate::{Error, Result};

/// Bag-of-words embedder: each lowercase word is hashed into a bucket and
/// the counts are normalized. Texts sharing words land close together.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn vector(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; self.dimension];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

impl Embedder for HashEmbedder {
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        Ok(self.vector(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "hash"
    }
}

/// Translator that tags translated text with the target language.
///
/// Detects `"ta"` for any text with non-ASCII characters and `"en"`
/// otherwise. Translating into English maps the Tamil sample question to its
/// English form; any other translation prefixes the text with `[target] `.
/// Every `translate` call is recorded.
#[derive(Debug, Default)]
pub struct FakeTranslator {
    failing: bool,
    calls: Mutex<Vec<(String, String)>>,
}

pub const TAMIL_QUERY: &str = "பிரிவு 144 என்றால் என்ன";

impl FakeTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A translator whose provider is unreachable.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// `(text, target)` pairs passed to `translate`, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Translator for FakeTranslator {
    fn detect(&self, text: &str) -> Result<String> {
        if self.failing {
            return Err(Error::Translation("provider unreachable".to_string()));
        }
        Ok(if text.is_ascii() { "en" } else { "ta" }.to_string())
    }

    fn translate(&self, text: &str, target: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), target.to_string()));
        if self.failing {
            return Err(Error::Translation("provider unreachable".to_string()));
        }
        if target == "en" {
            return Ok(if text == TAMIL_QUERY {
                "What is Section 144".to_string()
            } else {
                text.to_string()
            });
        }
        Ok(format!("[{target}] {text}"))
    }
}

/// Shares one translator between a service and the test inspecting it.
impl Translator for std::sync::Arc<FakeTranslator> {
    fn detect(&self, text: &str) -> Result<String> {
        self.as_ref().detect(text)
    }

    fn translate(&self, text: &str, target: &str) -> Result<String> {
        self.as_ref().translate(text, target)
    }
}

pub fn row(pairs: &[(&str, &str)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Three-record corpus with Section 144 as the first record.
pub fn sample_documents() -> Vec<LegalDocument> {
    [
        row(&[
            ("Law Category", "Criminal Law"),
            ("Law Name", "Section 144"),
            ("Law Summary", "Prohibits unlawful assembly"),
            ("Applicability", "Public order emergencies"),
            ("Whom to Approach", "District Magistrate"),
        ]),
        row(&[
            ("Law Category", "Criminal Law"),
            ("Law Name", "Section 379"),
            ("Law Summary", "Punishment for theft of movable property"),
            ("Applicability", "When property is stolen"),
            ("Whom to Approach", "Local police station"),
        ]),
        row(&[
            ("Law Category", "Consumer Law"),
            ("Law Name", "Consumer Protection Act"),
            ("Law Summary", "Remedies for defective goods and deficient services"),
            ("Applicability", "When a seller refuses a refund"),
            ("Whom to Approach", "District Consumer Commission"),
        ]),
    ]
    .iter()
    .map(|r| LegalDocument::from_row(r, "laws.csv"))
    .collect()
}

pub fn sample_engine() -> SearchEngine<HashEmbedder, FlatStore> {
    let chunks = split_documents(&RecursiveChunker::default(), &sample_documents()).unwrap();
    let mut engine = SearchEngine::new(HashEmbedder::new(1024), FlatStore::new());
    engine.index(chunks).unwrap();
    engine
}

pub fn sample_service(
    translator: impl Translator + 'static,
) -> ChatService<HashEmbedder, FlatStore> {
    ChatService::new(sample_engine(), Box::new(translator))
}
