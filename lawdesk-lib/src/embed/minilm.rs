use std::path::PathBuf;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::embed::{Embedder, Embedding};
use crate::{Error, Result};

/// MiniLM embedder using sentence-transformers/all-MiniLM-L6-v2.
///
/// Uses fastembed for ONNX-based inference. This model produces 384-dimensional
/// embeddings and does not use a query prompt prefix, so queries and chunks are
/// embedded the same way.
pub struct MiniLmEmbedder {
    model: TextEmbedding,
}

impl MiniLmEmbedder {
    /// Create a new MiniLM embedder using fastembed's default model cache.
    ///
    /// Downloads the model on first use (~90MB).
    pub fn new() -> Result<Self> {
        Self::with_cache_dir(None)
    }

    /// Create a new MiniLM embedder, keeping model files in `cache_dir` if given.
    pub fn with_cache_dir(cache_dir: Option<PathBuf>) -> Result<Self> {
        let mut opts = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
            .with_show_download_progress(true);
        if let Some(dir) = cache_dir {
            opts = opts.with_cache_dir(dir);
        }

        TextEmbedding::try_new(opts)
            .map(|model| Self { model })
            .map_err(|e| Error::Embedding(e.to_string()))
    }
}

impl Embedder for MiniLmEmbedder {
    fn model_name(&self) -> &str {
        "sentence-transformers/all-MiniLM-L6-v2"
    }

    fn dimension(&self) -> usize {
        384
    }

    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        self.model
            .embed(texts, None)
            .map_err(|e| Error::Embedding(e.to_string()))
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        self.model
            .embed(&[text], None)
            .map_err(|e| Error::Embedding(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("model returned no embeddings".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l2(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
    }

    #[test]
    #[ignore] // Requires model download, run with: cargo test -- --ignored
    fn test_dimension_and_determinism() {
        let mut embedder = MiniLmEmbedder::new().unwrap();

        let first = embedder.embed_query("Prohibits unlawful assembly").unwrap();
        let second = embedder.embed_query("Prohibits unlawful assembly").unwrap();

        assert_eq!(first.len(), embedder.dimension());
        assert_eq!(first, second);
    }

    #[test]
    #[ignore] // Requires model download
    fn test_similar_texts_are_closer() {
        let mut embedder = MiniLmEmbedder::new().unwrap();

        let query = embedder.embed_query("ban on public gatherings").unwrap();
        let docs = embedder
            .embed_documents(&[
                "Section 144 prohibits the assembly of five or more people.",
                "The recipe calls for two cups of flour.",
            ])
            .unwrap();

        assert!(l2(&query, &docs[0]) < l2(&query, &docs[1]));
    }
}
