//! Text embedding using local models
//!
//! Uses sentence-transformers/all-MiniLM-L6-v2 via the fastembed crate (ONNX runtime).
//!
//! # Model Details
//!
//! - Dimensions: 384
//! - Max tokens: 256
//! - Deterministic for a fixed model version
//!
//! # Usage
//!
//! ```ignore
//! use lawdesk_lib::embed::{Embedder, MiniLmEmbedder, embed_chunks};
//!
//! let mut embedder = MiniLmEmbedder::new()?;
//!
//! // Embed chunks (for indexing), one vector per chunk in order
//! let embeddings = embed_chunks(&mut embedder, &chunks)?;
//!
//! // Embed query (for searching)
//! let query_embedding = embedder.embed_query("what is section 144")?;
//! ```

use tracing::info;

use crate::chunk::Chunk;
use crate::{Error, Result};

/// A vector embedding - fixed size array of floats
pub type Embedding = Vec<f32>;

/// Trait for text embedding models
pub trait Embedder: Send + Sync {
    /// Embed multiple documents for indexing
    ///
    /// Documents may be batched for efficiency.
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Embed a single query for searching
    fn embed_query(&mut self, text: &str) -> Result<Embedding>;

    /// Returns the embedding dimension
    fn dimension(&self) -> usize;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

/// Embed every chunk's text in one batch.
///
/// Returns one vector per chunk, in chunk order. Fails when the model returns
/// nothing, the wrong number of vectors, or vectors of inconsistent width;
/// the corpus cannot be indexed in any of those cases.
pub fn embed_chunks<E: Embedder + ?Sized>(embedder: &mut E, chunks: &[Chunk]) -> Result<Vec<Embedding>> {
    let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
    let embeddings = embedder.embed_documents(&texts)?;

    if embeddings.is_empty() {
        return Err(Error::Ingest(format!(
            "{} returned no embeddings",
            embedder.model_name()
        )));
    }
    if embeddings.len() != chunks.len() {
        return Err(Error::Ingest(format!(
            "{} returned {} embeddings for {} chunks",
            embedder.model_name(),
            embeddings.len(),
            chunks.len()
        )));
    }
    let width = embeddings[0].len();
    if width == 0 || embeddings.iter().any(|e| e.len() != width) {
        return Err(Error::Ingest(format!(
            "{} returned embeddings of inconsistent width",
            embedder.model_name()
        )));
    }

    info!(
        chunks = chunks.len(),
        dimension = width,
        model = embedder.model_name(),
        "generated embeddings"
    );
    Ok(embeddings)
}

mod minilm;
pub use minilm::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkMetadata;
    use crate::testing::HashEmbedder;

    fn make_chunk(id: &str, content: &str) -> Chunk {
        Chunk {
            id: id.to_string(),
            content: content.to_string(),
            metadata: ChunkMetadata::default(),
        }
    }

    /// Embedder that returns whatever it was told to.
    struct Scripted(Vec<Embedding>);

    impl Embedder for Scripted {
        fn embed_documents(&mut self, _texts: &[&str]) -> Result<Vec<Embedding>> {
            Ok(self.0.clone())
        }

        fn embed_query(&mut self, _text: &str) -> Result<Embedding> {
            Ok(self.0[0].clone())
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    #[test]
    fn test_one_embedding_per_chunk() {
        let mut embedder = HashEmbedder::new(16);
        let chunks = vec![make_chunk("1", "unlawful assembly"), make_chunk("2", "theft")];

        let embeddings = embed_chunks(&mut embedder, &chunks).unwrap();
        assert_eq!(embeddings.len(), 2);
        assert!(embeddings.iter().all(|e| e.len() == 16));
    }

    #[test]
    fn test_embedding_is_deterministic() {
        let mut embedder = HashEmbedder::new(16);
        let chunks = vec![make_chunk("1", "Prohibits unlawful assembly")];

        let first = embed_chunks(&mut embedder, &chunks).unwrap();
        let second = embed_chunks(&mut embedder, &chunks).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_embeddings_is_fatal() {
        let mut embedder = Scripted(vec![]);
        let err = embed_chunks(&mut embedder, &[make_chunk("1", "a")]).unwrap_err();
        assert!(matches!(err, Error::Ingest(_)));
    }

    #[test]
    fn test_count_mismatch_is_fatal() {
        let mut embedder = Scripted(vec![vec![1.0, 0.0]]);
        let chunks = vec![make_chunk("1", "a"), make_chunk("2", "b")];
        let err = embed_chunks(&mut embedder, &chunks).unwrap_err();
        assert!(matches!(err, Error::Ingest(_)));
    }

    #[test]
    fn test_ragged_width_is_fatal() {
        let mut embedder = Scripted(vec![vec![1.0, 0.0], vec![1.0]]);
        let chunks = vec![make_chunk("1", "a"), make_chunk("2", "b")];
        let err = embed_chunks(&mut embedder, &chunks).unwrap_err();
        assert!(matches!(err, Error::Ingest(_)));
    }
}
