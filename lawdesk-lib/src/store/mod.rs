//! Vector storage
//!
//! # Storage Model
//!
//! Each stored item consists of:
//! - Chunk: the original text and metadata
//! - Embedding: the vector representation
//!
//! Items are append-only and addressed by insertion order: entry `i` of the
//! index is the embedding of chunk `i`. There is no update or delete.
//!
//! # Usage
//!
//! ```ignore
//! use lawdesk_lib::store::{FlatStore, VectorStore};
//!
//! let mut store = FlatStore::new();
//!
//! // Insert chunks with their embeddings
//! store.add_documents(chunks, embeddings)?;
//!
//! // Search by L2 distance
//! let results = store.search(&query_embedding, 5)?;
//!
//! // Persist and restore
//! store.save("index".as_ref())?;
//! let store = FlatStore::load("index".as_ref())?;
//! ```

use crate::Result;
use crate::chunk::Chunk;
use crate::embed::Embedding;

/// A search result with its distance to the query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// The matched chunk
    pub chunk: Chunk,
    /// Squared Euclidean distance to the query (lower is more similar).
    /// Always non-negative and not normalized.
    pub distance: f32,
}

/// Trait for vector storage backends
pub trait VectorStore: Send + Sync {
    /// Append chunks with their embeddings
    ///
    /// # Arguments
    /// * `chunks` - The text chunks to store
    /// * `embeddings` - Corresponding embeddings, paired by position
    ///
    /// The batch is validated as a whole; on error nothing is stored.
    fn add_documents(&mut self, chunks: Vec<Chunk>, embeddings: Vec<Embedding>) -> Result<()>;

    /// Search for the nearest chunks
    ///
    /// # Arguments
    /// * `query_embedding` - The query vector
    /// * `k` - Maximum number of results to return
    ///
    /// # Returns
    /// Up to `k` results sorted by distance (nearest first)
    fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<SearchResult>>;

    /// Get total number of stored chunks
    fn len(&self) -> usize;

    /// Check if store is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Width of the stored vectors, once the first batch has been added
    fn dimension(&self) -> Option<usize>;
}

mod flat;

pub use flat::*;
