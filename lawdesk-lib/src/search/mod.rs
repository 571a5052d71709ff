//! High-level search interface
//!
//! Combines embedder and store into a unified search API.
//!
//! # Usage
//!
//! ```ignore
//! use lawdesk_lib::search::SearchEngine;
//!
//! let mut engine = SearchEngine::new(embedder, store);
//! engine.index(chunks)?;
//! let results = engine.retrieve_documents("what is section 144", 5)?;
//! ```
//!
//! Indexing needs `&mut self` and happens once, before the engine is shared.
//! Retrieval only needs `&self`: the store is read-only from then on, and the
//! embedder (whose inference takes `&mut self`) sits behind a mutex, so
//! concurrent queries are serialized at the embedding step.

use std::sync::Mutex;

use crate::chunk::Chunk;
use crate::embed::{Embedder, embed_chunks};
use crate::store::{SearchResult, VectorStore};
use crate::{Error, Result};

/// High-level search engine combining embedding and storage.
pub struct SearchEngine<E: Embedder, S: VectorStore> {
    embedder: Mutex<E>,
    store: S,
}

impl<E: Embedder, S: VectorStore> SearchEngine<E, S> {
    /// Create a new search engine.
    #[must_use]
    pub fn new(embedder: E, store: S) -> Self {
        Self {
            embedder: Mutex::new(embedder),
            store,
        }
    }

    /// Index chunks by computing embeddings and storing them.
    ///
    /// Returns the number of chunks added.
    pub fn index(&mut self, chunks: Vec<Chunk>) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let embedder = self.embedder.get_mut().map_err(|_| poisoned())?;
        let embeddings = embed_chunks(embedder, &chunks)?;
        let count = chunks.len();
        self.store.add_documents(chunks, embeddings)?;

        Ok(count)
    }

    /// Embed the query and return up to `k` nearest chunks, nearest first.
    pub fn retrieve_documents(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let query_embedding = {
            let mut embedder = self.embedder.lock().map_err(|_| poisoned())?;
            embedder.embed_query(query)?
        };
        self.store.search(&query_embedding, k)
    }

    /// Returns the number of indexed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if no chunks are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns a reference to the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}

fn poisoned() -> Error {
    Error::Embedding("embedder lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkMetadata;
    use crate::store::FlatStore;
    use crate::testing::HashEmbedder;

    fn make_chunk(id: &str, content: &str) -> Chunk {
        Chunk {
            id: id.to_string(),
            content: content.to_string(),
            metadata: ChunkMetadata::default(),
        }
    }

    fn engine() -> SearchEngine<HashEmbedder, FlatStore> {
        let mut engine = SearchEngine::new(HashEmbedder::new(64), FlatStore::new());
        let added = engine
            .index(vec![
                make_chunk("assembly", "Section 144 prohibits unlawful assembly in public places"),
                make_chunk("theft", "Section 379 punishment for theft of movable property"),
                make_chunk("murder", "Section 302 punishment for murder"),
            ])
            .unwrap();
        assert_eq!(added, 3);
        engine
    }

    #[test]
    fn test_index_grows_store() {
        let engine = engine();
        assert_eq!(engine.len(), 3);
        assert!(!engine.is_empty());
        assert_eq!(engine.store().dimension(), Some(64));
    }

    #[test]
    fn test_index_empty_is_noop() {
        let mut engine = SearchEngine::new(HashEmbedder::new(8), FlatStore::new());
        assert_eq!(engine.index(Vec::new()).unwrap(), 0);
        assert!(engine.is_empty());
    }

    #[test]
    fn test_retrieve_finds_relevant_chunk_first() {
        let engine = engine();
        let results = engine
            .retrieve_documents("unlawful assembly in public", 2)
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.id, "assembly");
        assert!(results[0].distance <= results[1].distance);
    }

    #[test]
    fn test_retrieve_is_repeatable() {
        let engine = engine();
        let first = engine.retrieve_documents("punishment for theft", 3).unwrap();
        let second = engine.retrieve_documents("punishment for theft", 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_retrieve_on_empty_index() {
        let engine = SearchEngine::new(HashEmbedder::new(8), FlatStore::new());
        assert!(engine.retrieve_documents("anything", 5).unwrap().is_empty());
    }
}
