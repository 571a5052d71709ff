//! Document chunking
//!
//! Legal records are short but uneven: some rows carry a one-line summary,
//! others paste whole statutes into the details column. Each record's
//! combined text is split into bounded, overlapping windows so long entries
//! still embed well.
//!
//! # Implementing a Chunker
//!
//! ```ignore
//! use lawdesk_lib::chunk::{Chunk, Chunker};
//! use lawdesk_lib::load::LegalDocument;
//!
//! struct MyChunker { /* ... */ }
//!
//! impl Chunker for MyChunker {
//!     fn chunk(&self, document: &LegalDocument) -> Vec<Chunk> {
//!         // Your chunking logic here
//!         todo!()
//!     }
//!
//!     fn name(&self) -> &str {
//!         "mine"
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::load::LegalDocument;
use crate::{Error, Result};

/// A chunk of text with its metadata
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Chunk {
    /// Identifier derived from the source record and position
    pub id: String,
    /// The text content of this chunk
    pub content: String,
    /// Metadata about the source and position
    pub metadata: ChunkMetadata,
}

/// Metadata associated with a chunk
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct ChunkMetadata {
    /// Copy of the record this chunk was cut from
    pub document: LegalDocument,
    /// Character offset of the chunk within the record's combined text
    pub position: usize,
    /// Total number of chunks cut from the record
    pub total_chunks: usize,
}

/// Trait for document chunking strategies
pub trait Chunker: Send + Sync {
    /// Split a document's combined text into chunks
    ///
    /// Every chunk carries a copy of the document. Returns an empty vector
    /// when the document has no text.
    fn chunk(&self, document: &LegalDocument) -> Vec<Chunk>;

    /// Returns the name of this chunking strategy
    fn name(&self) -> &str;
}

/// Chunk every document, preserving document order.
///
/// Documents that produce no chunks are dropped. Fails when the whole corpus
/// produces none, since there would be nothing to index.
pub fn split_documents<C: Chunker + ?Sized>(chunker: &C, documents: &[LegalDocument]) -> Result<Vec<Chunk>> {
    let chunks: Vec<Chunk> = documents.iter().flat_map(|doc| chunker.chunk(doc)).collect();

    if chunks.is_empty() {
        return Err(Error::Ingest(format!(
            "no chunks produced from {} documents",
            documents.len()
        )));
    }

    info!(
        documents = documents.len(),
        chunks = chunks.len(),
        strategy = chunker.name(),
        "split documents into chunks"
    );
    Ok(chunks)
}

mod recursive;

pub use recursive::*;
