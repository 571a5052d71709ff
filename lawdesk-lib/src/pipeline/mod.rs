//! One-shot pipeline construction
//!
//! Runs the startup phase once, before any query is served:
//!
//! ```text
//! DocumentLoader ──► RecursiveChunker ──► Embedder ──► FlatStore
//!        (or FlatStore::load from a persisted index)
//! ```
//!
//! The result is an immutable [`ChatService`]; nothing writes to the index
//! after [`build`] returns.

use tracing::info;

use crate::chat::ChatService;
use crate::chunk::{Chunker, RecursiveChunker, split_documents};
use crate::embed::Embedder;
use crate::load::DocumentLoader;
use crate::search::SearchEngine;
use crate::store::{FlatStore, INDEX_FILE, VectorStore};
use crate::translate::Translator;
use crate::{Error, Result};

mod config;

pub use config::*;

/// Build the question-answering service described by `config`.
///
/// Restores the index from `config.index_dir` when it holds one; otherwise
/// ingests the corpus and, if `index_dir` is set, saves the index there.
pub fn build<E: Embedder>(
    config: &PipelineConfig,
    embedder: E,
    translator: Box<dyn Translator>,
) -> Result<ChatService<E, FlatStore>> {
    let engine = open_engine(config, embedder)?;
    Ok(ChatService::new(engine, translator)
        .with_top_k(config.top_k)
        .with_pivot_language(config.pivot_language.as_str())
        .with_fallback(config.translation_fallback))
}

/// Restore the persisted index if there is one, otherwise ingest and save.
pub fn open_engine<E: Embedder>(
    config: &PipelineConfig,
    embedder: E,
) -> Result<SearchEngine<E, FlatStore>> {
    config.validate()?;

    if let Some(dir) = &config.index_dir {
        if dir.join(INDEX_FILE).is_file() {
            let store = FlatStore::load(dir)?;
            check_restored(&store, &embedder)?;
            return Ok(SearchEngine::new(embedder, store));
        }
    }

    let engine = ingest(config, embedder)?;
    if let Some(dir) = &config.index_dir {
        engine.store().save(dir)?;
    }
    Ok(engine)
}

/// Load, chunk and embed the corpus into a fresh in-memory index.
///
/// Fails with [`Error::Ingest`] when the corpus yields nothing to index.
pub fn build_index<E: Embedder>(
    config: &PipelineConfig,
    embedder: E,
) -> Result<SearchEngine<E, FlatStore>> {
    config.validate()?;
    ingest(config, embedder)
}

fn ingest<E: Embedder>(config: &PipelineConfig, embedder: E) -> Result<SearchEngine<E, FlatStore>> {
    let documents = DocumentLoader::new(&config.data_dir).load_documents()?;
    let chunker = RecursiveChunker::new(config.chunk_size, config.chunk_overlap)?;
    let chunks = split_documents(&chunker, &documents)?;

    let mut engine = SearchEngine::new(embedder, FlatStore::new());
    let indexed = engine.index(chunks)?;

    info!(
        documents = documents.len(),
        chunks = indexed,
        strategy = chunker.name(),
        "index built"
    );
    Ok(engine)
}

fn check_restored<E: Embedder>(store: &FlatStore, embedder: &E) -> Result<()> {
    if store.is_empty() {
        return Err(Error::Ingest("persisted index is empty".to_string()));
    }
    match store.dimension() {
        Some(width) if width != embedder.dimension() => Err(Error::Store(format!(
            "persisted index has width {width} but {} produces {}",
            embedder.model_name(),
            embedder.dimension()
        ))),
        _ => Ok(()),
    }
}
