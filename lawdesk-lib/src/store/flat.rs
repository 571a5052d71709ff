use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chunk::Chunk;
use crate::embed::Embedding;
use crate::store::{SearchResult, VectorStore};
use crate::{Error, Result};

/// Version written into both persisted artifacts.
pub const FORMAT_VERSION: u32 = 1;
/// File holding the vectors.
pub const INDEX_FILE: &str = "index.json";
/// File holding the chunk records, in index order.
pub const CHUNKS_FILE: &str = "chunks.json";

/// Exact (flat) L2 index with a parallel chunk array.
///
/// Vectors are kept row-major in one buffer. Search compares the query with
/// every stored vector, which is fine for a knowledge base of a few thousand
/// chunks.
#[derive(Debug, Default)]
pub struct FlatStore {
    dimension: Option<usize>,
    vectors: Vec<f32>,
    chunks: Vec<Chunk>,
}

impl FlatStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored chunks in index order.
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    fn validate(&self, chunks: &[Chunk], embeddings: &[Embedding]) -> Result<usize> {
        let Some(first) = embeddings.first() else {
            return Err(Error::InvalidEmbeddings("batch is empty".into()));
        };
        if embeddings.len() != chunks.len() {
            return Err(Error::InvalidEmbeddings(format!(
                "{} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }
        let width = first.len();
        if width == 0 {
            return Err(Error::InvalidEmbeddings("embeddings have zero width".into()));
        }
        if embeddings.iter().any(|e| e.len() != width) {
            return Err(Error::InvalidEmbeddings("embeddings have differing widths".into()));
        }
        if let Some(dimension) = self.dimension {
            if width != dimension {
                return Err(Error::InvalidEmbeddings(format!(
                    "expected width {dimension}, got {width}"
                )));
            }
        }
        Ok(width)
    }

    /// Write `index.json` and `chunks.json` into `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        let dimension = self.dimension.unwrap_or(0);

        let index = IndexOut {
            version: FORMAT_VERSION,
            dimension,
            count: self.len(),
            vectors: if dimension == 0 {
                Vec::new()
            } else {
                self.vectors.chunks_exact(dimension).collect()
            },
        };
        let chunks = ChunksOut {
            version: FORMAT_VERSION,
            count: self.chunks.len(),
            chunks: &self.chunks,
        };

        write_json(&dir.join(INDEX_FILE), &index)?;
        write_json(&dir.join(CHUNKS_FILE), &chunks)?;

        info!(dir = %dir.display(), chunks = self.len(), "saved vector store");
        Ok(())
    }

    /// Restore a store written by [`save`](Self::save).
    ///
    /// Both artifacts must carry the current format version, agree with their
    /// own declared counts, and hold the same number of entries.
    pub fn load(dir: &Path) -> Result<Self> {
        let index: IndexIn = read_json(&dir.join(INDEX_FILE))?;
        let chunks: ChunksIn = read_json(&dir.join(CHUNKS_FILE))?;

        for (name, version) in [(INDEX_FILE, index.version), (CHUNKS_FILE, chunks.version)] {
            if version != FORMAT_VERSION {
                return Err(Error::Store(format!(
                    "{name} has format version {version}, expected {FORMAT_VERSION}"
                )));
            }
        }
        if index.vectors.len() != index.count {
            return Err(Error::Store(format!(
                "{INDEX_FILE} declares {} vectors but holds {}",
                index.count,
                index.vectors.len()
            )));
        }
        if chunks.chunks.len() != chunks.count {
            return Err(Error::Store(format!(
                "{CHUNKS_FILE} declares {} chunks but holds {}",
                chunks.count,
                chunks.chunks.len()
            )));
        }
        if index.count != chunks.count {
            return Err(Error::Store(format!(
                "index holds {} vectors but chunk file holds {} chunks",
                index.count, chunks.count
            )));
        }
        if index.count > 0 && index.dimension == 0 {
            return Err(Error::Store(format!(
                "{INDEX_FILE} holds {} vectors of zero width",
                index.count
            )));
        }
        if index.vectors.iter().any(|v| v.len() != index.dimension) {
            return Err(Error::Store(format!(
                "{INDEX_FILE} holds vectors that are not {} wide",
                index.dimension
            )));
        }

        let store = Self {
            dimension: (index.count > 0).then_some(index.dimension),
            vectors: index.vectors.into_iter().flatten().collect(),
            chunks: chunks.chunks,
        };
        info!(dir = %dir.display(), chunks = store.len(), "loaded vector store");
        Ok(store)
    }
}

impl VectorStore for FlatStore {
    fn add_documents(&mut self, chunks: Vec<Chunk>, embeddings: Vec<Embedding>) -> Result<()> {
        let width = self.validate(&chunks, &embeddings)?;

        // nothing below can fail, so both arrays move together
        self.dimension = Some(width);
        self.vectors.reserve(width * embeddings.len());
        for embedding in embeddings {
            self.vectors.extend(embedding);
        }
        self.chunks.extend(chunks);

        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let Some(dimension) = self.dimension else {
            return Ok(Vec::new());
        };
        if query.len() != dimension {
            return Err(Error::InvalidInput(format!(
                "query has width {}, index has width {dimension}",
                query.len()
            )));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        // bounded max-heap: the farthest of the current best k sits on top
        let mut best = BinaryHeap::with_capacity(k.min(self.len()) + 1);
        for (index, vector) in self.vectors.chunks_exact(dimension).enumerate() {
            best.push(Candidate {
                distance: squared_l2(query, vector),
                index,
            });
            if best.len() > k {
                best.pop();
            }
        }

        Ok(best
            .into_sorted_vec()
            .into_iter()
            .map(|c| SearchResult {
                chunk: self.chunks[c.index].clone(),
                distance: c.distance,
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.chunks.len()
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

/// Squared Euclidean distance.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Heap entry ordered by distance, then insertion order.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f32,
    index: usize,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.index.cmp(&other.index))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

#[derive(Serialize)]
struct IndexOut<'a> {
    version: u32,
    dimension: usize,
    count: usize,
    vectors: Vec<&'a [f32]>,
}

#[derive(Deserialize)]
struct IndexIn {
    version: u32,
    dimension: usize,
    count: usize,
    vectors: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct ChunksOut<'a> {
    version: u32,
    count: usize,
    chunks: &'a [Chunk],
}

#[derive(Deserialize)]
struct ChunksIn {
    version: u32,
    count: usize,
    chunks: Vec<Chunk>,
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| Error::Store(format!("failed to create {}: {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)
        .map_err(|e| Error::Store(format!("failed to open {}: {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Error::Store(format!("failed to parse {}: {e}", path.display())))
}
