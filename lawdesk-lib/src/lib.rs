//! Lawdesk - multilingual legal question answering over a local corpus
//!
//! # Architecture
//!
//! ```text
//! data/*.{xlsx,csv,json} -> DocumentLoader -> Chunker -> Embedder -> FlatStore
//!                                                                       |
//! Query -> Translator (to English) -> Embedder -> Search <--------------+
//!                                                   |
//!                            AnswerDraft -> Translator (to target) -> ChatResponse
//! ```
//!
//! # Example
//!
//! ```ignore
//! use lawdesk_lib::{embed::MiniLmEmbedder, pipeline, translate::PassthroughTranslator};
//!
//! let config = pipeline::PipelineConfig::default();
//! let service = pipeline::build(
//!     &config,
//!     MiniLmEmbedder::new()?,
//!     Box::new(PassthroughTranslator::new("en")),
//! )?;
//!
//! let response = service.process_query("What is Section 144?", "en")?;
//! println!("{}", response.main_answer);
//! ```

pub mod chat;
pub mod chunk;
pub mod embed;
pub mod error;
pub mod load;
pub mod pipeline;
pub mod search;
pub mod store;
pub mod translate;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
