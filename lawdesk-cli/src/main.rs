//! Lawdesk CLI - serve and exercise the legal assistant pipeline
//!
//! # Commands
//!
//! ```bash
//! # Build the index from ./data and serve HTTP on port 5000
//! lawdesk serve --bind 0.0.0.0:5000
//!
//! # Ask one question and print the JSON answer
//! lawdesk ask "பிரிவு 144 என்றால் என்ன" --language ta
//!
//! # Show how the corpus is split (no model needed)
//! lawdesk chunk --limit 5
//!
//! # Build the index once and save it for later runs
//! lawdesk index --out index
//! ```

mod server;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use lawdesk_lib::{
    chat::{ChatService, TranslationFallback},
    chunk::{RecursiveChunker, split_documents},
    embed::MiniLmEmbedder,
    load::DocumentLoader,
    pipeline::{self, PipelineConfig},
    store::FlatStore,
    translate::{GoogleTranslator, PassthroughTranslator, Translator},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lawdesk")]
#[command(about = "Multilingual legal question answering over a local corpus")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    pipeline: PipelineArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PipelineArgs {
    /// Folder with the source spreadsheets, CSV and JSON files
    #[arg(long, env = "LAWDESK_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Persisted index folder; restored when present, written otherwise
    #[arg(long, env = "LAWDESK_INDEX_DIR", global = true)]
    index_dir: Option<PathBuf>,

    /// Maximum chunk length in characters
    #[arg(long, env = "LAWDESK_CHUNK_SIZE", default_value_t = 500, global = true)]
    chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[arg(long, env = "LAWDESK_CHUNK_OVERLAP", default_value_t = 50, global = true)]
    chunk_overlap: usize,

    /// Chunks retrieved per query
    #[arg(long, env = "LAWDESK_TOP_K", default_value_t = 5, global = true)]
    top_k: usize,

    /// Language retrieval and answers are composed in
    #[arg(long, env = "LAWDESK_PIVOT_LANGUAGE", default_value = "en", global = true)]
    pivot_language: String,

    /// On translation failure: "fail" the request or answer in the "pivot" language
    #[arg(long, env = "LAWDESK_TRANSLATION_FALLBACK", default_value = "fail", global = true)]
    translation_fallback: TranslationFallback,

    /// Translation endpoint
    #[arg(
        long,
        env = "LAWDESK_TRANSLATION_ENDPOINT",
        default_value = GoogleTranslator::DEFAULT_ENDPOINT,
        global = true
    )]
    translation_endpoint: String,

    /// Seconds before translation requests time out
    #[arg(long, env = "LAWDESK_TRANSLATION_TIMEOUT_SECS", default_value_t = 30, global = true)]
    translation_timeout_secs: u64,

    /// Answer in the pivot language only, without calling a translation provider
    #[arg(long, env = "LAWDESK_NO_TRANSLATION", global = true)]
    no_translation: bool,

    /// Where to keep the embedding model files
    #[arg(long, env = "LAWDESK_MODEL_CACHE", global = true)]
    model_cache: Option<PathBuf>,
}

impl PipelineArgs {
    fn config(&self) -> PipelineConfig {
        PipelineConfig {
            data_dir: self.data_dir.clone(),
            index_dir: self.index_dir.clone(),
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            top_k: self.top_k,
            pivot_language: self.pivot_language.clone(),
            translation_fallback: self.translation_fallback,
        }
    }

    fn translator(&self) -> Result<Box<dyn Translator>> {
        if self.no_translation {
            return Ok(Box::new(PassthroughTranslator::new(self.pivot_language.as_str())));
        }
        let translator = GoogleTranslator::new(
            self.translation_endpoint.as_str(),
            Duration::from_secs(self.translation_timeout_secs),
        )
        .context("failed to create translation client")?;
        Ok(Box::new(translator))
    }

    fn embedder(&self) -> Result<MiniLmEmbedder> {
        info!("loading embedding model (first run downloads ~90MB)");
        MiniLmEmbedder::with_cache_dir(self.model_cache.clone())
            .context("failed to load embedding model")
    }

    fn service(&self) -> Result<ChatService<MiniLmEmbedder, FlatStore>> {
        let config = self.config();
        pipeline::build(&config, self.embedder()?, self.translator()?)
            .context("failed to build pipeline")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the pipeline and serve the HTTP API
    Serve {
        /// Address to bind (host:port)
        #[arg(long, env = "LAWDESK_BIND", default_value = "0.0.0.0:5000")]
        bind: String,

        /// Wrap answers as {status, language, data}
        #[arg(long, env = "LAWDESK_WRAP_RESPONSE")]
        wrap_response: bool,
    },

    /// Answer one question and print the JSON response
    Ask {
        /// The question, in any supported language
        query: String,

        /// Language of the answer
        #[arg(short, long, default_value = "en")]
        language: String,
    },

    /// Load and split the corpus, printing chunk previews
    Chunk {
        /// Number of chunks to preview
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Build the index and save it to a folder
    Index {
        /// Output folder for index.json and chunks.json
        #[arg(short, long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            wrap_response,
        } => {
            let service = Arc::new(cli.pipeline.service()?);
            let state = server::AppState::new(Arc::clone(&service), wrap_response);

            let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
            let served = runtime.block_on(server::serve(state, &bind));
            // the blocking HTTP client must be dropped outside the runtime
            drop(runtime);
            drop(service);
            served?;
        }

        Commands::Ask { query, language } => {
            let service = cli.pipeline.service()?;
            let response = service
                .process_query(&query, &language)
                .context("failed to answer query")?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::Chunk { limit } => {
            let config = cli.pipeline.config();
            let documents = DocumentLoader::new(&config.data_dir).load_documents()?;
            let chunker = RecursiveChunker::new(config.chunk_size, config.chunk_overlap)?;
            let chunks = split_documents(&chunker, &documents)?;

            println!(
                "Split {} documents into {} chunks:\n",
                documents.len(),
                chunks.len()
            );
            for (i, chunk) in chunks.iter().take(limit).enumerate() {
                let meta = &chunk.metadata;
                println!(
                    "--- Chunk {} ({} chars, {} @{} of {} chunks, id: {}) ---",
                    i + 1,
                    chunk.content.chars().count(),
                    meta.document.law_name,
                    meta.position,
                    meta.total_chunks,
                    &chunk.id[..chunk.id.len().min(8)]
                );
                let preview: String = chunk.content.chars().take(200).collect();
                let ellipsis = if chunk.content.chars().count() > 200 { "..." } else { "" };
                println!("{preview}{ellipsis}\n");
            }
        }

        Commands::Index { out } => {
            let config = cli.pipeline.config();
            let engine = pipeline::build_index(&config, cli.pipeline.embedder()?)
                .context("failed to build index")?;
            engine
                .store()
                .save(&out)
                .with_context(|| format!("failed to save index to {}", out.display()))?;
            println!("Saved {} chunks to {}", engine.len(), out.display());
        }
    }

    Ok(())
}
