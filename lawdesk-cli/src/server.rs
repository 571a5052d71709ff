//! HTTP interface over the chat service.
//!
//! - `POST /api/chat` with `{"query": "...", "language": "ta"}`
//! - `GET /health`
//! - `GET /`

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use lawdesk_lib::chat::{ChatResponse, ChatService, LegalReference};
use lawdesk_lib::embed::Embedder;
use lawdesk_lib::store::VectorStore;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

const DEFAULT_LANGUAGE: &str = "en";

pub struct AppState<E: Embedder, S: VectorStore> {
    service: Arc<ChatService<E, S>>,
    /// Wrap answers as `{status, language, data}`
    wrap_response: bool,
}

impl<E: Embedder, S: VectorStore> AppState<E, S> {
    pub fn new(service: Arc<ChatService<E, S>>, wrap_response: bool) -> Self {
        Self {
            service,
            wrap_response,
        }
    }
}

impl<E: Embedder, S: VectorStore> Clone for AppState<E, S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            wrap_response: self.wrap_response,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    status: &'static str,
    language: &'a str,
    data: WrappedAnswer<'a>,
}

/// The answer as it appears inside an [`Envelope`]; the narrative is `answer`.
#[derive(Debug, Serialize)]
struct WrappedAnswer<'a> {
    answer: &'a str,
    legal_references: &'a [LegalReference],
    helpful_links: &'a [String],
    contact_info: &'a [String],
}

impl<'a> From<&'a ChatResponse> for WrappedAnswer<'a> {
    fn from(response: &'a ChatResponse) -> Self {
        Self {
            answer: &response.main_answer,
            legal_references: &response.legal_references,
            helpful_links: &response.helpful_links,
            contact_info: &response.contact_info,
        }
    }
}

pub fn router<E, S>(state: AppState<E, S>) -> Router
where
    E: Embedder + 'static,
    S: VectorStore + 'static,
{
    let api = Router::new()
        .route("/chat", post(chat::<E, S>))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve<E, S>(state: AppState<E, S>, bind: &str) -> Result<()>
where
    E: Embedder + 'static,
    S: VectorStore + 'static,
{
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({"message": "Legal assistant API is running"}))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "healthy"}))
}

async fn chat<E, S>(
    State(state): State<AppState<E, S>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response
where
    E: Embedder + 'static,
    S: VectorStore + 'static,
{
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection, "rejected chat request body");
            return error_response(StatusCode::BAD_REQUEST, "Query is required");
        }
    };

    let Some(query) = request.query.filter(|q| !q.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Query is required");
    };
    let language = request
        .language
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    // translation and embedding block; keep them off the async workers
    let service = Arc::clone(&state.service);
    let lang = language.clone();
    let outcome = tokio::task::spawn_blocking(move || service.process_query(&query, &lang)).await;

    match outcome {
        Ok(Ok(answer)) if state.wrap_response => Json(Envelope {
            status: "success",
            language: &language,
            data: WrappedAnswer::from(&answer),
        })
        .into_response(),
        Ok(Ok(answer)) => Json(answer).into_response(),
        Ok(Err(err)) if err.is_client_error() => {
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
        Ok(Err(err)) => {
            error!(error = %err, language = %language, "chat request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
        Err(err) => {
            error!(error = %err, "chat worker panicked");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"error": message}))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use lawdesk_lib::chunk::{Chunk, ChunkMetadata};
    use lawdesk_lib::embed::Embedding;
    use lawdesk_lib::load::LegalDocument;
    use lawdesk_lib::search::SearchEngine;
    use lawdesk_lib::store::FlatStore;
    use lawdesk_lib::translate::{PassthroughTranslator, Translator};
    use serde_json::Value;

    /// Maps every text onto the same vector, so the single chunk always matches.
    struct ConstEmbedder;

    impl Embedder for ConstEmbedder {
        fn embed_documents(&mut self, texts: &[&str]) -> lawdesk_lib::Result<Vec<Embedding>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn embed_query(&mut self, _text: &str) -> lawdesk_lib::Result<Embedding> {
            Ok(vec![1.0, 0.0])
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "const"
        }
    }

    /// Provider that is always down.
    struct Unreachable;

    impl Translator for Unreachable {
        fn detect(&self, _text: &str) -> lawdesk_lib::Result<String> {
            Err(lawdesk_lib::Error::Translation("connection refused".to_string()))
        }

        fn translate(&self, _text: &str, _target: &str) -> lawdesk_lib::Result<String> {
            Err(lawdesk_lib::Error::Translation("connection refused".to_string()))
        }
    }

    fn state(translator: Box<dyn Translator>, wrap_response: bool) -> AppState<ConstEmbedder, FlatStore> {
        let document = LegalDocument {
            law_category: "Criminal Law".to_string(),
            law_name: "Section 144".to_string(),
            summary: "Prohibits unlawful assembly".to_string(),
            when_applicable: "Public order emergencies".to_string(),
            whom_to_approach: "District Magistrate".to_string(),
            ..LegalDocument::default()
        };
        let chunk = Chunk {
            id: "section-144".to_string(),
            content: "Law: Section 144".to_string(),
            metadata: ChunkMetadata {
                document,
                position: 0,
                total_chunks: 1,
            },
        };
        let mut engine = SearchEngine::new(ConstEmbedder, FlatStore::new());
        engine.index(vec![chunk]).unwrap();
        AppState::new(Arc::new(ChatService::new(engine, translator)), wrap_response)
    }

    fn passthrough() -> Box<dyn Translator> {
        Box::new(PassthroughTranslator::new("en"))
    }

    fn request(query: Option<&str>, language: Option<&str>) -> Result<Json<ChatRequest>, JsonRejection> {
        Ok(Json(ChatRequest {
            query: query.map(str::to_string),
            language: language.map(str::to_string),
        }))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_query_is_bad_request() {
        let response = chat(State(state(passthrough(), false)), request(None, Some("en"))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"error": "Query is required"}));
    }

    #[tokio::test]
    async fn test_blank_query_is_bad_request() {
        let response = chat(State(state(passthrough(), false)), request(Some("  "), None)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_returns_answer() {
        let response = chat(
            State(state(passthrough(), false)),
            request(Some("What is Section 144"), None),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(
            body["main_answer"]
                .as_str()
                .unwrap()
                .starts_with("Based on Section 144")
        );
        assert_eq!(body["legal_references"][0]["name"], "Section 144");
        assert_eq!(body["helpful_links"], json!([]));
        assert_eq!(body["contact_info"], json!([]));
    }

    #[tokio::test]
    async fn test_wrapped_response() {
        let response = chat(
            State(state(passthrough(), true)),
            request(Some("What is Section 144"), Some("ta")),
        )
        .await;

        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["language"], "ta");
        assert_eq!(body["data"]["legal_references"][0]["name"], "Section 144");
        assert!(
            body["data"]["answer"]
                .as_str()
                .unwrap()
                .starts_with("Based on Section 144")
        );
        assert!(body["data"].get("main_answer").is_none());
        assert_eq!(body["data"]["helpful_links"], json!([]));
    }

    #[tokio::test]
    async fn test_internal_error_is_not_leaked() {
        let response = chat(
            State(state(Box::new(Unreachable), false)),
            request(Some("What is Section 144"), Some("ta")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({"error": "Internal server error"}));
    }

    #[tokio::test]
    async fn test_health_and_index() {
        assert_eq!(health().await.0, json!({"status": "healthy"}));
        assert_eq!(
            index().await.0,
            json!({"message": "Legal assistant API is running"})
        );
    }
}
