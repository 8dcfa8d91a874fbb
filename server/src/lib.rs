use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use ircore::persist::load_collection;
use ircore::{Collection, DocId, Evaluator, ModelKind, Preprocessing};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const SNIPPET_CHARS: usize = 200;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_model")]
    pub model: ModelKind,
    #[serde(default)]
    pub stopwords: bool,
    #[serde(default)]
    pub stemming: bool,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_model() -> ModelKind { ModelKind::VectorSpace }
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub model: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
    pub title: String,
    pub snippet: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub evaluator: Arc<Evaluator>,
}

/// Build the router over the collection stored at `collection_path`.
pub fn build_app(collection_path: String) -> Result<Router> {
    let collection = load_collection(&collection_path)?;
    Ok(build_app_with(collection))
}

pub fn build_app_with(collection: Collection) -> Router {
    let app_state = AppState { evaluator: Arc::new(Evaluator::new(collection)) };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let evaluator = Arc::clone(&state.evaluator);
    match tokio::task::spawn_blocking(move || search(&evaluator, params)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "search task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": "search failed" }))).into_response()
        }
    }
}

/// Evaluate a search request; scoring is CPU-bound, so callers run this off the async workers.
fn search(evaluator: &Evaluator, params: SearchParams) -> Response {
    let start = std::time::Instant::now();
    let preprocessing = Preprocessing::new(params.stopwords, params.stemming);
    let hits = match evaluator.search(params.model, &params.q, preprocessing) {
        Ok(hits) => hits,
        Err(e) => {
            let body = serde_json::json!({ "error": e.to_string(), "position": e.position() });
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let matching: Vec<_> = hits.into_iter().filter(|h| h.score > 0.0).collect();
    let total_hits = matching.len();
    let k = params.k.clamp(1, 100);
    let highlighter = highlighter(&params.q);
    let results = matching
        .into_iter()
        .take(k)
        .map(|hit| SearchHit {
            doc_id: hit.document.id,
            score: hit.score,
            title: hit.document.title.clone(),
            snippet: snippet(&hit.document.raw_text, highlighter.as_ref()),
        })
        .collect();

    let elapsed = start.elapsed();
    tracing::info!(query = %params.q, model = params.model.id(), total_hits, "search");
    Json(SearchResponse {
        query: params.q,
        model: params.model.to_string(),
        took_s: elapsed.as_secs_f64(),
        total_hits,
        results,
    })
    .into_response()
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Response {
    match state.evaluator.collection().get(doc_id) {
        Some(doc) => Json(serde_json::json!({
            "doc_id": doc.id,
            "title": doc.title,
            "raw_text": doc.raw_text,
        }))
        .into_response(),
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" }))).into_response(),
    }
}

/// Case-insensitive matcher for the literal words of a query, operators excluded.
fn highlighter(query: &str) -> Option<Regex> {
    let terms: Vec<String> = query
        .split(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .filter(|t| !t.is_empty() && !matches!(*t, "AND" | "OR" | "NOT"))
        .map(regex::escape)
        .collect();
    if terms.is_empty() {
        return None;
    }
    RegexBuilder::new(&terms.join("|")).case_insensitive(true).build().ok()
}

fn snippet(text: &str, highlighter: Option<&Regex>) -> Option<String> {
    if text.is_empty() { return None; }
    let first_idx = highlighter.and_then(|re| re.find(text)).map(|m| m.start());
    let snippet = match first_idx {
        Some(idx) => {
            let start = floor_char_boundary(text, idx.saturating_sub(SNIPPET_CHARS / 2));
            let end = floor_char_boundary(text, (idx + SNIPPET_CHARS).min(text.len()));
            &text[start..end]
        }
        None => {
            let end = text.char_indices().nth(SNIPPET_CHARS).map_or(text.len(), |(i, _)| i);
            &text[..end]
        }
    };
    Some(match highlighter {
        Some(re) => re.replace_all(snippet, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).into_owned(),
        None => snippet.to_string(),
    })
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
