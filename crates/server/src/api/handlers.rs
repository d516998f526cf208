//! HTTP request handlers and shared application state.

use crate::api::errors::ApiError;
use crate::api::metrics;
use crate::api::models::*;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use blastkb_core::{config, Ranker, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state passed to every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router>,
    pub prometheus_handle: PrometheusHandle,
    pub start_time: Instant,
}

impl AppState {
    fn ranker(&self) -> Result<&Arc<Ranker>, ApiError> {
        self.router.ranker().ok_or_else(ApiError::no_knowledge_base)
    }
}

fn validate_text(field: &str, text: &str) -> Result<(), ApiError> {
    if text.len() > config::MAX_QUERY_LEN {
        return Err(ApiError::BadRequest(format!(
            "{} exceeds maximum length of {} bytes",
            field,
            config::MAX_QUERY_LEN
        )));
    }
    Ok(())
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let ranker = state.router.ranker();
    let (documents, vocabulary_size) =
        ranker.map_or((0, 0), |r| (r.corpus().len(), r.index().term_count()));
    let status = if ranker.is_some() { "ok" } else { "degraded" };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.start_time.elapsed().as_secs(),
            knowledge_base_loaded: ranker.is_some(),
            documents,
            vocabulary_size,
        }),
    )
}

/// `GET /documents`
pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<DocumentListResponse>, ApiError> {
    let ranker = state.ranker()?;
    let documents: Vec<DocumentResponse> = ranker
        .corpus()
        .documents()
        .iter()
        .enumerate()
        .map(|(index, doc)| DocumentResponse {
            index,
            question: doc.question.clone(),
            answer: doc.answer.clone(),
        })
        .collect();
    Ok(Json(DocumentListResponse {
        count: documents.len(),
        documents,
    }))
}

/// `GET /documents/:index`
pub async fn get_document(
    State(state): State<AppState>,
    index: Result<Path<usize>, PathRejection>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let Path(index) = index?;
    let ranker = state.ranker()?;
    let doc = ranker
        .corpus()
        .get(index)
        .ok_or_else(|| ApiError::NotFound(format!("Document {} not found", index)))?;
    Ok(Json(DocumentResponse {
        index,
        question: doc.question.clone(),
        answer: doc.answer.clone(),
    }))
}

/// `POST /search`
pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(req) = payload?;
    if req.k == 0 || req.k > config::MAX_K {
        return Err(ApiError::BadRequest(format!(
            "k must be 1-{}",
            config::MAX_K
        )));
    }
    validate_text("query", &req.query)?;
    let ranker = state.ranker()?;

    let start = Instant::now();
    let hits = ranker.search(&req.query, req.k);
    metrics::record_search(req.k, start.elapsed());
    tracing::debug!(k = req.k, results = hits.len(), "Search complete");

    let results: Vec<MatchResponse> = hits.iter().map(MatchResponse::from).collect();
    Ok(Json(SearchResponse {
        count: results.len(),
        results,
    }))
}

/// `POST /ask`
pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let Json(req) = payload?;
    validate_text("message", &req.message)?;
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".into()));
    }

    let reply = state.router.respond(&req.message)?;
    metrics::record_query(reply.intent);
    tracing::info!(
        intent = reply.intent.as_str(),
        index = reply.hit.as_ref().map(|h| h.index),
        "Message answered"
    );
    Ok(Json(AskResponse::from(reply)))
}

/// `GET /metrics`
pub async fn metrics_endpoint(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}
