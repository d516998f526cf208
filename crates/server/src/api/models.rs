//! Request and response data transfer objects for the REST API.
//!
//! All types derive `Serialize` and/or `Deserialize` for JSON marshalling via Axum.

use blastkb_core::config;
use blastkb_core::{Intent, Reply, ScoredDocument};
use serde::{Deserialize, Serialize};

/// Request body for `POST /search`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_k")]
    pub k: usize,
}

fn default_k() -> usize {
    config::DEFAULT_K
}

/// Request body for `POST /ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub message: String,
}

/// A corpus entry with its position.
#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub index: usize,
    pub question: String,
    pub answer: String,
}

/// Response body for `GET /documents`.
#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub count: usize,
    pub documents: Vec<DocumentResponse>,
}

/// A ranked document with its BM25 score.
#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub index: usize,
    pub question: String,
    pub answer: String,
    pub score: f64,
}

impl From<&ScoredDocument> for MatchResponse {
    fn from(hit: &ScoredDocument) -> Self {
        Self {
            index: hit.index,
            question: hit.document.question.clone(),
            answer: hit.document.answer.clone(),
            score: hit.score,
        }
    }
}

/// Response body for `POST /search`.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<MatchResponse>,
    pub count: usize,
}

/// Whether a chat reply came from a calculator or the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Calculator,
    Knowledge,
}

/// Response body for `POST /ask`.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub kind: ReplyKind,
    /// Calculator that produced the reply; absent for knowledge answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    pub text: String,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub matched: Option<MatchResponse>,
}

impl From<Reply> for AskResponse {
    fn from(reply: Reply) -> Self {
        let kind = match reply.intent {
            Intent::Knowledge => ReplyKind::Knowledge,
            _ => ReplyKind::Calculator,
        };
        Self {
            kind,
            intent: (kind == ReplyKind::Calculator).then_some(reply.intent),
            matched: reply.hit.as_ref().map(MatchResponse::from),
            text: reply.text,
        }
    }
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub knowledge_base_loaded: bool,
    pub documents: usize,
    pub vocabulary_size: usize,
}
