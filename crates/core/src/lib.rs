//! # blastkb-core
//!
//! Lexical retrieval over a small, fixed drilling & blasting knowledge base,
//! plus the blast design calculators the chat front end routes to.
//!
//! The corpus is indexed once at startup; queries are tokenized and scored
//! with smoothed BM25 (k1 = 1.5, b = 0.75) against the read-only index.
//! This crate has no async dependencies and does no I/O beyond reading the
//! optional corpus and defaults files.

/// BM25 ranking: tokenizer, inverted index, and scoring.
pub mod bm25;
/// Blast design formulas: powder factor, scaled distance, burden/spacing rules, cartridges.
pub mod calc;
/// Global configuration constants: BM25 parameters, limits, and server defaults.
pub mod config;
/// The ordered, non-empty set of knowledge-base documents.
pub mod corpus;
/// Question/answer document type.
pub mod document;
/// Error type for corpus and configuration loading.
pub mod error;
/// Corpus-level ranking and top-1 retrieval.
pub mod ranker;
/// Chat message routing between calculators and the knowledge base.
pub mod router;

pub use corpus::Corpus;
pub use document::Document;
pub use error::{KbError, Result};
pub use ranker::{Ranker, ScoredDocument};
pub use router::{Intent, Reply, Router};
