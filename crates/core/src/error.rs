//! Error type for corpus construction and configuration loading.
//!
//! Tokenizing and scoring never fail; the only retrieval error is an empty
//! knowledge base, which is rejected when the corpus is built.

use thiserror::Error;

/// Errors raised while building a corpus or reading configuration files.
#[derive(Error, Debug)]
pub enum KbError {
    /// The corpus has no documents, so there is nothing to rank.
    #[error("no knowledge base loaded: corpus is empty")]
    EmptyCorpus,

    /// The corpus holds more documents than [`crate::config::MAX_CORPUS_DOCUMENTS`].
    #[error("corpus has {0} documents, limit is {max}", max = crate::config::MAX_CORPUS_DOCUMENTS)]
    CorpusTooLarge(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KbError>;
