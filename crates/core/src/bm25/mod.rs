//! BM25 ranking engine.
//!
//! Implements smoothed BM25 scoring over an inverted index that is built once
//! from a static corpus. Text is tokenized into lowercase `[a-z0-9]+` runs.
//! No stop words, no stemming.

/// Inverted index data structure with postings lists.
pub mod inverted_index;
/// BM25 scoring, full ranking and top-k selection.
pub mod scorer;
/// Lowercasing alphanumeric tokenizer.
pub mod tokenizer;

pub use inverted_index::{InvertedIndex, Posting};
pub use scorer::{best, score_all, top_k};
pub use tokenizer::{tokenize, Tokens};
