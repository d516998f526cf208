//! BM25 scoring engine.
//!
//! Scores every document against a query using the smoothed BM25 formula with
//! the fixed `k1` and `b` parameters from [`crate::config`]. Results are
//! ordered by descending score; equal scores keep ascending document order.

use crate::bm25::inverted_index::InvertedIndex;
use crate::bm25::tokenizer::tokenize;
use crate::config;
use ordered_float::OrderedFloat;
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeSet, BinaryHeap};

/// Smoothed inverse document frequency: `ln((N - df + 0.5) / (df + 0.5) + 1)`.
///
/// Never negative for `1 <= df <= N`.
#[inline]
pub fn idf(doc_count: u32, doc_freq: u32) -> f64 {
    let n = doc_count as f64;
    let df = doc_freq as f64;
    ((n - df + config::IDF_SMOOTHING) / (df + config::IDF_SMOOTHING) + 1.0).ln()
}

/// Contribution of one term to one document's score.
#[inline]
pub fn term_score(idf: f64, tf: f64, doc_len: f64, avgdl: f64) -> f64 {
    let k1 = config::BM25_K1;
    let b = config::BM25_B;
    let denom = tf + k1 * (1.0 - b + b * (doc_len / avgdl));
    // Only reachable with tf == 0, which contributes nothing either way.
    let denom = if denom == 0.0 { 1.0 } else { denom };
    idf * (tf * (k1 + 1.0)) / denom
}

impl InvertedIndex {
    /// IDF of `term`, or `None` if the corpus never contains it.
    pub fn idf(&self, term: &str) -> Option<f64> {
        match self.document_frequency(term) {
            0 => None,
            df => Some(idf(self.doc_count(), df)),
        }
    }
}

/// Orders `(doc_id, score)` pairs by descending score, then ascending doc_id.
pub fn rank_order(a: &(u32, f64), b: &(u32, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

/// Per-document accumulated scores, indexed by doc_id.
fn accumulate(index: &InvertedIndex, query: &str) -> Vec<f64> {
    let mut scores = vec![0.0f64; index.doc_count() as usize];
    if index.is_empty() {
        return scores;
    }

    // Repeated query terms count once; BTreeSet keeps float summation order fixed.
    let query_tokens = tokenize(query);
    let distinct: BTreeSet<&str> = query_tokens.iter().collect();

    let n = index.doc_count();
    let avgdl = index.average_doc_length();

    for term in distinct {
        let Some(postings) = index.postings(term) else {
            continue;
        };
        let term_idf = idf(n, postings.len() as u32);

        // Documents without the term add idf * 0 / denom = 0, so only postings are visited.
        for posting in postings {
            let dl = index.doc_length(posting.doc_id).unwrap_or(0) as f64;
            let tf = posting.term_frequency as f64;
            scores[posting.doc_id as usize] += term_score(term_idf, tf, dl, avgdl);
        }
    }
    scores
}

/// BM25 scores for every document, sorted by descending score.
///
/// Returns all N documents, including those scoring 0.0. An empty index
/// yields an empty vector.
pub fn score_all(index: &InvertedIndex, query: &str) -> Vec<(u32, f64)> {
    let mut results: Vec<(u32, f64)> = accumulate(index, query)
        .into_iter()
        .enumerate()
        .map(|(id, s)| (id as u32, s))
        .collect();
    results.sort_by(rank_order);
    results
}

/// The first `k` entries of [`score_all`], via a min-heap of size `k`.
pub fn top_k(index: &InvertedIndex, query: &str, k: usize) -> Vec<(u32, f64)> {
    if k == 0 {
        return Vec::new();
    }
    let scores = accumulate(index, query);

    // Partial sort: O(n log k). Reverse(id) makes the lowest id the "largest" among ties.
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, Reverse<u32>)>> =
        BinaryHeap::with_capacity(k + 1);
    for (id, score) in scores.into_iter().enumerate() {
        heap.push(Reverse((OrderedFloat(score), Reverse(id as u32))));
        if heap.len() > k {
            heap.pop();
        }
    }
    let mut results: Vec<(u32, f64)> = heap
        .into_iter()
        .map(|Reverse((s, Reverse(id)))| (id, s.0))
        .collect();
    results.sort_by(rank_order);
    results
}

/// Highest-scoring `(doc_id, score)`, lowest doc_id among ties.
pub fn best(index: &InvertedIndex, query: &str) -> Option<(u32, f64)> {
    accumulate(index, query)
        .into_iter()
        .enumerate()
        .map(|(id, s)| (id as u32, s))
        .min_by(rank_order)
}
