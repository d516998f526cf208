//! Corpus-level retrieval on top of the BM25 index.
//!
//! A [`Ranker`] owns a [`Corpus`] and the [`InvertedIndex`] built from it.
//! It is immutable after construction, so one instance can be shared across
//! threads behind an `Arc` and queried concurrently without locking.

use crate::bm25::{self, InvertedIndex};
use crate::corpus::Corpus;
use crate::document::Document;
use std::sync::Arc;

/// A document with its BM25 score for one query.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    /// Position of the document in the corpus.
    pub index: usize,
    /// The matched document (shared reference).
    pub document: Arc<Document>,
    /// BM25 score; 0.0 when no query term occurs in the document.
    pub score: f64,
}

/// Read-only BM25 ranker over a fixed corpus.
#[derive(Debug, Clone)]
pub struct Ranker {
    corpus: Corpus,
    index: InvertedIndex,
}

impl Ranker {
    /// Builds the index for `corpus`. The corpus is non-empty by construction.
    pub fn new(corpus: Corpus) -> Self {
        let index = InvertedIndex::build(corpus.documents().iter().map(Arc::as_ref));
        tracing::info!(
            documents = corpus.len(),
            vocabulary = index.term_count(),
            "Knowledge base indexed"
        );
        Self { corpus, index }
    }

    fn resolve(&self, (doc_id, score): (u32, f64)) -> Option<ScoredDocument> {
        let index = doc_id as usize;
        self.corpus.get(index).map(|document| ScoredDocument {
            index,
            document: Arc::clone(document),
            score,
        })
    }

    /// Every document scored against `query`, best first.
    ///
    /// Ties keep corpus order.
    pub fn rank(&self, query: &str) -> Vec<ScoredDocument> {
        bm25::score_all(&self.index, query)
            .into_iter()
            .filter_map(|hit| self.resolve(hit))
            .collect()
    }

    /// The first `k` entries of [`Ranker::rank`].
    pub fn search(&self, query: &str, k: usize) -> Vec<ScoredDocument> {
        bm25::top_k(&self.index, query, k)
            .into_iter()
            .filter_map(|hit| self.resolve(hit))
            .collect()
    }

    /// The highest-scoring document, lowest index among ties.
    ///
    /// A query sharing no terms with the corpus returns document 0 with score 0.0.
    pub fn best_match(&self, query: &str) -> ScoredDocument {
        let best = bm25::best(&self.index, query).and_then(|hit| self.resolve(hit));
        match best {
            Some(hit) => {
                tracing::debug!(index = hit.index, score = hit.score, "Best match");
                hit
            }
            // Unreachable for a non-empty corpus; fall back to the first entry.
            None => ScoredDocument {
                index: 0,
                document: Arc::clone(&self.corpus.documents()[0]),
                score: 0.0,
            },
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranker(pairs: &[(&str, &str)]) -> Ranker {
        let docs = pairs.iter().map(|&(q, a)| Document::new(q, a)).collect();
        Ranker::new(Corpus::new(docs).unwrap())
    }

    #[test]
    fn test_stemming_query_on_builtin_corpus() {
        let ranker = Ranker::new(Corpus::builtin());
        let hit = ranker.best_match("what rule do I use for stemming length");
        assert_eq!(hit.index, 2);
        assert_eq!(
            hit.document.question,
            "What is stemming and how much should I use?"
        );
        let ranked = ranker.rank("what rule do I use for stemming length");
        assert_eq!(ranked[0].index, 2);
        assert_eq!(ranked[1].index, 3);
    }

    #[test]
    fn test_builtin_topics_route_to_their_entries() {
        let ranker = Ranker::new(Corpus::builtin());
        assert_eq!(ranker.best_match("how to reduce flyrock").index, 6);
        assert_eq!(ranker.best_match("misfire").index, 7);
        assert_eq!(ranker.best_match("water conditions").index, 8);
        assert_eq!(ranker.best_match("what is scaled distance").index, 4);
    }

    #[test]
    fn test_powder_factor_regression() {
        let ranker = ranker(&[
            ("Powder factor", "Powder Factor (PF) = charge/volume"),
            ("Stemming", "Stemming confines gases"),
        ]);
        let ranked = ranker.rank("powder factor");
        assert_eq!(ranked[0].index, 0);
        assert_eq!(ranked[1].index, 1);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_best_match_is_deterministic() {
        let ranker = Ranker::new(Corpus::builtin());
        let first = ranker.best_match("burden spacing hole diameter");
        for _ in 0..20 {
            let again = ranker.best_match("burden spacing hole diameter");
            assert_eq!(again.index, first.index);
            assert_eq!(again.score, first.score);
        }
    }

    #[test]
    fn test_empty_query_returns_first_document() {
        let ranker = Ranker::new(Corpus::builtin());
        let ranked = ranker.rank("");
        assert_eq!(ranked.len(), 10);
        assert!(ranked.iter().all(|d| d.score == 0.0));
        let ids: Vec<usize> = ranked.iter().map(|d| d.index).collect();
        assert_eq!(ids, (0..10).collect::<Vec<_>>());
        let hit = ranker.best_match("");
        assert_eq!(hit.index, 0);
        assert_eq!(hit.score, 0.0);
    }

    #[test]
    fn test_unknown_terms_return_first_document() {
        let ranker = Ranker::new(Corpus::builtin());
        let hit = ranker.best_match("zzzz qqqq xylophone");
        assert_eq!(hit.index, 0);
        assert_eq!(hit.score, 0.0);
    }

    #[test]
    fn test_identical_documents_tie_to_lower_index() {
        let ranker = ranker(&[
            ("Flyrock", "Avoid overcharging"),
            ("Stemming", "Stemming confines gases"),
            ("Stemming", "Stemming confines gases"),
        ]);
        let hit = ranker.best_match("confines");
        assert_eq!(hit.index, 1);
    }

    #[test]
    fn test_search_truncates() {
        let ranker = Ranker::new(Corpus::builtin());
        let top = ranker.search("charge per delay vibration", 3);
        assert_eq!(top.len(), 3);
        let all = ranker.rank("charge per delay vibration");
        for (a, b) in top.iter().zip(all.iter()) {
            assert_eq!(a.index, b.index);
        }
        assert!(ranker.search("charge", 0).is_empty());
    }

    #[test]
    fn test_ranker_is_shareable_across_threads() {
        let ranker = Arc::new(Ranker::new(Corpus::builtin()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let r = Arc::clone(&ranker);
                std::thread::spawn(move || r.best_match("misfire").index)
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 7);
        }
    }
}
