//! Inverted index for BM25 ranking.
//!
//! Maps terms to postings lists (document ID + term frequency). Documents are
//! identified by their u32 position in the corpus. The index is built in one
//! pass and never changes afterwards.

use crate::bm25::tokenizer::tokenize;
use crate::document::Document;
use std::collections::HashMap;

/// A single entry in a term's postings list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    /// Position of the document in the corpus.
    pub doc_id: u32,
    /// Number of times the term appears in this document.
    pub term_frequency: u32,
}

/// Inverted index mapping terms to postings lists.
///
/// Postings are appended in ascending `doc_id` order, so the length of a
/// postings list is the term's document frequency.
#[derive(Debug, Default, Clone)]
pub struct InvertedIndex {
    /// term → list of postings
    index: HashMap<String, Vec<Posting>>,
    /// doc_id → document length (number of tokens, repeats included).
    doc_lengths: Vec<u32>,
    /// Sum of all document lengths
    total_doc_length: u64,
    /// Cached `total_doc_length / doc_count`; 0.0 for an empty index.
    avgdl: f64,
}

impl InvertedIndex {
    /// Builds the index over `question + " " + answer` of every document.
    pub fn build<'a>(documents: impl IntoIterator<Item = &'a Document>) -> Self {
        let mut idx = Self::default();
        for doc in documents {
            idx.push_text(&doc.indexed_text());
        }
        idx.avgdl = if idx.doc_lengths.is_empty() {
            0.0
        } else {
            idx.total_doc_length as f64 / idx.doc_lengths.len() as f64
        };
        tracing::debug!(
            documents = idx.doc_lengths.len(),
            terms = idx.index.len(),
            avgdl = idx.avgdl,
            "Inverted index built"
        );
        idx
    }

    fn push_text(&mut self, text: &str) {
        let internal_id = self.doc_lengths.len() as u32;
        let tokens = tokenize(text);
        let doc_len = tokens.len() as u32;
        self.doc_lengths.push(doc_len);
        self.total_doc_length += doc_len as u64;

        // Count term frequencies for this doc
        let mut tf_map: HashMap<&str, u32> = HashMap::new();
        for token in tokens.iter() {
            *tf_map.entry(token).or_insert(0) += 1;
        }

        for (term, tf) in tf_map {
            self.index
                .entry(term.to_string())
                .or_default()
                .push(Posting {
                    doc_id: internal_id,
                    term_frequency: tf,
                });
        }
    }

    /// Postings for `term`, or `None` if no document contains it.
    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.index.get(term).map(Vec::as_slice)
    }

    /// Number of documents containing `term` at least once.
    pub fn document_frequency(&self, term: &str) -> u32 {
        self.index.get(term).map_or(0, |p| p.len() as u32)
    }

    /// Number of documents indexed.
    pub fn doc_count(&self) -> u32 {
        self.doc_lengths.len() as u32
    }

    /// Token count of one document.
    pub fn doc_length(&self, doc_id: u32) -> Option<u32> {
        self.doc_lengths.get(doc_id as usize).copied()
    }

    /// Number of distinct terms in the vocabulary.
    pub fn term_count(&self) -> usize {
        self.index.len()
    }

    /// Iterates the vocabulary in no particular order.
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.index.keys().map(String::as_str)
    }

    /// Returns the average document length across all indexed documents.
    pub fn average_doc_length(&self) -> f64 {
        self.avgdl
    }

    /// Returns `true` if no documents were indexed.
    pub fn is_empty(&self) -> bool {
        self.doc_lengths.is_empty()
    }
}
