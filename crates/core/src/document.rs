//! Knowledge-base document type.
//!
//! A [`Document`] is one immutable question/answer entry. Documents are
//! identified by their position in the corpus.

use serde::{Deserialize, Serialize};

/// A question/answer entry in the knowledge base.
///
/// `q` and `a` are accepted as short aliases when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Short label shown as the answer heading.
    #[serde(alias = "q")]
    pub question: String,
    /// Explanatory text.
    #[serde(alias = "a")]
    pub answer: String,
}

impl Document {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// The text that gets tokenized into the index: `question + " " + answer`.
    pub fn indexed_text(&self) -> String {
        format!("{} {}", self.question, self.answer)
    }
}
