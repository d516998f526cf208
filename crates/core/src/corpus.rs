//! The ordered, non-empty set of knowledge-base documents.
//!
//! A [`Corpus`] is fixed for the lifetime of the process. It comes either from
//! the built-in drilling & blasting entries or from a JSON file supplied at
//! startup, and is validated to be non-empty on construction.

use crate::config;
use crate::document::Document;
use crate::error::{KbError, Result};
use std::path::Path;
use std::sync::Arc;

/// Hand-authored drilling & blasting entries shipped with the binary.
const BUILTIN_ENTRIES: &[(&str, &str)] = &[
    (
        "What is powder factor?",
        "Powder Factor (PF) is the mass of explosive used divided by the rock volume broken. Units often kg/m³ (metric) or lb/yd³ (imperial). Typical surface bench blasting values range ~0.3–1.0 kg/m³ depending on rock strength, fragmentation target, and energy of the explosive.",
    ),
    (
        "How do I estimate burden and spacing?",
        "A common starting point for bench blasting (ANFO/ANFO blends) is: Burden B ≈ (25–35) × hole diameter (in mm) / 1000 (m), or B ≈ 25–40×D (in) in inches. Spacing S ≈ 1.15–1.4 × B. Adjust for rock mass quality, stiffness, and energy.",
    ),
    (
        "What is stemming and how much should I use?",
        "Stemming is inert material at the top of the hole to confine gases. A quick rule: stemming length T ≈ 0.7–1.0 × burden (bench blasting), or T ≈ 20–30 × hole diameter (in mm), whichever suits fragmentation and flyrock control.",
    ),
    (
        "How do I compute charge per hole?",
        "Charge per hole (kg) = explosive density (kg/m³) × hole cross-section area (m²) × charged length (m). Charged length is typically (bench height + subdrill – stemming).",
    ),
    (
        "What is scaled distance and why is it used?",
        "Scaled Distance (SD) = distance (m) / sqrt(charge per delay, kg). It correlates with ground vibration. Lower SD implies higher vibration. Site-specific constants are required for accurate PPV prediction.",
    ),
    (
        "How do initiation and delays affect results?",
        "Using short-delay intervals between holes/rows reduces instantaneous charge per delay, improves muckpile throw and fragmentation, and helps control vibration. Keep actual per-delay charge consistent with design assumptions.",
    ),
    (
        "How to reduce flyrock?",
        "Avoid overcharging, increase stemming or burden (within limits), improve hole collar quality, check for decking voids, and ensure accurate drilling to design angles and positions.",
    ),
    (
        "What to do in case of a misfire?",
        "Follow site SOPs: secure the area, notify supervisor/blaster-in-charge, mark and record the hole, forbid drilling or digging near the misfire, and only re-initiate or make safe under approved procedures with proper clearance.",
    ),
    (
        "How do water conditions affect explosive choice?",
        "In dry holes, ANFO is economical. In wet or dynamic water, use water-resistant emulsions or heavy ANFO blends. Consider gas generation, density, and energy with supplier tech sheets.",
    ),
    (
        "What inputs do I need to design a bench blast?",
        "Rock properties (UCS/RQD/JSA), bench height, hole diameter, explosive density & energy, desired fragmentation, face conditions, equipment dig/haul constraints, environmental limits (vibration, airblast), and safety/legal standards.",
    ),
];

/// Ordered sequence of documents. Never empty.
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Vec<Arc<Document>>,
}

impl Corpus {
    /// Creates a corpus, rejecting an empty or oversized document list.
    pub fn new(documents: Vec<Document>) -> Result<Self> {
        if documents.is_empty() {
            return Err(KbError::EmptyCorpus);
        }
        if documents.len() > config::MAX_CORPUS_DOCUMENTS {
            return Err(KbError::CorpusTooLarge(documents.len()));
        }
        Ok(Self {
            documents: documents.into_iter().map(Arc::new).collect(),
        })
    }

    /// The built-in drilling & blasting knowledge base.
    pub fn builtin() -> Self {
        Self {
            documents: BUILTIN_ENTRIES
                .iter()
                .map(|&(q, a)| Arc::new(Document::new(q, a)))
                .collect(),
        }
    }

    /// Parses a JSON array of `{"question": .., "answer": ..}` objects.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let documents: Vec<Document> = serde_json::from_str(json)?;
        Self::new(documents)
    }

    /// Reads a corpus from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let corpus = Self::from_json_str(&data)?;
        tracing::info!(path = %path.display(), documents = corpus.len(), "Corpus loaded");
        Ok(corpus)
    }

    pub fn documents(&self) -> &[Arc<Document>] {
        &self.documents
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Document>> {
        self.documents.get(index)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Always `false` for a constructed corpus.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
