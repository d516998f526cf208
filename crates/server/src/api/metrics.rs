//! Prometheus metrics recording.

use blastkb_core::{Intent, Ranker};
use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Records HTTP request metrics.
pub fn record_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Records which route answered a chat message.
pub fn record_query(intent: Intent) {
    counter!("blastkb_queries_total", "route" => intent.as_str()).increment(1);
}

/// Records a ranked search.
pub fn record_search(k: usize, duration: Duration) {
    counter!("blastkb_search_total").increment(1);
    histogram!("blastkb_search_k").record(k as f64);
    histogram!("blastkb_search_duration_seconds").record(duration.as_secs_f64());
}

/// Sets the knowledge-base size gauges. Called once after the index is built.
pub fn update_corpus_metrics(ranker: Option<&Ranker>) {
    let (documents, terms) = ranker.map_or((0, 0), |r| (r.corpus().len(), r.index().term_count()));
    gauge!("blastkb_documents_total").set(documents as f64);
    gauge!("blastkb_vocabulary_terms").set(terms as f64);
}
