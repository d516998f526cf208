use blastkb_core::calc::DesignDefaults;
use blastkb_core::{config, Corpus, Ranker, Router};
use blastkb_server::api::{create_router, UNMATCHED_ROUTE};
use blastkb_server::api::handlers::AppState;
use metrics_exporter_prometheus::PrometheusHandle;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::{Arc, OnceLock};
use tempfile::NamedTempFile;

async fn spawn_app() -> String {
    spawn_app_with(Some(Corpus::builtin())).await
}

/// One global recorder per test binary, so `/metrics` on any app sees every request.
fn prometheus_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(|| {
            match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
                Ok(handle) => handle,
                Err(_) => metrics_exporter_prometheus::PrometheusBuilder::new()
                    .build_recorder()
                    .handle(),
            }
        })
        .clone()
}

async fn spawn_app_with(corpus: Option<Corpus>) -> String {
    let prometheus_handle = prometheus_handle();

    let ranker = corpus.map(|c| Arc::new(Ranker::new(c)));
    let state = AppState {
        router: Arc::new(Router::new(ranker, DesignDefaults::default())),
        prometheus_handle,
        start_time: std::time::Instant::now(),
    };

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    base_url
}

fn client() -> Client {
    Client::new()
}

async fn ask(base_url: &str, message: &str) -> reqwest::Response {
    client()
        .post(format!("{}/ask", base_url))
        .json(&json!({ "message": message }))
        .send()
        .await
        .expect("Failed to send ask")
}

async fn search(base_url: &str, body: Value) -> reqwest::Response {
    client()
        .post(format!("{}/search", base_url))
        .json(&body)
        .send()
        .await
        .expect("Failed to send search")
}

// ========== Health & Metrics ==========

#[tokio::test]
async fn test_health() {
    let base_url = spawn_app().await;
    let resp = client()
        .get(format!("{}/health", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["knowledge_base_loaded"], true);
    assert_eq!(body["documents"], 10);
    assert!(body["vocabulary_size"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_health_without_knowledge_base() {
    let base_url = spawn_app_with(None).await;
    let body: Value = client()
        .get(format!("{}/health", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["knowledge_base_loaded"], false);
    assert_eq!(body["documents"], 0);
}

async fn request_counter_lines(base_url: &str) -> Vec<String> {
    let text = client()
        .get(format!("{}/metrics", base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    text.lines()
        .filter(|l| l.starts_with("http_requests_total{"))
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_metrics_label_requests_by_route_template() {
    let base_url = spawn_app().await;
    for i in 0..25 {
        client()
            .get(format!("{}/documents/{}", base_url, 1000 + i))
            .send()
            .await
            .unwrap();
        client()
            .get(format!("{}/no-such-route-{}", base_url, i))
            .send()
            .await
            .unwrap();
    }

    let lines = request_counter_lines(&base_url).await;
    assert!(
        lines.iter().all(|l| !l.contains("/no-such-route") && !l.contains("/documents/10")),
        "concrete paths leaked into labels: {lines:#?}"
    );
    let per_document_404 = lines
        .iter()
        .filter(|l| l.contains(r#"path="/documents/:index""#) && l.contains(r#"status="404""#))
        .count();
    assert_eq!(per_document_404, 1, "{lines:#?}");
    let unmatched = format!(r#"path="{}""#, UNMATCHED_ROUTE);
    assert_eq!(
        lines.iter().filter(|l| l.contains(&unmatched)).count(),
        1,
        "{lines:#?}"
    );
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let base_url = spawn_app().await;
    ask(&base_url, "misfire").await;
    let resp = client()
        .get(format!("{}/metrics", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// ========== Documents ==========

#[tokio::test]
async fn test_list_documents() {
    let base_url = spawn_app().await;
    let body: Value = client()
        .get(format!("{}/documents", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["count"], 10);
    let docs = body["documents"].as_array().unwrap();
    assert_eq!(docs[0]["index"], 0);
    assert_eq!(docs[0]["question"], "What is powder factor?");
    assert_eq!(docs[9]["index"], 9);
}

#[tokio::test]
async fn test_get_document() {
    let base_url = spawn_app().await;
    let resp = client()
        .get(format!("{}/documents/2", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["question"], "What is stemming and how much should I use?");

    let resp = client()
        .get(format!("{}/documents/10", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_get_document_rejects_non_numeric_index() {
    let base_url = spawn_app().await;
    let resp = client()
        .get(format!("{}/documents/abc", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_documents_without_knowledge_base() {
    let base_url = spawn_app_with(None).await;
    let resp = client()
        .get(format!("{}/documents", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "No knowledge base loaded");
}

// ========== Search ==========

#[tokio::test]
async fn test_search_ranks_stemming_entry_first() {
    let base_url = spawn_app().await;
    let resp = search(
        &base_url,
        json!({ "query": "what rule do I use for stemming length", "k": 3 }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["count"], 3);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["index"], 2);
    let scores: Vec<f64> = results.iter().map(|r| r["score"].as_f64().unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_search_default_k_returns_whole_small_corpus() {
    let base_url = spawn_app().await;
    let body: Value = search(&base_url, json!({ "query": "flyrock" }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["count"], 10);
    assert_eq!(body["results"][0]["index"], 6);
}

#[tokio::test]
async fn test_search_unknown_terms_score_zero() {
    let base_url = spawn_app().await;
    let body: Value = search(&base_url, json!({ "query": "xylophone", "k": 2 }))
        .await
        .json()
        .await
        .unwrap();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["index"], 0);
    assert_eq!(results[1]["index"], 1);
    assert!(results.iter().all(|r| r["score"].as_f64() == Some(0.0)));
}

#[tokio::test]
async fn test_search_rejects_invalid_k() {
    let base_url = spawn_app().await;
    let resp = search(&base_url, json!({ "query": "burden", "k": 0 })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let resp = search(&base_url, json!({ "query": "burden", "k": config::MAX_K + 1 })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_rejects_oversized_query() {
    let base_url = spawn_app().await;
    let query = "a".repeat(config::MAX_QUERY_LEN + 1);
    let resp = search(&base_url, json!({ "query": query })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_without_knowledge_base() {
    let base_url = spawn_app_with(None).await;
    let resp = search(&base_url, json!({ "query": "flyrock" })).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ========== Ask ==========

#[tokio::test]
async fn test_ask_knowledge_answer() {
    let base_url = spawn_app().await;
    let resp = ask(&base_url, "how to reduce flyrock").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["kind"], "knowledge");
    assert!(body.get("intent").is_none());
    assert_eq!(body["match"]["index"], 6);
    assert_eq!(body["match"]["question"], "How to reduce flyrock?");
    assert!(body["match"]["score"].as_f64().unwrap() > 0.0);
    assert!(body["text"]
        .as_str()
        .unwrap()
        .starts_with("**How to reduce flyrock?**\n"));
}

#[tokio::test]
async fn test_ask_powder_factor_calculator() {
    let base_url = spawn_app().await;
    let body: Value = ask(&base_url, "PF h=10 b=3 s=3.5 j=0.5 t=2 d=165 rho=1000")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["kind"], "calculator");
    assert_eq!(body["intent"], "powder_factor");
    assert!(body.get("match").is_none());
    assert!(body["text"].as_str().unwrap().contains("PF = 1.731 kg/m³"));
}

#[tokio::test]
async fn test_ask_scaled_distance_calculator() {
    let base_url = spawn_app().await;
    let body: Value = ask(&base_url, "sd 300 m 35 kg").await.json().await.unwrap();
    assert_eq!(body["intent"], "scaled_distance");
    assert!(body["text"].as_str().unwrap().contains("50.71"));
}

#[tokio::test]
async fn test_ask_calculators_work_without_knowledge_base() {
    let base_url = spawn_app_with(None).await;
    let resp = ask(&base_url, "starter rules for burden d=165").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["intent"], "starter_rules");

    let resp = ask(&base_url, "what is stemming").await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "No knowledge base loaded");
}

#[tokio::test]
async fn test_ask_rejects_empty_and_oversized_messages() {
    let base_url = spawn_app().await;
    let resp = ask(&base_url, "   ").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let resp = ask(&base_url, &"x".repeat(config::MAX_QUERY_LEN + 1)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ask_rejects_malformed_body() {
    let base_url = spawn_app().await;
    let resp = client()
        .post(format!("{}/ask", base_url))
        .json(&json!({ "text": "missing message field" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("message"));

    let resp = client()
        .post(format!("{}/search", base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    let resp = client()
        .post(format!("{}/ask", base_url))
        .body("plain text")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

// ========== Custom corpus ==========

#[tokio::test]
async fn test_corpus_loaded_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"question": "Powder factor", "answer": "Powder Factor (PF) = charge/volume"}},
            {{"q": "Stemming", "a": "Stemming confines gases"}}
        ]"#
    )
    .unwrap();
    let corpus = Corpus::from_json_file(file.path()).unwrap();
    let base_url = spawn_app_with(Some(corpus)).await;

    let body: Value = search(&base_url, json!({ "query": "powder factor" }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["results"][0]["index"], 0);
    assert_eq!(body["results"][1]["score"], 0.0);

    let body: Value = ask(&base_url, "gases").await.json().await.unwrap();
    assert_eq!(body["match"]["index"], 1);
    assert_eq!(body["match"]["question"], "Stemming");
}
