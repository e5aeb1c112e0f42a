//! Recommendation client against an in-process fake chat-completions API

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use validin_advisor::{AdvisorConfig, AdvisorError, RecommendationClient};
use validin_core::{Label, Verdict};

#[derive(Default)]
struct FakeApi {
    hits: AtomicU32,
    requests: Mutex<Vec<(Option<String>, Value)>>,
}

impl FakeApi {
    fn record(&self, headers: &HeaderMap, body: Value) -> u32 {
        let auth = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push((auth, body));
        self.hits.fetch_add(1, Ordering::SeqCst) + 1
    }
}

async fn ok(State(api): State<Arc<FakeApi>>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    api.record(&headers, body);
    Json(json!({
        "id": "gen-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "Periksa sumber resmi."}}]
    }))
}

async fn server_error(State(api): State<Arc<FakeApi>>, headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    api.record(&headers, body);
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

async fn malformed(State(api): State<Arc<FakeApi>>, headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    api.record(&headers, body);
    (StatusCode::OK, "this is not json")
}

async fn no_choices(State(api): State<Arc<FakeApi>>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    api.record(&headers, body);
    Json(json!({"choices": []}))
}

async fn slow(State(api): State<Arc<FakeApi>>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    api.record(&headers, body);
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({"choices": [{"message": {"content": "terlambat"}}]}))
}

async fn flaky(State(api): State<Arc<FakeApi>>, headers: HeaderMap, Json(body): Json<Value>) -> axum::response::Response {
    if api.record(&headers, body) == 1 {
        (StatusCode::SERVICE_UNAVAILABLE, "try later").into_response()
    } else {
        Json(json!({"choices": [{"message": {"content": "Berhasil setelah dicoba ulang."}}]})).into_response()
    }
}

async fn spawn_fake_api() -> (SocketAddr, Arc<FakeApi>) {
    let api = Arc::new(FakeApi::default());

    let app = Router::new()
        .route("/ok", post(ok))
        .route("/error", post(server_error))
        .route("/malformed", post(malformed))
        .route("/no-choices", post(no_choices))
        .route("/slow", post(slow))
        .route("/flaky", post(flaky))
        .with_state(api.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, api)
}

fn client(addr: SocketAddr, path: &str, tweak: impl FnOnce(&mut AdvisorConfig)) -> RecommendationClient {
    let mut config = AdvisorConfig {
        base_url: format!("http://{}{}", addr, path),
        ..Default::default()
    };
    tweak(&mut config);
    RecommendationClient::new(config).unwrap().with_api_key("sk-test")
}

fn hoax() -> Verdict {
    Verdict {
        label: Label::Hoax,
        confidence: 95.0,
    }
}

#[tokio::test]
async fn test_successful_recommendation() {
    let (addr, api) = spawn_fake_api().await;
    let client = client(addr, "/ok", |_| {});

    let recommendation = client.recommend("Vaksin mengandung chip pelacak", &hoax()).await;
    assert!(recommendation.is_generated());
    assert_eq!(recommendation.text(), "Periksa sumber resmi.");

    let requests = api.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);

    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(body["model"], "google/gemma-2-9b-it:free");
    assert_eq!(body["max_tokens"], 1000);
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"][0]["role"], "user");

    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("sebagai HOAX dengan tingkat kepercayaan 95.00%"));
    assert!(prompt.contains("Berita: \"Vaksin mengandung chip pelacak...\""));
}

#[tokio::test]
async fn test_server_error_surfaces_status() {
    let (addr, _api) = spawn_fake_api().await;
    let client = client(addr, "/error", |_| {});

    let recommendation = client.recommend("berita", &hoax()).await;
    assert!(!recommendation.is_generated());
    assert!(recommendation.text().contains("500"));
    assert_eq!(recommendation.text(), "Error: 500 - upstream exploded");
}

#[tokio::test]
async fn test_server_error_without_retry_is_single_attempt() {
    let (addr, api) = spawn_fake_api().await;
    let client = client(addr, "/error", |_| {});

    let err = client.try_recommend("berita", &hoax()).await.unwrap_err();
    assert!(matches!(err, AdvisorError::Api { status: 500, .. }));
    assert_eq!(api.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retry_recovers_from_unavailable() {
    let (addr, api) = spawn_fake_api().await;
    let client = client(addr, "/flaky", |config| {
        config.max_retries = 2;
        config.retry_backoff_ms = 10;
    });

    let recommendation = client.recommend("berita", &hoax()).await;
    assert_eq!(recommendation.text(), "Berhasil setelah dicoba ulang.");
    assert_eq!(api.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let (addr, api) = spawn_fake_api().await;
    let client = client(addr, "/error", |config| {
        config.max_retries = 2;
        config.retry_backoff_ms = 5;
    });

    assert!(client.try_recommend("berita", &hoax()).await.is_err());
    assert_eq!(api.hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_malformed_body() {
    let (addr, _api) = spawn_fake_api().await;
    let client = client(addr, "/malformed", |_| {});

    let recommendation = client.recommend("berita", &hoax()).await;
    assert!(matches!(recommendation.error(), Some(AdvisorError::InvalidResponse(_))));
    assert!(recommendation
        .text()
        .starts_with("Maaf, terjadi kesalahan dalam mendapatkan rekomendasi: "));
}

#[tokio::test]
async fn test_empty_choices() {
    let (addr, _api) = spawn_fake_api().await;
    let client = client(addr, "/no-choices", |_| {});

    let err = client.try_recommend("berita", &hoax()).await.unwrap_err();
    assert!(matches!(err, AdvisorError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_timeout() {
    let (addr, _api) = spawn_fake_api().await;
    let client = client(addr, "/slow", |config| config.timeout_secs = 1);

    let recommendation = client.recommend("berita", &hoax()).await;
    assert_eq!(recommendation.error(), Some(&AdvisorError::Timeout));
    assert_eq!(recommendation.text(), "Maaf, permintaan timeout. Silakan coba lagi.");
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(addr, "/ok", |_| {});
    let recommendation = client.recommend("berita", &hoax()).await;

    assert!(matches!(recommendation.error(), Some(AdvisorError::Connection(_))));
    assert!(recommendation
        .text()
        .starts_with("Maaf, terjadi kesalahan koneksi: "));
}

#[tokio::test]
async fn test_long_article_is_truncated_in_prompt() {
    let (addr, api) = spawn_fake_api().await;
    let client = client(addr, "/ok", |config| config.preview_chars = 20);

    let article = "kata ".repeat(200);
    client
        .recommend(
            &article,
            &Verdict {
                label: Label::Valid,
                confidence: 88.5,
            },
        )
        .await;

    let requests = api.requests.lock().unwrap();
    let prompt = requests[0].1["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains(&format!("Berita: \"{}...\"", &article[..20])));
    assert!(prompt.contains("sebagai VALID dengan tingkat kepercayaan 88.50%"));
}
