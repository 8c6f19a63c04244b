//! HTTP classification client against a local mock endpoint
//!
//! Spins up an axum server on a random port that answers `POST /predict`
//! with a fixed reply, then exercises the client directly and through a
//! running `Translator`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use gesture_bridge_core::client::{ClassificationClient, HttpClassificationClient};
use gesture_bridge_core::config::{ClassifierConfig, TranslatorConfig};
use gesture_bridge_core::events::MultiSink;
use gesture_bridge_core::{Error, LandmarkFrame, Translator, FRAME_LEN};

/// Canned answer of the mock endpoint
#[derive(Clone)]
enum Reply {
    Label(&'static str, f32),
    NullLabel,
    ServerError,
    NotJson,
    Slow(Duration),
}

#[derive(Clone)]
struct MockState {
    reply: Reply,
    hits: Arc<AtomicUsize>,
    landmark_len: Arc<AtomicUsize>,
}

/// Mock prediction server for testing
struct MockClassifierServer {
    endpoint: String,
    hits: Arc<AtomicUsize>,
    landmark_len: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl MockClassifierServer {
    /// Start the mock server on a random available port
    async fn start(reply: Reply) -> std::io::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let hits = Arc::new(AtomicUsize::new(0));
        let landmark_len = Arc::new(AtomicUsize::new(0));
        let state = MockState {
            reply,
            hits: hits.clone(),
            landmark_len: landmark_len.clone(),
        };
        let app = Router::new()
            .route("/predict", post(predict))
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await;
        });

        Ok(Self {
            endpoint: format!("http://{}/predict", addr),
            hits,
            landmark_len,
            shutdown_tx: Some(shutdown_tx),
            handle,
        })
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn config(&self, timeout_ms: u64) -> ClassifierConfig {
        ClassifierConfig {
            endpoint: self.endpoint.clone(),
            timeout_ms,
        }
    }

    async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = tokio::time::timeout(Duration::from_secs(1), self.handle).await;
    }
}

async fn predict(State(state): State<MockState>, Json(body): Json<serde_json::Value>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let len = body["landmarks"].as_array().map_or(0, |values| values.len());
    state.landmark_len.store(len, Ordering::SeqCst);

    match state.reply {
        Reply::Label(label, confidence) => {
            Json(json!({ "label": label, "confidence": confidence })).into_response()
        }
        Reply::NullLabel => Json(json!({ "label": null, "confidence": 0.31 })).into_response(),
        Reply::ServerError => {
            (StatusCode::INTERNAL_SERVER_ERROR, "model unavailable").into_response()
        }
        Reply::NotJson => (StatusCode::OK, "<html>oops</html>").into_response(),
        Reply::Slow(delay) => {
            tokio::time::sleep(delay).await;
            Json(json!({ "label": "Z", "confidence": 0.99 })).into_response()
        }
    }
}

fn frame() -> LandmarkFrame {
    LandmarkFrame::new(vec![0.42; FRAME_LEN]).unwrap()
}

#[tokio::test]
async fn test_classify_label() {
    let server = MockClassifierServer::start(Reply::Label("A", 0.93)).await.unwrap();
    let client = HttpClassificationClient::new(&server.config(1000)).unwrap();

    let result = client.classify(&frame()).await.unwrap().unwrap();
    assert_eq!(result.label, "A");
    assert!((result.confidence - 0.93).abs() < 1e-6);
    assert_eq!(server.hits(), 1);
    assert_eq!(server.landmark_len.load(Ordering::SeqCst), FRAME_LEN);

    server.shutdown().await;
}

#[tokio::test]
async fn test_classify_null_label() {
    let server = MockClassifierServer::start(Reply::NullLabel).await.unwrap();
    let client = HttpClassificationClient::new(&server.config(1000)).unwrap();

    assert!(client.classify(&frame()).await.unwrap().is_none());
    server.shutdown().await;
}

#[tokio::test]
async fn test_classify_server_error() {
    let server = MockClassifierServer::start(Reply::ServerError).await.unwrap();
    let client = HttpClassificationClient::new(&server.config(1000)).unwrap();

    let err = client.classify(&frame()).await.unwrap_err();
    assert!(matches!(err, Error::ClassifierStatus { status: 500, .. }));
    assert!(err.is_classifier_failure());
    server.shutdown().await;
}

#[tokio::test]
async fn test_classify_malformed_body() {
    let server = MockClassifierServer::start(Reply::NotJson).await.unwrap();
    let client = HttpClassificationClient::new(&server.config(1000)).unwrap();

    assert!(matches!(
        client.classify(&frame()).await,
        Err(Error::MalformedResponse(_))
    ));
    server.shutdown().await;
}

#[tokio::test]
async fn test_classify_timeout() {
    let server = MockClassifierServer::start(Reply::Slow(Duration::from_millis(500)))
        .await
        .unwrap();
    let client = HttpClassificationClient::new(&server.config(100)).unwrap();

    assert!(matches!(
        client.classify(&frame()).await,
        Err(Error::ClassifierTimeout { timeout_ms: 100 })
    ));
    server.shutdown().await;
}

#[tokio::test]
async fn test_unreachable_endpoint() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClassifierConfig {
        endpoint: format!("http://{}/predict", addr),
        timeout_ms: 500,
    };
    let client = HttpClassificationClient::new(&config).unwrap();
    assert!(matches!(
        client.classify(&frame()).await,
        Err(Error::ClassifierRequest { .. })
    ));
}

#[tokio::test]
async fn test_translator_over_http() {
    let server = MockClassifierServer::start(Reply::Label("A", 0.9)).await.unwrap();
    let config = TranslatorConfig::default().with_endpoint(server.endpoint.clone());
    let client = Arc::new(HttpClassificationClient::new(&config.classifier).unwrap());
    let translator = Translator::spawn(config, client, Arc::new(MultiSink::new())).unwrap();

    translator.start_capture().await.unwrap();
    for _ in 0..12 {
        translator.push_frame(vec![0.42; FRAME_LEN]).await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(server.hits(), 4);
    assert_eq!(translator.snapshot().await.unwrap().buffer, "A");

    let entry = translator.stop_capture().await.unwrap().unwrap();
    assert_eq!(entry.text, "A");

    translator.shutdown().await.unwrap();
    server.shutdown().await;
}

#[tokio::test]
async fn test_translator_survives_server_errors() {
    let server = MockClassifierServer::start(Reply::ServerError).await.unwrap();
    let config = TranslatorConfig::default().with_endpoint(server.endpoint.clone());
    let client = Arc::new(HttpClassificationClient::new(&config.classifier).unwrap());
    let translator = Translator::spawn(config, client, Arc::new(MultiSink::new())).unwrap();

    translator.start_capture().await.unwrap();
    for _ in 0..15 {
        translator.push_frame(vec![0.42; FRAME_LEN]).await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(server.hits(), 5);
    let snapshot = translator.snapshot().await.unwrap();
    assert_eq!(snapshot.buffer, "");
    assert!(snapshot.current_prediction.is_none());
    assert!(translator.stop_capture().await.unwrap().is_none());

    translator.shutdown().await.unwrap();
    server.shutdown().await;
}
