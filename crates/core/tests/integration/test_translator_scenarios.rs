//! End-to-end translator scenarios
//!
//! Drives a spawned `Translator` with a scripted classifier under paused
//! tokio time, so idle pauses and delayed responses are deterministic.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gesture_bridge_core::client::{ScriptedClassifier, ScriptedResponse};
use gesture_bridge_core::config::{PipelineConfig, TranslatorConfig};
use gesture_bridge_core::events::{
    ChannelSink, EventSink, EventSinkError, MultiSink, TranslatorEvent,
};
use gesture_bridge_core::{CaptureState, Translator, TranslationMode, FRAME_LEN};
use tokio::sync::broadcast;

fn frame() -> Vec<f32> {
    vec![0.5; FRAME_LEN]
}

async fn push_frames(translator: &Translator, count: usize) {
    for _ in 0..count {
        translator.push_frame(frame()).await.unwrap();
    }
}

/// Let queued frames and completions drain without crossing an idle poll
async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

fn spawn(config: TranslatorConfig, classifier: Arc<ScriptedClassifier>) -> Translator {
    Translator::spawn(config, classifier, Arc::new(MultiSink::new())).unwrap()
}

fn spawn_observed(
    config: TranslatorConfig,
    classifier: Arc<ScriptedClassifier>,
) -> (Translator, broadcast::Receiver<TranslatorEvent>) {
    let (sink, receiver) = ChannelSink::new(1024);
    let translator = Translator::spawn(config, classifier, Arc::new(sink)).unwrap();
    (translator, receiver)
}

fn drain(receiver: &mut broadcast::Receiver<TranslatorEvent>) -> Vec<TranslatorEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

fn labels(sequence: &[&str]) -> Vec<ScriptedResponse> {
    sequence
        .iter()
        .map(|l| ScriptedResponse::label(*l, 0.9))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_repeated_label_appended_once() {
    let classifier = Arc::new(ScriptedClassifier::constant(ScriptedResponse::label("A", 0.9)));
    let translator = spawn(TranslatorConfig::default(), classifier.clone());

    translator.start_capture().await.unwrap();
    push_frames(&translator, 30).await;
    settle().await;

    assert_eq!(classifier.calls(), 10);
    let snapshot = translator.snapshot().await.unwrap();
    assert_eq!(snapshot.buffer, "A");
    assert_eq!(snapshot.stats.signs_detected, 1);
    assert_eq!(snapshot.current_prediction.unwrap().label, "A");

    translator.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_idle_pause_inserts_separator() {
    let classifier = Arc::new(ScriptedClassifier::constant(ScriptedResponse::label("A", 0.9)));
    let (translator, mut events) = spawn_observed(TranslatorConfig::default(), classifier);

    translator.start_capture().await.unwrap();
    push_frames(&translator, 12).await;
    settle().await;
    assert_eq!(translator.snapshot().await.unwrap().buffer, "A");

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(translator.snapshot().await.unwrap().buffer, "A ");

    push_frames(&translator, 12).await;
    settle().await;

    let snapshot = translator.snapshot().await.unwrap();
    assert_eq!(snapshot.buffer, "A A");
    assert_eq!(snapshot.stats.words_translated, 1);

    // Only one separator however long the pause lasts
    tokio::time::sleep(Duration::from_millis(2500)).await;
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(translator.snapshot().await.unwrap().buffer, "A A ");

    let separators = drain(&mut events)
        .into_iter()
        .filter(|e| e.event_type() == "separator_inserted")
        .count();
    assert_eq!(separators, 2);

    translator.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_no_separator_on_empty_buffer() {
    let classifier = Arc::new(ScriptedClassifier::constant(ScriptedResponse::Absent));
    let translator = spawn(TranslatorConfig::default(), classifier);

    translator.start_capture().await.unwrap();
    push_frames(&translator, 12).await;
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(translator.snapshot().await.unwrap().buffer, "");
    translator.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_server_errors_leave_buffer_empty() {
    let classifier = Arc::new(ScriptedClassifier::failing(500));
    let (translator, mut events) = spawn_observed(TranslatorConfig::default(), classifier.clone());

    translator.start_capture().await.unwrap();
    push_frames(&translator, 15).await;
    settle().await;

    assert_eq!(classifier.calls(), 5);
    let snapshot = translator.snapshot().await.unwrap();
    assert_eq!(snapshot.buffer, "");
    assert_eq!(snapshot.state, CaptureState::Capturing);
    assert!(snapshot.current_prediction.is_none());

    let failures = drain(&mut events)
        .into_iter()
        .filter(|e| matches!(e, TranslatorEvent::ClassificationFailed { .. }))
        .count();
    assert_eq!(failures, 5);

    // The pipeline keeps running after failures
    assert!(translator.stop_capture().await.unwrap().is_none());
    translator.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_low_confidence_never_appends() {
    let classifier = Arc::new(ScriptedClassifier::constant(ScriptedResponse::label("B", 0.59)));
    let translator = spawn(TranslatorConfig::default(), classifier);

    translator.start_capture().await.unwrap();
    push_frames(&translator, 30).await;
    settle().await;

    let snapshot = translator.snapshot().await.unwrap();
    assert_eq!(snapshot.buffer, "");
    assert_eq!(snapshot.stats.signs_detected, 0);
    translator.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_stop_archives_hello_and_drops_late_response() {
    let classifier = Arc::new(ScriptedClassifier::sequence(labels(&[
        "H", "H", "E", "E", "L", "L", "L", "O", "O",
    ])));
    classifier.push_delayed(ScriptedResponse::label("X", 0.99), Duration::from_millis(1000));

    let pipeline = PipelineConfig {
        dedupe_enabled: false,
        ..Default::default()
    };
    let (translator, mut events) = spawn_observed(
        TranslatorConfig::default().with_pipeline(pipeline),
        classifier.clone(),
    );

    let first = translator.start_capture().await.unwrap();
    push_frames(&translator, 27).await;
    settle().await;
    assert_eq!(translator.snapshot().await.unwrap().buffer, "HELLO");

    // In flight when the session ends
    push_frames(&translator, 3).await;
    let entry = translator.stop_capture().await.unwrap().unwrap();
    assert_eq!(entry.text, "HELLO");
    assert_eq!(entry.mode, TranslationMode::SignToText);

    let second = translator.start_capture().await.unwrap();
    assert_eq!(second, first + 1);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(classifier.calls(), 10);

    let snapshot = translator.snapshot().await.unwrap();
    assert_eq!(snapshot.buffer, "");
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(snapshot.history[0].text, "HELLO");
    assert_eq!(snapshot.history[0].mode, TranslationMode::SignToText);

    let stale = drain(&mut events).into_iter().find_map(|e| match e {
        TranslatorEvent::StaleResponseDropped {
            origin_epoch,
            current_epoch,
            ..
        } => Some((origin_epoch, current_epoch)),
        _ => None,
    });
    assert_eq!(stale, Some((first, second)));

    translator.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_text_to_sign_leaves_buffer() {
    let classifier = Arc::new(ScriptedClassifier::constant(ScriptedResponse::label("A", 0.9)));
    let translator = spawn(TranslatorConfig::default(), classifier);

    translator.start_capture().await.unwrap();
    push_frames(&translator, 6).await;
    settle().await;

    translator.submit_text("HI").await.unwrap();
    assert!(translator.snapshot().await.unwrap().text_to_sign_pending);

    tokio::time::sleep(Duration::from_millis(600)).await;

    let snapshot = translator.snapshot().await.unwrap();
    assert!(!snapshot.text_to_sign_pending);
    assert_eq!(snapshot.buffer, "A");
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(snapshot.history[0].text, "HI");
    assert_eq!(snapshot.history[0].mode, TranslationMode::TextToSign);
    assert_eq!(snapshot.sign_display.as_deref(), Some("🤟🤙"));

    translator.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_empty_text_rejected() {
    let classifier = Arc::new(ScriptedClassifier::constant(ScriptedResponse::Absent));
    let translator = spawn(TranslatorConfig::default(), classifier);

    assert!(translator.submit_text("   ").await.is_err());
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(translator.snapshot().await.unwrap().history.is_empty());

    translator.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_decimation_forwards_every_third_frame() {
    let classifier = Arc::new(ScriptedClassifier::constant(ScriptedResponse::Absent));
    let translator = spawn(TranslatorConfig::default(), classifier.clone());

    // Ignored while idle
    push_frames(&translator, 5).await;
    settle().await;
    assert_eq!(classifier.calls(), 0);

    translator.start_capture().await.unwrap();
    let mut pushed = 0;
    for batch in [1, 1, 1, 4, 3, 7] {
        push_frames(&translator, batch).await;
        pushed += batch;
        settle().await;
        assert_eq!(classifier.calls(), pushed / 3);
    }

    // Restarting resets the frame counter
    translator.stop_capture().await.unwrap();
    translator.start_capture().await.unwrap();
    let before = classifier.calls();
    push_frames(&translator, 2).await;
    settle().await;
    assert_eq!(classifier.calls(), before);

    translator.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_malformed_frame_reported_and_skipped() {
    let classifier = Arc::new(ScriptedClassifier::constant(ScriptedResponse::Absent));
    let (translator, mut events) = spawn_observed(TranslatorConfig::default(), classifier.clone());

    translator.start_capture().await.unwrap();
    translator.push_frame(vec![0.5; FRAME_LEN - 1]).await.unwrap();
    let mut nan = frame();
    nan[7] = f32::NAN;
    translator.push_frame(nan).await.unwrap();
    push_frames(&translator, 3).await;
    settle().await;

    assert_eq!(classifier.calls(), 1);
    let malformed = drain(&mut events)
        .into_iter()
        .filter(|e| e.event_type() == "malformed_frame")
        .count();
    assert_eq!(malformed, 2);

    translator.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_clear_buffer_and_history() {
    let classifier = Arc::new(ScriptedClassifier::constant(ScriptedResponse::label("A", 0.9)));
    let translator = spawn(TranslatorConfig::default(), classifier);

    translator.start_capture().await.unwrap();
    push_frames(&translator, 6).await;
    settle().await;
    translator.clear_buffer().await.unwrap();
    let snapshot = translator.snapshot().await.unwrap();
    assert_eq!(snapshot.buffer, "");
    assert_eq!(snapshot.state, CaptureState::Capturing);
    assert!(translator.stop_capture().await.unwrap().is_none());

    translator.submit_text("OK").await.unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(translator.snapshot().await.unwrap().history.len(), 1);

    translator.clear_history().await.unwrap();
    assert!(translator.snapshot().await.unwrap().history.is_empty());

    translator.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_history_capacity() {
    let classifier = Arc::new(ScriptedClassifier::constant(ScriptedResponse::Absent));
    let translator = spawn(TranslatorConfig::default(), classifier);

    for i in 0..51 {
        translator.submit_text(format!("T{}", i)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    tokio::time::sleep(Duration::from_millis(600)).await;

    let history = translator.snapshot().await.unwrap().history;
    assert_eq!(history.len(), 50);
    assert_eq!(history[0].text, "T50");
    assert_eq!(history[49].text, "T1");

    translator.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_out_of_order_completions_accepted_in_arrival_order() {
    // Two slow "B" answers, then two fast "C" answers within one session
    let classifier = Arc::new(
        ScriptedClassifier::sequence(labels(&["B", "B"])).with_delay(Duration::from_millis(200)),
    );
    classifier.push_delayed(ScriptedResponse::label("C", 0.9), Duration::from_millis(1));
    classifier.push_delayed(ScriptedResponse::label("C", 0.9), Duration::from_millis(1));
    let translator = spawn(TranslatorConfig::default(), classifier.clone());

    translator.start_capture().await.unwrap();
    push_frames(&translator, 12).await;
    settle().await;
    assert_eq!(classifier.calls(), 4);
    assert_eq!(translator.snapshot().await.unwrap().buffer, "C");

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(translator.snapshot().await.unwrap().buffer, "CB");

    translator.shutdown().await.unwrap();
}

struct ClosingSink {
    closed: Arc<AtomicBool>,
}

impl EventSink for ClosingSink {
    fn emit(&self, _event: TranslatorEvent) -> Result<(), EventSinkError> {
        Ok(())
    }

    fn close(&self) -> Result<(), EventSinkError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_closes_event_sink() {
    let closed = Arc::new(AtomicBool::new(false));
    let sink = ClosingSink {
        closed: closed.clone(),
    };
    let classifier = Arc::new(ScriptedClassifier::constant(ScriptedResponse::Absent));
    let translator =
        Translator::spawn(TranslatorConfig::default(), classifier, Arc::new(sink)).unwrap();

    translator.start_capture().await.unwrap();
    assert!(!closed.load(Ordering::SeqCst));

    translator.shutdown().await.unwrap();
    assert!(closed.load(Ordering::SeqCst));
}
