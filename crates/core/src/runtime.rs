//! Translator runtime
//!
//! Spawns one tokio task that owns the [`SessionManager`] and serializes the
//! three event sources onto it: handle commands (frames, start/stop, text
//! submissions), classification completions and the idle poll tick. Each
//! event is handled to completion before the next, so the stabilizer needs
//! no locking.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gesture_bridge_core::client::HttpClassificationClient;
//! use gesture_bridge_core::config::TranslatorConfig;
//! use gesture_bridge_core::events::MultiSink;
//! use gesture_bridge_core::runtime::Translator;
//!
//! # async fn run() -> gesture_bridge_core::Result<()> {
//! let config = TranslatorConfig::default();
//! let classifier = Arc::new(HttpClassificationClient::new(&config.classifier)?);
//! let translator = Translator::spawn(config, classifier, Arc::new(MultiSink::new()))?;
//!
//! translator.start_capture().await?;
//! translator.push_frame(vec![0.0; 126]).await?;
//! let archived = translator.stop_capture().await?;
//! translator.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::client::{ClassificationClient, ClassificationResult};
use crate::config::TranslatorConfig;
use crate::events::EventSink;
use crate::history::HistoryEntry;
use crate::session::{SessionManager, Snapshot};
use crate::{Error, Result};

/// Command queue depth between handles and the translator task
const COMMAND_CAPACITY: usize = 256;

enum Command {
    StartCapture(oneshot::Sender<u64>),
    StopCapture(oneshot::Sender<Option<HistoryEntry>>),
    Frame(Vec<f32>),
    SubmitText(String, oneshot::Sender<Result<()>>),
    ClearBuffer,
    ClearHistory,
    Snapshot(oneshot::Sender<Snapshot>),
    Shutdown,
}

enum Completion {
    Classified {
        epoch: u64,
        outcome: Result<Option<ClassificationResult>>,
    },
    TextRendered(String),
}

/// Handle to a running translator task
pub struct Translator {
    commands: mpsc::Sender<Command>,
    task: JoinHandle<()>,
}

impl Translator {
    /// Validate the configuration and spawn the translator task
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        config: TranslatorConfig,
        classifier: Arc<dyn ClassificationClient>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        let manager = SessionManager::new(&config, sink)?;
        let (commands, command_rx) = mpsc::channel(COMMAND_CAPACITY);

        tracing::info!(
            classifier = classifier.name(),
            decimation_factor = config.pipeline.decimation_factor,
            stability_threshold = config.pipeline.stability_threshold,
            "Translator starting"
        );

        let task = tokio::spawn(run(
            manager,
            classifier,
            command_rx,
            config.idle.poll_interval(),
            config.text_to_sign.latency(),
        ));

        Ok(Self { commands, task })
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::ChannelClosed)
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.send(make(tx)).await?;
        rx.await.map_err(|_| Error::ChannelClosed)
    }

    /// Begin a capture session; returns its epoch
    pub async fn start_capture(&self) -> Result<u64> {
        self.request(Command::StartCapture).await
    }

    /// End the capture session; returns the archived entry, if any
    pub async fn stop_capture(&self) -> Result<Option<HistoryEntry>> {
        self.request(Command::StopCapture).await
    }

    /// Push a raw landmark vector
    ///
    /// Malformed vectors are rejected inside the task and reported through
    /// the event sink, not here.
    pub async fn push_frame(&self, landmarks: Vec<f32>) -> Result<()> {
        self.send(Command::Frame(landmarks)).await
    }

    /// Submit text for text-to-sign rendering
    ///
    /// Returns once the submission is accepted; the history entry appears
    /// after the configured rendering latency.
    pub async fn submit_text(&self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        self.request(|tx| Command::SubmitText(text, tx)).await?
    }

    /// Discard the current text without archiving it
    pub async fn clear_buffer(&self) -> Result<()> {
        self.send(Command::ClearBuffer).await
    }

    pub async fn clear_history(&self) -> Result<()> {
        self.send(Command::ClearHistory).await
    }

    /// Current presentation state
    pub async fn snapshot(&self) -> Result<Snapshot> {
        self.request(Command::Snapshot).await
    }

    /// Stop the task after processing queued commands
    pub async fn shutdown(self) -> Result<()> {
        // The task may already be gone; joining below covers both cases
        let _ = self.commands.send(Command::Shutdown).await;
        self.task
            .await
            .map_err(|e| Error::Runtime(e.to_string()))
    }
}

async fn run(
    mut manager: SessionManager,
    classifier: Arc<dyn ClassificationClient>,
    mut commands: mpsc::Receiver<Command>,
    idle_poll: Duration,
    text_latency: Duration,
) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
    let mut ticker = tokio::time::interval(idle_poll);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                match command {
                    Command::StartCapture(reply) => {
                        let _ = reply.send(manager.start(Instant::now()));
                    }
                    Command::StopCapture(reply) => {
                        let _ = reply.send(manager.stop());
                    }
                    Command::Frame(values) => {
                        if let Ok(Some(dispatch)) = manager.on_frame(values) {
                            let classifier = classifier.clone();
                            let done_tx = done_tx.clone();
                            tokio::spawn(async move {
                                let outcome = classifier.classify(&dispatch.frame).await;
                                let _ = done_tx.send(Completion::Classified {
                                    epoch: dispatch.epoch,
                                    outcome,
                                });
                            });
                        }
                    }
                    Command::SubmitText(text, reply) => {
                        match manager.begin_text_to_sign(&text) {
                            Ok(text) => {
                                let done_tx = done_tx.clone();
                                tokio::spawn(async move {
                                    tokio::time::sleep(text_latency).await;
                                    let _ = done_tx.send(Completion::TextRendered(text));
                                });
                                let _ = reply.send(Ok(()));
                            }
                            Err(e) => {
                                let _ = reply.send(Err(e));
                            }
                        }
                    }
                    Command::ClearBuffer => manager.clear_buffer(),
                    Command::ClearHistory => manager.clear_history(),
                    Command::Snapshot(reply) => {
                        let _ = reply.send(manager.snapshot());
                    }
                    Command::Shutdown => break,
                }
            }
            Some(completion) = done_rx.recv() => {
                match completion {
                    Completion::Classified { epoch, outcome } => {
                        manager.on_classification(epoch, outcome, Instant::now());
                    }
                    Completion::TextRendered(text) => {
                        manager.complete_text_to_sign(text);
                    }
                }
            }
            _ = ticker.tick() => {
                manager.on_idle_tick(Instant::now());
            }
        }
    }

    manager.stop();
    manager.close();
    tracing::info!(epoch = manager.epoch(), "Translator stopped");
}
