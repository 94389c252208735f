//! SOW Generation State Machine
//!
//! Drives one generation request at a time:
//! `Idle -> Generating -> {Complete | Errored | Cancelled}`.
//!
//! Each request runs on its own Tokio task that owns the accumulator. State
//! changes and callbacks go through a dispatch gate shared with `start`,
//! `cancel` and `reset`: once `cancel` returns, no callback of the cancelled
//! request starts. The gate is re-entrant, so callbacks may call the control
//! methods of the generator that is dispatching them.

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use parking_lot::ReentrantMutex;
use sow_studio_core::rate_card::RateCardLookup;
use sow_studio_core::streaming::{StreamAdapter, StreamEvent};
use sow_studio_llm::{AnythingLlmAdapter, ChatRequest, ChatTransport, LlmError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::error::{GenerationError, GenerationResult};
use super::progress::{derive_progress, Progress, ProgressTracker};
use super::request::{CompleteCallback, ErrorCallback, GenerationRequest, UpdateCallback};
use super::snapshot::{GenerationOutcome, GenerationSnapshot, GenerationStatus};
use crate::services::extraction::{strip_document_spans, StreamExtractor};

struct ActiveRun {
    id: Uuid,
    token: CancellationToken,
}

#[derive(Default)]
struct Gate {
    active: Option<ActiveRun>,
}

impl Gate {
    fn is_active(&self, id: Uuid) -> bool {
        self.active.as_ref().is_some_and(|run| run.id == id)
    }
}

/// Held across callbacks; the `RefCell` is only borrowed between them.
type SharedGate = Arc<ReentrantMutex<RefCell<Gate>>>;

/// Streaming SOW generator.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct SowGenerator {
    transport: Arc<dyn ChatTransport>,
    extractor: StreamExtractor,
    rate_card: Option<Arc<dyn RateCardLookup>>,
    default_timeout: Option<Duration>,
    state: Arc<watch::Sender<GenerationSnapshot>>,
    gate: SharedGate,
}

impl SowGenerator {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        let (state, _) = watch::channel(GenerationSnapshot::default());
        Self {
            transport,
            extractor: StreamExtractor::default(),
            rate_card: None,
            default_timeout: None,
            state: Arc::new(state),
            gate: Arc::new(ReentrantMutex::new(RefCell::new(Gate::default()))),
        }
    }

    /// Flag document roles missing from `rate_card` in each outcome.
    pub fn with_rate_card(mut self, rate_card: Arc<dyn RateCardLookup>) -> Self {
        self.rate_card = Some(rate_card);
        self
    }

    pub fn with_extractor(mut self, extractor: StreamExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Timeout for requests that don't set their own.
    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Start a request, cancelling any request still in flight.
    ///
    /// Must be called within a Tokio runtime. The handle resolves when the
    /// request task exits; results arrive through the callbacks.
    pub fn start(&self, request: GenerationRequest) -> JoinHandle<()> {
        let token = CancellationToken::new();
        let id = Uuid::new_v4();
        {
            let guard = self.gate.lock();
            let mut gate = guard.borrow_mut();
            if let Some(previous) = gate.active.take() {
                previous.token.cancel();
                tracing::info!("[SowGen] Request {} superseded by {}", previous.id, id);
            }
            gate.active = Some(ActiveRun {
                id,
                token: token.clone(),
            });
            self.state.send_replace(GenerationSnapshot::started());
        }

        tracing::info!(
            "[SowGen] Starting request {} (workspace={}, thread={:?}, mode={})",
            id,
            request.chat.target.workspace,
            request.chat.target.thread,
            request.chat.mode.as_str()
        );

        let run = Run {
            id,
            token,
            transport: self.transport.clone(),
            extractor: self.extractor.clone(),
            rate_card: self.rate_card.clone(),
            state: self.state.clone(),
            gate: self.gate.clone(),
        };
        let timeout = request.timeout.or(self.default_timeout);
        tokio::spawn(run.execute(request, timeout))
    }

    /// Abort the in-flight request, if any. Idempotent.
    pub fn cancel(&self) {
        let guard = self.gate.lock();
        let active = guard.borrow_mut().active.take();
        if let Some(run) = active {
            run.token.cancel();
            self.state.send_modify(|s| {
                s.status = GenerationStatus::Cancelled;
                s.is_generating = false;
            });
            tracing::info!("[SowGen] Request {} cancelled", run.id);
        }
    }

    /// Cancel anything in flight and return to `Idle`.
    pub fn reset(&self) {
        let guard = self.gate.lock();
        let active = guard.borrow_mut().active.take();
        if let Some(run) = active {
            run.token.cancel();
            tracing::debug!("[SowGen] Request {} dropped by reset", run.id);
        }
        self.state.send_replace(GenerationSnapshot::default());
    }

    pub fn snapshot(&self) -> GenerationSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GenerationSnapshot> {
        self.state.subscribe()
    }

    pub fn is_generating(&self) -> bool {
        self.state.borrow().is_generating
    }
}

/// Everything one request task needs.
struct Run {
    id: Uuid,
    token: CancellationToken,
    transport: Arc<dyn ChatTransport>,
    extractor: StreamExtractor,
    rate_card: Option<Arc<dyn RateCardLookup>>,
    state: Arc<watch::Sender<GenerationSnapshot>>,
    gate: SharedGate,
}

impl Run {
    async fn execute(self, request: GenerationRequest, timeout: Option<Duration>) {
        let GenerationRequest {
            chat,
            on_update,
            on_complete,
            on_error,
            ..
        } = request;

        let streamed = {
            let work = self.stream(&chat, on_update.as_ref());
            let bounded = async {
                match timeout {
                    Some(after) => tokio::time::timeout(after, work)
                        .await
                        .unwrap_or(Err(GenerationError::Timeout { after })),
                    None => work.await,
                }
            };
            tokio::select! {
                _ = self.token.cancelled() => Err(GenerationError::Cancelled),
                result = bounded => result,
            }
        };

        match streamed {
            Ok(text) => self.complete(text, on_complete),
            Err(GenerationError::Cancelled) => {
                tracing::debug!("[SowGen] Request {} stopped", self.id);
            }
            Err(err) => self.fail(err, on_error),
        }
    }

    /// Read the body to the end, publishing an update per applied event.
    async fn stream(
        &self,
        chat: &ChatRequest,
        on_update: Option<&UpdateCallback>,
    ) -> GenerationResult<String> {
        let mut body = self.transport.open_stream(chat).await?;
        tracing::debug!("[SowGen] Request {} stream opened via {}", self.id, self.transport.name());

        let mut adapter = AnythingLlmAdapter::new();
        let mut tracker = ProgressTracker::new();
        let mut buffer: Vec<u8> = Vec::new();
        let mut text = String::new();

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            buffer.extend_from_slice(&chunk);

            // Process complete lines
            while let Some(line_end) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=line_end).collect();
                let line = String::from_utf8_lossy(&line[..line_end]);
                if self.apply_line(&mut adapter, &line, true, &mut text)? {
                    self.publish(&text, &mut tracker, on_update)?;
                }
            }
        }

        // Final line without a trailing newline
        if !buffer.is_empty() {
            let line = String::from_utf8_lossy(&buffer).into_owned();
            if self.apply_line(&mut adapter, &line, false, &mut text)? {
                self.publish(&text, &mut tracker, on_update)?;
            }
        }

        tracing::debug!(
            "[SowGen] Request {} stream ended ({} chars)",
            self.id,
            text.len()
        );
        Ok(text)
    }

    /// Apply one line to the accumulator. Returns whether the text changed.
    fn apply_line(
        &self,
        adapter: &mut AnythingLlmAdapter,
        line: &str,
        terminated: bool,
        text: &mut String,
    ) -> GenerationResult<bool> {
        let adapted = if terminated {
            adapter.adapt(line)
        } else {
            adapter.adapt_unterminated(line)
        };
        let events = adapted.map_err(|e| {
            tracing::warn!("[SowGen] Request {} malformed stream record: {}", self.id, e);
            LlmError::ParseError {
                message: e.to_string(),
            }
        })?;

        let mut changed = false;
        for event in events {
            match event {
                StreamEvent::TextDelta { content } => {
                    text.push_str(&content);
                    changed = true;
                }
                StreamEvent::TextReplace { content } => {
                    *text = content;
                    changed = true;
                }
                StreamEvent::Error { message, code } => {
                    tracing::warn!(
                        "[SowGen] Request {} backend error ({:?}): {}",
                        self.id,
                        code,
                        message
                    );
                    return Err(LlmError::ServerError {
                        message,
                        status: None,
                    }
                    .into());
                }
                StreamEvent::Complete { reason } => {
                    tracing::debug!("[SowGen] Request {} backend closed: {:?}", self.id, reason);
                }
            }
        }
        Ok(changed)
    }

    fn publish(
        &self,
        text: &str,
        tracker: &mut ProgressTracker,
        on_update: Option<&UpdateCallback>,
    ) -> GenerationResult<()> {
        let result = self.extractor.extract(text);
        let progress: Progress = tracker.observe(derive_progress(&result, text));
        let snapshot = GenerationSnapshot {
            status: GenerationStatus::Generating,
            is_generating: true,
            phase: progress.phase,
            progress: progress.percent,
            status_message: result.status_message,
            prose: strip_document_spans(text),
            total_investment: result.total_investment,
            document: result.latest_document,
            candidate_count: result.candidate_count,
            error: None,
        };

        let guard = self.gate.lock();
        if !guard.borrow().is_active(self.id) {
            return Err(GenerationError::Cancelled);
        }
        tracing::debug!(
            "[SowGen] Request {} {} {}% ({} document(s))",
            self.id,
            snapshot.phase,
            snapshot.progress,
            snapshot.candidate_count
        );
        self.state.send_replace(snapshot.clone());
        if let Some(callback) = on_update {
            callback(&snapshot);
        }
        drop(guard);
        Ok(())
    }

    fn complete(&self, text: String, on_complete: Option<CompleteCallback>) {
        let result = self.extractor.extract(&text);
        let prose = strip_document_spans(&text);
        let unknown_roles = match (&result.latest_document, &self.rate_card) {
            (Some(document), Some(card)) => document.unknown_roles(card.as_ref()),
            _ => Vec::new(),
        };
        for unknown in &unknown_roles {
            tracing::warn!(
                "[SowGen] Role '{}' in scope {} ('{}') is not on the rate card",
                unknown.role,
                unknown.scope_index,
                unknown.scope_name
            );
        }

        let outcome = GenerationOutcome {
            prose: prose.clone(),
            document: result.latest_document.clone(),
            candidate_count: result.candidate_count,
            raw_text: text,
            unknown_roles,
        };
        let complete = Progress::COMPLETE;
        let snapshot = GenerationSnapshot {
            status: GenerationStatus::Complete,
            is_generating: false,
            phase: complete.phase,
            progress: complete.percent,
            status_message: "SOW generation complete".to_string(),
            prose,
            document: result.latest_document,
            candidate_count: result.candidate_count,
            total_investment: result.total_investment,
            error: None,
        };

        let guard = self.gate.lock();
        if !release(&guard, self.id) {
            return;
        }
        tracing::info!(
            "[SowGen] Request {} complete: {} document(s), total {:?}",
            self.id,
            outcome.candidate_count,
            outcome.total_investment()
        );
        self.state.send_replace(snapshot);
        if let Some(callback) = on_complete {
            callback(outcome);
        }
    }

    fn fail(&self, error: GenerationError, on_error: Option<ErrorCallback>) {
        let guard = self.gate.lock();
        if !release(&guard, self.id) {
            return;
        }
        tracing::warn!("[SowGen] Request {} failed: {}", self.id, error);
        self.state.send_modify(|s| {
            s.status = GenerationStatus::Errored;
            s.is_generating = false;
            s.status_message = error.to_string();
            s.error = Some(error.clone());
        });
        if let Some(callback) = on_error {
            callback(error);
        }
    }
}

/// Clear the active run if it is still `id`. Returns whether it was.
fn release(gate: &RefCell<Gate>, id: Uuid) -> bool {
    let mut gate = gate.borrow_mut();
    if !gate.is_active(id) {
        return false;
    }
    gate.active = None;
    true
}
