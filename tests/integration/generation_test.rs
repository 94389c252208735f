//! Generation Integration Tests
//!
//! Drives `SowGenerator` against scripted transports: streamed revisions,
//! progress guarantees, failures, timeouts, cancellation and supersession.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use sow_studio::services::extraction::{SilentStatusClassifier, StreamExtractor};
use sow_studio::services::generation::{
    GenerationError, GenerationOutcome, GenerationRequest, GenerationStatus, Phase, Progress,
    SowGenerator,
};
use sow_studio_core::rate_card::{RateCard, RateCardEntry};
use sow_studio_llm::{ChatMode, ChatTarget, LlmError};
use tokio::sync::mpsc;

use super::support::{chunk, finalize, pricing_json, RejectingTransport, ScriptedTransport};

const WAIT: Duration = Duration::from_secs(5);

/// Collected callback traffic for one request.
struct Observed {
    updates: Arc<Mutex<Vec<Progress>>>,
    outcomes: mpsc::UnboundedReceiver<GenerationOutcome>,
    errors: mpsc::UnboundedReceiver<GenerationError>,
}

impl Observed {
    fn progress(&self) -> Vec<Progress> {
        self.updates.lock().unwrap().clone()
    }
}

fn observed_request(message: &str) -> (GenerationRequest, Observed) {
    let updates = Arc::new(Mutex::new(Vec::new()));
    let (outcome_tx, outcomes) = mpsc::unbounded_channel();
    let (error_tx, errors) = mpsc::unbounded_channel();

    let sink = updates.clone();
    let request = GenerationRequest::new(ChatTarget::workspace("sales"), message)
        .on_update(move |snapshot| sink.lock().unwrap().push(snapshot.progress()))
        .on_complete(move |outcome| {
            let _ = outcome_tx.send(outcome);
        })
        .on_error(move |err| {
            let _ = error_tx.send(err);
        });

    (
        request,
        Observed {
            updates,
            outcomes,
            errors,
        },
    )
}

async fn finish(handle: tokio::task::JoinHandle<()>) {
    tokio::time::timeout(WAIT, handle)
        .await
        .expect("generation task did not finish")
        .expect("generation task panicked");
}

// ============================================================================
// Streaming Scenarios
// ============================================================================

#[tokio::test]
async fn test_single_document_response() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_chunks(&[
        chunk("Thinking... "),
        chunk(&pricing_json(1100.0)),
        finalize(),
    ]);
    let generator = SowGenerator::new(transport.clone());

    let (request, mut observed) = observed_request("Website build");
    finish(generator.start(request)).await;

    let outcome = observed.outcomes.try_recv().expect("completed");
    assert_eq!(outcome.prose, "Thinking... ");
    assert_eq!(outcome.candidate_count, 1);
    assert_eq!(outcome.total_investment(), Some(1100.0));
    assert!(observed.errors.try_recv().is_err());

    let snapshot = generator.snapshot();
    assert_eq!(snapshot.status, GenerationStatus::Complete);
    assert!(!snapshot.is_generating);
    assert_eq!(snapshot.progress(), Progress::COMPLETE);
    assert_eq!(snapshot.total_investment, Some(1100.0));
}

#[tokio::test]
async fn test_single_document_plain_text_body() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_chunks(&[format!("Thinking... {}", pricing_json(1100.0))]);
    let generator = SowGenerator::new(transport);

    let (request, mut observed) = observed_request("Website build");
    finish(generator.start(request)).await;

    let outcome = observed.outcomes.try_recv().expect("completed");
    assert_eq!(outcome.prose, "Thinking... ");
    assert_eq!(outcome.raw_text, format!("Thinking... {}", pricing_json(1100.0)));
    assert_eq!(outcome.total_investment(), Some(1100.0));
}

#[tokio::test]
async fn test_repeated_document_does_not_refine() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_chunks(&[
        chunk(&format!("Proposal: {}", pricing_json(1500.0))),
        chunk(&format!(" Restated: {}", pricing_json(1500.0))),
    ]);
    let generator = SowGenerator::new(transport);

    let (request, mut observed) = observed_request("Build");
    finish(generator.start(request)).await;

    assert_eq!(observed.outcomes.try_recv().unwrap().candidate_count, 2);
    assert!(observed.progress().iter().all(|p| p.phase != Phase::Refining));
}

#[tokio::test]
async fn test_revised_document_replaces_earlier_one() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_chunks(&[
        chunk(&format!("Draft: {}", pricing_json(2000.0))),
        chunk(&format!(" Revised to fit budget: {}", pricing_json(1800.0))),
        finalize(),
    ]);
    let generator = SowGenerator::new(transport);

    let (request, mut observed) = observed_request("Keep it under $2k");
    finish(generator.start(request)).await;

    let outcome = observed.outcomes.try_recv().expect("completed");
    assert_eq!(outcome.candidate_count, 2);
    assert_eq!(outcome.total_investment(), Some(1800.0));

    let phases: Vec<Phase> = observed.progress().iter().map(|p| p.phase).collect();
    assert_eq!(phases, vec![Phase::Generating, Phase::Refining]);
}

#[tokio::test]
async fn test_response_without_document_completes() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_chunks(&[chunk("I need more detail about the integrations first."), finalize()]);
    let generator = SowGenerator::new(transport);

    let (request, mut observed) = observed_request("SOW please");
    finish(generator.start(request)).await;

    let outcome = observed.outcomes.try_recv().expect("completed");
    assert!(!outcome.has_document());
    assert_eq!(outcome.candidate_count, 0);
    assert_eq!(outcome.prose, "I need more detail about the integrations first.");
    assert_eq!(generator.snapshot().progress, 100);
}

#[tokio::test]
async fn test_progress_is_monotonic_and_capped() {
    let transport = Arc::new(ScriptedTransport::new());
    let replace = format!(
        "data: {}\n\n",
        serde_json::json!({ "type": "textResponse", "textResponse": "Short." })
    );
    transport.push_chunks(&[
        chunk(&"Scoping the landing pages. ".repeat(30)),
        replace,
        chunk(&pricing_json(3000.0)),
        chunk(&pricing_json(2900.0)),
        chunk(&pricing_json(2800.0)),
        chunk(&pricing_json(2700.0)),
        chunk(&pricing_json(2600.0)),
        chunk(&pricing_json(2500.0)),
        finalize(),
    ]);
    let generator = SowGenerator::new(transport);

    let (request, mut observed) = observed_request("Landing pages");
    finish(generator.start(request)).await;
    assert!(observed.outcomes.try_recv().is_ok());

    let updates = observed.progress();
    assert!(!updates.is_empty());
    for pair in updates.windows(2) {
        assert!(pair[1].percent >= pair[0].percent, "regressed: {:?}", pair);
        assert!(pair[1].phase >= pair[0].phase, "phase regressed: {:?}", pair);
    }
    assert!(updates.iter().all(|p| p.percent <= 90 && p.phase != Phase::Complete));
    assert_eq!(updates.last().map(|p| p.percent), Some(90));
    assert_eq!(generator.snapshot().progress(), Progress::COMPLETE);
}

#[tokio::test]
async fn test_request_target_and_mode_are_forwarded() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_chunks(&[chunk("ok")]);
    let generator = SowGenerator::new(transport.clone());

    let request = GenerationRequest::new(
        ChatTarget::workspace("sales").with_thread("t-42"),
        "Quote a HubSpot setup",
    )
    .mode(ChatMode::Query);
    finish(generator.start(request)).await;

    let sent = transport.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].target.workspace, "sales");
    assert_eq!(sent[0].target.thread.as_deref(), Some("t-42"));
    assert_eq!(sent[0].mode, ChatMode::Query);
    assert_eq!(sent[0].message, "Quote a HubSpot setup");
}

#[tokio::test]
async fn test_unknown_roles_are_flagged() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_chunks(&[chunk(&pricing_json(1200.0))]);
    let card = RateCard::from_entries(vec![RateCardEntry::new("Tech - Developer", 150.0)]).unwrap();
    let generator = SowGenerator::new(transport).with_rate_card(Arc::new(card));

    let (request, mut observed) = observed_request("Build");
    finish(generator.start(request)).await;

    let outcome = observed.outcomes.try_recv().expect("completed");
    assert_eq!(outcome.unknown_roles.len(), 1);
    assert_eq!(outcome.unknown_roles[0].role, "Tech - Producer");
    assert_eq!(outcome.unknown_roles[0].scope_name, "Build");
}

#[tokio::test]
async fn test_silent_classifier_leaves_status_empty() {
    let transport = Arc::new(ScriptedTransport::new());
    let tx = transport.push_stream();
    let generator = SowGenerator::new(transport)
        .with_extractor(StreamExtractor::new(Arc::new(SilentStatusClassifier)));
    let mut state = generator.subscribe();

    let (request, mut observed) = observed_request("Build");
    let handle = generator.start(request);
    tx.send(Ok(Bytes::from(chunk(&format!("Let me price this: {}", pricing_json(950.0))))))
        .unwrap();
    let status = tokio::time::timeout(WAIT, state.wait_for(|s| s.candidate_count == 1))
        .await
        .expect("document published")
        .unwrap()
        .status_message
        .clone();
    assert_eq!(status, "");

    drop(tx);
    finish(handle).await;
    assert_eq!(observed.outcomes.try_recv().unwrap().total_investment(), Some(950.0));
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_transport_failure_before_stream() {
    let generator = SowGenerator::new(Arc::new(RejectingTransport(
        LlmError::AuthenticationFailed {
            message: "bad key".to_string(),
        },
    )));

    let (request, mut observed) = observed_request("Build");
    finish(generator.start(request)).await;

    let err = observed.errors.try_recv().expect("errored");
    assert!(matches!(
        err,
        GenerationError::Transport(LlmError::AuthenticationFailed { .. })
    ));
    assert!(observed.outcomes.try_recv().is_err());
    assert!(observed.progress().is_empty());

    let snapshot = generator.snapshot();
    assert_eq!(snapshot.status, GenerationStatus::Errored);
    assert!(!snapshot.is_generating);
    assert_eq!(snapshot.error, Some(err));
}

#[tokio::test]
async fn test_network_error_mid_stream() {
    let transport = Arc::new(ScriptedTransport::new());
    let tx = transport.push_stream();
    tx.send(Ok(Bytes::from(chunk("Partial answer")))).unwrap();
    tx.send(Err(LlmError::NetworkError {
        message: "connection reset".to_string(),
    }))
    .unwrap();
    drop(tx);
    let generator = SowGenerator::new(transport);

    let (request, mut observed) = observed_request("Build");
    finish(generator.start(request)).await;

    let err = observed.errors.try_recv().expect("errored");
    assert_eq!(
        err,
        GenerationError::Transport(LlmError::NetworkError {
            message: "connection reset".to_string()
        })
    );
    assert!(observed.outcomes.try_recv().is_err());
    assert_eq!(observed.progress().len(), 1);
}

#[tokio::test]
async fn test_timeout_reports_error() {
    let transport = Arc::new(ScriptedTransport::new());
    let _held_open = transport.push_stream();
    let generator = SowGenerator::new(transport);

    let (request, mut observed) = observed_request("Build");
    let request = request.with_timeout(Duration::from_millis(50));
    finish(generator.start(request)).await;

    let err = observed.errors.try_recv().expect("timed out");
    assert_eq!(
        err,
        GenerationError::Timeout {
            after: Duration::from_millis(50)
        }
    );
    assert_eq!(generator.snapshot().status, GenerationStatus::Errored);
}

#[tokio::test]
async fn test_default_timeout_applies() {
    let transport = Arc::new(ScriptedTransport::new());
    let _held_open = transport.push_stream();
    let generator =
        SowGenerator::new(transport).with_default_timeout(Some(Duration::from_millis(30)));

    let (request, mut observed) = observed_request("Build");
    finish(generator.start(request)).await;

    assert!(matches!(
        observed.errors.try_recv(),
        Ok(GenerationError::Timeout { .. })
    ));
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancel_suppresses_later_callbacks() {
    let transport = Arc::new(ScriptedTransport::new());
    let tx = transport.push_stream();
    let generator = SowGenerator::new(transport);
    let mut state = generator.subscribe();

    let (request, mut observed) = observed_request("Build");
    let handle = generator.start(request);

    tx.send(Ok(Bytes::from(chunk(&pricing_json(1000.0))))).unwrap();
    tokio::time::timeout(WAIT, state.wait_for(|s| s.candidate_count == 1))
        .await
        .expect("first document published")
        .unwrap();

    generator.cancel();
    let seen_at_cancel = observed.progress().len();
    assert_eq!(generator.snapshot().status, GenerationStatus::Cancelled);
    assert!(!generator.is_generating());

    let _ = tx.send(Ok(Bytes::from(chunk(&pricing_json(900.0)))));
    drop(tx);
    finish(handle).await;

    assert_eq!(observed.progress().len(), seen_at_cancel);
    assert!(observed.outcomes.try_recv().is_err());
    assert!(observed.errors.try_recv().is_err());
    assert_eq!(generator.snapshot().status, GenerationStatus::Cancelled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_from_update_when_over_budget() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_chunks(&[
        chunk(&format!("Draft: {}", pricing_json(5000.0))),
        chunk(&format!(" Revised: {}", pricing_json(4800.0))),
    ]);
    let generator = SowGenerator::new(transport);

    let control = generator.clone();
    let (request, mut observed) = observed_request("Keep it under $2k");
    let request = request.on_update(move |snapshot| {
        if snapshot.total_investment.is_some_and(|total| total > 2000.0) {
            control.cancel();
        }
    });
    finish(generator.start(request)).await;

    assert!(observed.outcomes.try_recv().is_err());
    assert!(observed.errors.try_recv().is_err());
    assert_eq!(generator.snapshot().status, GenerationStatus::Cancelled);
    assert_eq!(generator.snapshot().total_investment, Some(5000.0));
}

#[tokio::test]
async fn test_cancel_is_idempotent() {
    let transport = Arc::new(ScriptedTransport::new());
    let _held_open = transport.push_stream();
    let generator = SowGenerator::new(transport);

    let (request, _observed) = observed_request("Build");
    let handle = generator.start(request);
    generator.cancel();
    generator.cancel();
    finish(handle).await;

    assert_eq!(generator.snapshot().status, GenerationStatus::Cancelled);
}

#[tokio::test]
async fn test_new_request_supersedes_previous() {
    let transport = Arc::new(ScriptedTransport::new());
    let first_tx = transport.push_stream();
    let generator = SowGenerator::new(transport.clone());
    let mut state = generator.subscribe();

    let (first, mut first_observed) = observed_request("First");
    let first_handle = generator.start(first);
    first_tx
        .send(Ok(Bytes::from(chunk("Let me think about this"))))
        .unwrap();
    tokio::time::timeout(WAIT, state.wait_for(|s| s.progress > 0))
        .await
        .expect("first request streaming")
        .unwrap();

    transport.push_chunks(&[chunk(&pricing_json(1500.0))]);
    let (second, mut second_observed) = observed_request("Second");
    let second_handle = generator.start(second);
    finish(second_handle).await;

    let _ = first_tx.send(Ok(Bytes::from(chunk(&pricing_json(99.0)))));
    drop(first_tx);
    finish(first_handle).await;

    let outcome = second_observed.outcomes.try_recv().expect("second completed");
    assert_eq!(outcome.total_investment(), Some(1500.0));
    assert!(first_observed.outcomes.try_recv().is_err());
    assert!(first_observed.errors.try_recv().is_err());
    assert_eq!(generator.snapshot().total_investment, Some(1500.0));
}

#[tokio::test]
async fn test_reset_after_completion() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_chunks(&[chunk(&pricing_json(800.0))]);
    let generator = SowGenerator::new(transport);

    let (request, _observed) = observed_request("Build");
    finish(generator.start(request)).await;
    assert_eq!(generator.snapshot().status, GenerationStatus::Complete);

    generator.reset();
    let snapshot = generator.snapshot();
    assert_eq!(snapshot.status, GenerationStatus::Idle);
    assert_eq!(snapshot.progress, 0);
    assert!(snapshot.document.is_none());
}
