//! Generate Command
//!
//! Runs one SOW generation against AnythingLLM and waits for the outcome.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sow_studio_core::rate_card::RateCardLookup;
use sow_studio_llm::{ChatMode, ChatTarget, ChatTransport, HttpChatTransport};
use tokio::sync::mpsc;

use super::rate_card::load_rate_card;
use crate::models::settings::AppConfig;
use crate::services::generation::{
    progress_message, GenerationError, GenerationOutcome, GenerationRequest, SowGenerator,
};
use crate::services::pricing::extract_discount_from_prompt;
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    pub workspace: Option<String>,
    pub thread: Option<String>,
    pub mode: Option<ChatMode>,
    pub timeout_secs: Option<u64>,
    pub message: String,
}

/// Generate against the configured AnythingLLM instance.
pub async fn run_generate(config: &AppConfig, args: GenerateArgs) -> AppResult<GenerationOutcome> {
    let transport: Arc<dyn ChatTransport> = Arc::new(HttpChatTransport::new(config.anythingllm())?);
    let rate_card: Option<Arc<dyn RateCardLookup>> = match &config.rate_card_path {
        Some(path) => Some(Arc::new(load_rate_card(path)?)),
        None => None,
    };
    generate_with(transport, rate_card, config, args).await
}

/// Same as [`run_generate`] over any transport.
pub async fn generate_with(
    transport: Arc<dyn ChatTransport>,
    rate_card: Option<Arc<dyn RateCardLookup>>,
    config: &AppConfig,
    args: GenerateArgs,
) -> AppResult<GenerationOutcome> {
    let workspace = args
        .workspace
        .or_else(|| config.default_workspace.clone())
        .filter(|w| !w.trim().is_empty())
        .ok_or_else(|| {
            AppError::config("no workspace given and no default_workspace configured")
        })?;
    if args.message.trim().is_empty() {
        return Err(AppError::validation("message must not be empty"));
    }

    let requested_discount = extract_discount_from_prompt(&args.message);
    if requested_discount > 0.0 {
        tracing::info!("[Generate] Prompt requests a {}% discount", requested_discount);
    }

    let mut target = ChatTarget::workspace(workspace);
    if let Some(thread) = args.thread {
        target = target.with_thread(thread);
    }

    let mut generator =
        SowGenerator::new(transport).with_default_timeout(config.request_timeout());
    if let Some(card) = rate_card {
        generator = generator.with_rate_card(card);
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<Result<GenerationOutcome, GenerationError>>();
    let error_tx = tx.clone();
    let last_reported = Arc::new(AtomicU8::new(0));

    let mut request = GenerationRequest::new(target, args.message)
        .mode(args.mode.unwrap_or_else(|| config.chat_mode()))
        .on_update(move |snapshot| {
            if last_reported.swap(snapshot.progress, Ordering::Relaxed) != snapshot.progress {
                tracing::info!("[Generate] {}% {}", snapshot.progress, progress_message(snapshot));
            }
        })
        .on_complete(move |outcome| {
            let _ = tx.send(Ok(outcome));
        })
        .on_error(move |err| {
            let _ = error_tx.send(Err(err));
        });
    if let Some(secs) = args.timeout_secs {
        request = request.with_timeout(Duration::from_secs(secs));
    }

    let mut handle = generator.start(request);
    tokio::select! {
        joined = &mut handle => {
            joined.map_err(|e| AppError::internal(format!("generation task failed: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("[Generate] Interrupted, cancelling");
            generator.cancel();
            let _ = handle.await;
        }
    }

    let outcome = match rx.try_recv() {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => return Err(err.into()),
        Err(_) => return Err(GenerationError::Cancelled.into()),
    };

    if requested_discount > 0.0 {
        if let Some(doc) = &outcome.document {
            let applied = doc.discount.unwrap_or(0.0);
            if (applied - requested_discount).abs() > f64::EPSILON {
                tracing::warn!(
                    "[Generate] Requested {}% discount but the document applies {}%",
                    requested_discount,
                    applied
                );
            }
        }
    }

    Ok(outcome)
}
