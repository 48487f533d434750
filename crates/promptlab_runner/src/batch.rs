//! Batch execution.
//!
//! A batch dispatches every request concurrently and waits for all of them.
//! Each request settles into exactly one [`CompletionResult`]; a failing
//! request never cancels or fails its siblings, and there is no batch-level
//! failure. Outputs are assembled in request order once all calls settle.
//! A service that panics fails only the request it was handling.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::service::CompletionService;
use crate::types::{BatchResult, CompletionRequest, CompletionResult};

/// Runs batches of completion requests against a service.
#[derive(Clone)]
pub struct BatchExecutor {
    service: Arc<dyn CompletionService>,
}

impl BatchExecutor {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<dyn CompletionService> {
        &self.service
    }

    /// Run one batch for a prompt.
    ///
    /// The number of in-flight calls is not bounded: it equals the number of
    /// requests. No retries and no timeout beyond the transport's own.
    pub async fn run_batch(
        &self,
        prompt_id: &str,
        requests: Vec<CompletionRequest>,
    ) -> BatchResult {
        info!(
            "Running batch of {} request(s) for prompt {} via {}",
            requests.len(),
            prompt_id,
            self.service.name()
        );

        let calls = requests
            .into_iter()
            .map(|request| self.execute_one(prompt_id, request));
        let outputs = join_all(calls).await;

        let batch = BatchResult::new(prompt_id, outputs);
        info!(
            "Batch {} finished: {} succeeded, {} failed",
            batch.id,
            batch.succeeded_count(),
            batch.failed_count()
        );
        batch
    }

    async fn execute_one(&self, prompt_id: &str, request: CompletionRequest) -> CompletionResult {
        debug!("Dispatching completion for set '{}'", request.set_name);

        let call = AssertUnwindSafe(self.service.complete(&request.prompt))
            .catch_unwind()
            .await;

        match call {
            Ok(Ok(response)) => CompletionResult::success(prompt_id, request, response),
            Ok(Err(err)) => {
                warn!("Completion for set '{}' failed: {}", request.set_name, err);
                CompletionResult::failure(prompt_id, request, err)
            }
            Err(payload) => {
                let message = format!("completion service panicked: {}", panic_message(&*payload));
                error!("Completion for set '{}' failed: {}", request.set_name, message);
                CompletionResult::failure(prompt_id, request, message)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// Run a batch against a service without keeping an executor around.
pub async fn run_batch(
    service: Arc<dyn CompletionService>,
    prompt_id: &str,
    requests: Vec<CompletionRequest>,
) -> BatchResult {
    BatchExecutor::new(service).run_batch(prompt_id, requests).await
}
