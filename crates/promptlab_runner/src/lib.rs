//! # promptlab_runner
//!
//! Completion services and batch execution for promptlab.
//!
//! # Features
//!
//! - **Service seam**: [`CompletionService`] abstracts the remote completion API
//! - **HTTP services**: a `{ prompt }` endpoint client and a direct OpenAI client
//! - **Batch executor**: concurrent fan-out with per-request failure isolation
//! - **Mock service**: for testing without a network
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use promptlab_runner::{BatchExecutor, CompletionRequest, OpenAiService};
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = Arc::new(OpenAiService::new("sk-...", None));
//!     let executor = BatchExecutor::new(service);
//!
//!     let batch = executor
//!         .run_batch("prompt-1", vec![
//!             CompletionRequest::new("Say hi in French", "french"),
//!             CompletionRequest::new("Say hi in German", "german"),
//!         ])
//!         .await;
//!
//!     for output in &batch.outputs {
//!         println!("{}: {}", output.set_name, output.content);
//!     }
//! }
//! ```

pub mod batch;
pub mod error;
pub mod http;
pub mod mock;
pub mod service;
pub mod types;

pub use batch::{run_batch, BatchExecutor};
pub use error::{RunnerError, RunnerResult};
pub use http::{
    interpret_endpoint_response, parse_openai_response, EndpointService, OpenAiService,
    DEFAULT_MAX_TOKENS, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL,
};
pub use mock::{MockCompletionService, MockReply};
pub use service::CompletionService;
pub use types::{
    parse_timestamp, BatchResult, CompletionRequest, CompletionResponse, CompletionResult,
    TokenUsage,
};
