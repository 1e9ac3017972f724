//! Self-correcting component generation.
//!
//! Drives the external completion service through a bounded
//! generate → validate → regenerate loop until the code passes every design-token
//! rule or the retry budget runs out.
//!
//! # Architecture
//!
//! - **provider**: `LlmProvider` trait with OpenAI-compatible and Anthropic implementations
//! - **demo**: offline provider that answers with a token-compliant fixture
//! - **orchestrator**: the retry state machine and its result record
//! - **usage**: token accounting across calls
//! - **progress**: terminal spinner via `indicatif`

pub mod demo;
pub mod orchestrator;
pub mod progress;
pub mod provider;
pub mod usage;

pub use demo::DemoProvider;
pub use orchestrator::{
    GenerationAttempt, GenerationOutcome, GenerationStatus, LoopConfig, LoopError, RetryBudget,
    run_generation,
};
pub use provider::{
    LlmProvider, LlmResponse, ProviderError, available_providers, create_provider,
    strip_code_fences,
};
pub use usage::Usage;
