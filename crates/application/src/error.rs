//! Application-level errors

use ai_core::InferenceError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The chat model call failed
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    /// The model kept requesting tools past the iteration bound
    #[error("Tool loop did not finish within {0} model calls")]
    ToolLoopLimit(usize),
}
