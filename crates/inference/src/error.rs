//! Inference failures.

use thiserror::Error;

/// Why a generation call produced no text.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// No API key was configured.
    #[error("inference API key is not configured")]
    MissingApiKey,

    /// Transport failure or undecodable body.
    #[error("inference request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("inference endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The endpoint answered but without any generated text.
    #[error("inference endpoint returned no choices")]
    EmptyResponse,
}
