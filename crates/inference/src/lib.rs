//! Boundary to the hosted language model.
//!
//! Handlers depend on the [`TextGenerator`] capability only; the
//! [`HuggingFaceClient`] is the production implementation and tests swap in
//! their own.

pub mod client;
pub mod error;

pub use client::{HuggingFaceClient, HuggingFaceConfig};
pub use error::InferenceError;

use async_trait::async_trait;

/// Given a prompt, produce text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String, InferenceError>;
}
