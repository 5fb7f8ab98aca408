//! Gemini API integration
//!
//! Wire types for `generateContent` and the HTTP client that calls it.
//! The session talks to the client through [`ContentGenerator`] so the
//! exchange logic can be driven without a network.

pub mod api_client;
pub mod gemini_types;

pub use api_client::GeminiClient;

use crate::conversation::Turn;
use crate::error::ChatError;
use async_trait::async_trait;

/// Something that turns a conversation into the next model reply
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Produce the reply text for the full conversation `turns`
    async fn generate(&self, turns: &[Turn]) -> Result<String, ChatError>;
}
