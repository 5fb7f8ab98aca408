//! Gemini Chat Library
//!
//! A chat component that sends the whole conversation to the Gemini
//! `generateContent` API on every user submission and shows the reply.
//! The terminal front-end lives in `src/main.rs`.

pub mod config;
pub mod conversation;
pub mod display;
pub mod error;
pub mod gemini;
pub mod session;
pub mod terminal;

pub use config::{load_credential, ApiKey, AppConfig, GeminiConfig};
pub use conversation::{Conversation, Role, Turn};
pub use display::{ChatView, DisplayEvent, DisplayQueue};
pub use error::{ChatError, ConfigError};
pub use gemini::{ContentGenerator, GeminiClient};
pub use session::{ChatSession, RejectReason, SubmitOutcome, ERROR_MESSAGE};
