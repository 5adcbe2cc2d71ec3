//! # Voxpos AI Integration
//!
//! Adapters for the two external collaborators of an ordering turn:
//! speech-to-text and intent inference.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │  Audio upload   │ --> │  Transcriber    │ --> │   Interpreter   │ --> raw intent JSON
//! │  (temp file)    │     │  (whisper-1)    │     │  (gpt-4o-mini)  │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! Both collaborators are prompted with the current menu, and both calls run
//! under a timeout. The raw JSON is handed back untouched; validation lives in
//! `voxpos-intent`.
//!
//! ## Usage
//!
//! ```ignore
//! use voxpos_ai::{AssistantConfig, OrderAssistant, Prompts};
//!
//! let assistant = OrderAssistant::from_config(AssistantConfig::from_env())?;
//! let prompts = Prompts::for_catalog(&catalog);
//! let interpretation = assistant.listen(&audio, Some("order.webm"), &prompts).await?;
//! ```

mod client;
mod config;
mod engine;
mod prompt;

pub use client::{ClientError, OpenAIClient};
pub use config::{
    AssistantConfig, AssistantConfigBuilder, DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL,
    DEFAULT_TRANSCRIPTION_MODEL,
};
pub use engine::{
    AssistantError, IntentInterpreter, Interpretation, OrderAssistant, Stage, Transcriber,
};
pub use prompt::{system_prompt, transcription_context, Prompts};
