//! AI provider integration
//!
//! A thin layer: prompts are formatted from local data, sent through an
//! `LlmClient`, and replies are parsed and validated before anything is
//! stored.

pub mod client;
pub mod prompt;
pub mod response;
pub mod sse;

pub use client::{ChatMessage, ChatRequest, HttpLlmClient, LlmClient, Role};
pub use prompt::{categorization_prompt, chat_prompt, insights_prompt};
pub use response::{
    extract_json, parse_categorizations, parse_insights, strip_code_fences, AiCategorization,
    Insight,
};
pub use sse::{extract_delta, SseEvent, SseParser};
