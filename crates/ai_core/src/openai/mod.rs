//! OpenAI-compatible chat-completions backend

mod client;
pub mod wire;

pub use client::OpenAiCompatibleEngine;
