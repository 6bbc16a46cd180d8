//! Generative-language assistant powered by the Gemini API

pub mod assistant;
pub mod client;

pub use assistant::Assistant;
pub use client::GeminiClient;
