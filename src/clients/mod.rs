//! Clients for external services.

/// Gemini `generateContent` client
pub mod gemini;

pub use gemini::GeminiClient;
