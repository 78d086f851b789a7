//! OpenAI-compatible chat completions backend.

mod backend;
mod types;

pub use backend::{OpenAIBackend, OpenAIConfig};
