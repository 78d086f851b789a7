//! # docket-inference
//!
//! AI backends for docket:
//!
//! - [`OpenAIBackend`]: OpenAI-compatible chat completions, including
//!   multimodal requests with attached images and PDFs
//! - [`Extractor`]: structured document extraction over a generation backend
//! - [`mock`]: deterministic backends for tests

pub mod extractor;
pub mod mock;
pub mod openai;
pub mod prompts;

pub use extractor::{parse_extraction, Extractor};
pub use openai::{OpenAIBackend, OpenAIConfig};
