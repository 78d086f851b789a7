//! # docket-workflow
//!
//! Orchestration layer for docket. Three services over the core repository
//! and backend traits:
//!
//! - [`IntakeService`]: AI-assisted case creation (validate, derive client
//!   contact details, persist client + case atomically)
//! - [`DocumentPipeline`]: file upload + extraction and URL documents, with
//!   per-item failure isolation
//! - [`StrategyService`]: AI-generated and manually edited strategy
//!   versions over the append-only chain
//!
//! Everything here is written against `docket_core` traits, so tests run
//! with in-memory fakes and deployments plug in the Postgres repositories
//! and HTTP backends.

pub mod documents;
pub mod intake;
pub mod strategy;

#[cfg(test)]
mod test_support;

pub use documents::{document_lifecycle, DocumentPipeline};
pub use intake::{extract_client_info, ClientContact, IntakeService};
pub use strategy::{summarize, EditStrategyInput, StrategyService};
