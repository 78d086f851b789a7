//! HTTP handlers, grouped by resource.

pub mod cases;
pub mod clients;
pub mod documents;
pub mod notes;
pub mod strategies;
