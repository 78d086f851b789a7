//! Centralized default constants for docket.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// CASE NUMBERS
// =============================================================================

/// Prefix for generated case numbers: `CASE-<year>-NNNN`.
pub const CASE_NUMBER_PREFIX: &str = "CASE";

/// Zero-padding width of the numeric case-number suffix.
pub const CASE_NUMBER_PAD: usize = 4;

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum case title length in characters.
pub const CASE_TITLE_MAX: usize = 50;

// =============================================================================
// DEFAULTS FOR CREATED ROWS
// =============================================================================

/// Client name when no name field was extracted.
pub const DEFAULT_CLIENT_NAME: &str = "Unknown Client";

/// Status assigned to newly created cases.
pub const DEFAULT_CASE_STATUS: &str = "active";

/// Category assigned to URL-based documents.
pub const WEB_LINK_CATEGORY: &str = "Web Link";

// =============================================================================
// STRATEGY
// =============================================================================

/// Maximum strategy summary length in characters (before the ellipsis).
pub const STRATEGY_SUMMARY_MAX: usize = 200;

/// Model identifier recorded on manually edited strategy versions.
pub const MANUAL_EDIT_MODEL: &str = "manual-edit";

/// Generation reason recorded on manually edited strategy versions.
pub const MANUAL_EDIT_REASON: &str = "Manual edit by user";

/// Generation reason when the caller supplies none.
pub const DEFAULT_GENERATION_REASON: &str = "Strategy generation requested";

// =============================================================================
// EXTERNAL SERVICES
// =============================================================================

/// Default base URL for the ingestion backend.
pub const INGEST_URL: &str = "http://localhost:8000";

/// Timeout for ingestion backend requests (seconds). Uploads can be large.
pub const INGEST_TIMEOUT_SECS: u64 = 120;

/// Default base URL for the OpenAI-compatible inference API.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default generation model.
pub const GEN_MODEL: &str = "gpt-4o-mini";

/// Timeout for generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = 300;
