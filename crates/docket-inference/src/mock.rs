//! Mock backends for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docket_inference::mock::MockGenerationBackend;
//!
//! let backend = MockGenerationBackend::new()
//!     .with_fixed_response("## Executive Summary\nSettle early.");
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use docket_core::{
    DocumentPayload, Error, ExtractedDetails, ExtractionBackend, GenerationBackend,
    MediaAttachment, Result,
};

/// One recorded call against the mock generation backend.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: String,
    pub system: String,
    pub prompt: String,
    pub media_type: Option<String>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    model_name: String,
    fixed_responses: HashMap<String, String>,
    default_response: String,
    failure: Option<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            model_name: "mock-model".to_string(),
            fixed_responses: HashMap::new(),
            default_response: "Mock response".to_string(),
            failure: None,
        }
    }
}

/// Mock generation backend with a call log for assertions.
#[derive(Clone)]
pub struct MockGenerationBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockGenerationBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the model name reported by the backend.
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).model_name = name.into();
        self
    }

    /// Set the response returned for any prompt without a mapping.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Add a response mapping for a specific prompt.
    pub fn with_response_mapping(
        mut self,
        prompt: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .fixed_responses
            .insert(prompt.into(), response.into());
        self
    }

    /// Make every call fail with the given message.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(message.into());
        self
    }

    /// Get all logged calls for assertion.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    fn log_call(&self, operation: &str, system: &str, prompt: &str, media_type: Option<&str>) {
        self.call_log.lock().unwrap().push(MockCall {
            operation: operation.to_string(),
            system: system.to_string(),
            prompt: prompt.to_string(),
            media_type: media_type.map(String::from),
        });
    }

    fn respond(&self, prompt: &str) -> Result<String> {
        if let Some(message) = &self.config.failure {
            return Err(Error::Inference(message.clone()));
        }
        if let Some(response) = self.config.fixed_responses.get(prompt) {
            return Ok(response.clone());
        }
        Ok(self.config.default_response.clone())
    }
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
        self.log_call("generate", system, prompt, None);
        self.respond(prompt)
    }

    async fn generate_with_attachment(
        &self,
        system: &str,
        prompt: &str,
        attachment: &MediaAttachment,
    ) -> Result<String> {
        self.log_call(
            "generate_with_attachment",
            system,
            prompt,
            Some(&attachment.media_type),
        );
        self.respond(prompt)
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}

/// Mock extraction backend returning results keyed by file name.
#[derive(Clone, Default)]
pub struct MockExtractionBackend {
    results: Arc<Mutex<HashMap<String, ExtractedDetails>>>,
    failures: Arc<Mutex<HashMap<String, String>>>,
    fallback: Arc<Mutex<Option<ExtractedDetails>>>,
}

impl MockExtractionBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `details` for files named `name`.
    pub fn with_result(self, name: impl Into<String>, details: ExtractedDetails) -> Self {
        self.results.lock().unwrap().insert(name.into(), details);
        self
    }

    /// Fail extraction for files named `name`.
    pub fn with_failure(self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(name.into(), message.into());
        self
    }

    /// Default result for files with no explicit mapping.
    pub fn with_fallback(self, details: ExtractedDetails) -> Self {
        *self.fallback.lock().unwrap() = Some(details);
        self
    }
}

#[async_trait]
impl ExtractionBackend for MockExtractionBackend {
    async fn extract(&self, payload: &DocumentPayload) -> Result<ExtractedDetails> {
        if let Some(message) = self.failures.lock().unwrap().get(&payload.name) {
            return Err(Error::Extraction(message.clone()));
        }
        if let Some(details) = self.results.lock().unwrap().get(&payload.name) {
            return Ok(details.clone());
        }
        if let Some(details) = self.fallback.lock().unwrap().clone() {
            return Ok(details);
        }
        Err(Error::Extraction(format!(
            "No mock result configured for {}",
            payload.name
        )))
    }
}
