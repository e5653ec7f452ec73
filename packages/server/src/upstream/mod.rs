mod gemini;
mod scanner;

pub use gemini::GeminiModel;
pub use scanner::HttpScanGateway;

use async_trait::async_trait;

use crate::models::scan::{OutputScanReport, ScanReport};

/// Failure talking to an external collaborator.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Client abstraction over the external prompt/output scanner service.
#[async_trait]
pub trait ScanGateway: Send + Sync {
    /// Run all input scanners over a prompt.
    async fn scan_prompt(&self, prompt: &str) -> Result<ScanReport, UpstreamError>;

    /// Run all output scanners over a prompt/model-output pair.
    async fn scan_output(
        &self,
        prompt: &str,
        model_output: &str,
    ) -> Result<OutputScanReport, UpstreamError>;
}

/// One part of a (possibly multimodal) model turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelPart {
    Text(String),
    /// Inline binary data, still base64-encoded.
    InlineData { mime_type: String, data: String },
}

/// Role-tagged conversation turn in the model collaborator's vocabulary
/// (assistant history arrives here already mapped to "model").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelTurn {
    pub role: String,
    pub parts: Vec<ModelPart>,
}

impl ModelTurn {
    pub fn text(role: &str, content: &str) -> Self {
        Self {
            role: role.to_owned(),
            parts: vec![ModelPart::Text(content.to_owned())],
        }
    }
}

/// Client abstraction over the generative-model collaborator.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Send the conversation (history plus the new turn, last) and return
    /// the generated text.
    async fn generate(&self, turns: &[ModelTurn]) -> Result<String, UpstreamError>;

    /// The unauthenticated model-listing probe; returns the collaborator's
    /// listing JSON verbatim.
    async fn list_models(&self) -> Result<serde_json::Value, UpstreamError>;
}
