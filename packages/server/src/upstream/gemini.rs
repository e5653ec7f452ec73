use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{GenerativeModel, ModelPart, ModelTurn, UpstreamError};
use crate::config::ModelConfig;

/// HTTP client for the Gemini-style generateContent API.
#[derive(Debug, Clone)]
pub struct GeminiModel {
    http: Client,
    generate_url: String,
    list_url: String,
    api_key: String,
}

impl GeminiModel {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            bail!("model API key must be set (model.api_key / PROMPTGATE__MODEL__API_KEY)");
        }
        let base = config.base_url.trim_end_matches('/');
        let http = Client::builder()
            .user_agent("promptgate/0.1")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build model HTTP client")?;
        Ok(Self {
            http,
            generate_url: format!("{base}/v1beta/models/{}:generateContent", config.model),
            list_url: format!("{base}/v1beta/models"),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    async fn generate(&self, turns: &[ModelTurn]) -> Result<String, UpstreamError> {
        let payload = GeminiRequest {
            contents: turns.iter().map(RequestContent::from).collect(),
        };

        let response = self
            .http
            .post(&self.generate_url)
            .query(&[("key", &self.api_key)])
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let message: GeminiResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        let text: String = message
            .candidates
            .into_iter()
            .take(1)
            .flat_map(|candidate| candidate.content.parts)
            .filter_map(|part| part.text)
            .collect();

        if text.is_empty() {
            return Err(UpstreamError::Decode(
                "model response missing message content".into(),
            ));
        }

        Ok(text)
    }

    async fn list_models(&self) -> Result<serde_json::Value, UpstreamError> {
        let response = self
            .http
            .get(&self.list_url)
            .query(&[("key", &self.api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<RequestContent>,
}

#[derive(Serialize)]
struct RequestContent {
    role: String,
    parts: Vec<RequestPart>,
}

impl From<&ModelTurn> for RequestContent {
    fn from(turn: &ModelTurn) -> Self {
        Self {
            role: turn.role.clone(),
            parts: turn.parts.iter().map(RequestPart::from).collect(),
        }
    }
}

#[derive(Serialize)]
struct RequestPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

impl From<&ModelPart> for RequestPart {
    fn from(part: &ModelPart) -> Self {
        match part {
            ModelPart::Text(text) => Self {
                text: Some(text.clone()),
                inline_data: None,
            },
            ModelPart::InlineData { mime_type, data } => Self {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: mime_type.clone(),
                    data: data.clone(),
                }),
            },
        }
    }
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}
