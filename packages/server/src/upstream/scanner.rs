use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::{ScanGateway, UpstreamError};
use crate::config::ScannerConfig;
use crate::models::scan::{OutputScanReport, ScanReport};

/// HTTP client for the external multi-scanner service.
#[derive(Debug, Clone)]
pub struct HttpScanGateway {
    http: Client,
    scan_all_url: String,
    scan_all_output_url: String,
}

impl HttpScanGateway {
    pub fn new(config: &ScannerConfig) -> Result<Self> {
        let base = config.base_url.trim_end_matches('/');
        let http = Client::builder()
            .user_agent("promptgate/0.1")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build scanner HTTP client")?;
        Ok(Self {
            http,
            scan_all_url: format!("{base}/scan-all"),
            scan_all_output_url: format!("{base}/scan-all-output"),
        })
    }

    async fn post_scan<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<T, UpstreamError> {
        let response = self.http.post(url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ScanGateway for HttpScanGateway {
    async fn scan_prompt(&self, prompt: &str) -> Result<ScanReport, UpstreamError> {
        self.post_scan(&self.scan_all_url, json!({ "prompt": prompt }))
            .await
    }

    async fn scan_output(
        &self,
        prompt: &str,
        model_output: &str,
    ) -> Result<OutputScanReport, UpstreamError> {
        self.post_scan(
            &self.scan_all_output_url,
            json!({ "prompt": prompt, "model_output": model_output }),
        )
        .await
    }
}
