// HTTP client for the upstream machine-translation service
//
// Wire contract: POST {base}/translate with {"text", "src", "tgt"}.
// A missing or unreliable source hint is forwarded as the literal "auto",
// which the upstream understands as "detect it yourself". The response's
// translated text may arrive under several key names depending on the
// deployed service version.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::TranslatorConfig;
use crate::core::errors::{TranslationError, TranslationResult};
use crate::core::types::Translation;

pub struct TranslationClient {
    http_client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct UpstreamRequest<'a> {
    text: &'a str,
    src: &'a str,
    tgt: &'a str,
}

#[derive(Debug, Deserialize)]
struct UpstreamResponse {
    #[serde(
        default,
        alias = "result",
        alias = "translation",
        alias = "translated_text"
    )]
    translated: Option<String>,
    /// Source language the upstream detected, reported only when it was
    /// asked to auto-detect.
    #[serde(default)]
    detected_src: Option<String>,
}

impl TranslationClient {
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        // Create HTTP client with timeout and connection pooling
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
        })
    }

    /// Translate `text` into `target`. One call per target; the caller
    /// captures per-target failures independently. No retries.
    pub async fn translate(
        &self,
        text: &str,
        source_hint: Option<&str>,
        target: &str,
    ) -> TranslationResult<Translation> {
        let src = effective_source(source_hint);
        debug!("translating {} -> {} ({} chars)", src, target, text.len());

        let response = self
            .http_client
            .post(self.endpoint())
            .json(&UpstreamRequest { text, src, tgt: target })
            .send()
            .await
            .map_err(TranslationError::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TranslationError::ServiceError {
                status: status.as_u16(),
                message,
            });
        }

        let body: UpstreamResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::InvalidResponse(e.to_string()))?;

        Ok(Translation {
            text: body.translated.unwrap_or_default(),
            detected_source: body.detected_src,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/translate", self.base_url.trim_end_matches('/'))
    }
}

/// The source code sent upstream: the hint when usable, "auto" otherwise.
fn effective_source(hint: Option<&str>) -> &str {
    match hint {
        Some(code) if !code.is_empty() && code != "unknown" => code,
        _ => "auto",
    }
}
