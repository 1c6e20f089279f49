use serde_json::Value;
use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::config::GatewayConfig;
use crate::error::{ChatError, Result, UpstreamError};
use crate::metrics::{UPSTREAM_ERRORS, UPSTREAM_LATENCY};
use crate::models::{GenerateContentRequest, GenerationConfig};
use crate::upstream::extract::extract_reply;

const API_KEY_HEADER: &str = "x-goog-api-key";

// Outbound client for the generateContent endpoint
pub struct GeminiGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl GeminiGateway {
    pub fn new(config: GatewayConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn has_api_key(&self) -> bool {
        self.config.api_key.is_some()
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Send `prompt` upstream and return the extracted reply text.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let body = self.call(prompt).await?;
        Ok(extract_reply(&body))
    }

    #[instrument(skip(self, prompt), fields(model = %self.config.model), level = "debug")]
    async fn call(&self, prompt: &str) -> Result<Value> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ChatError::MissingApiKey)?;

        let payload = GenerateContentRequest::single_prompt(
            prompt,
            GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        );

        let start = Instant::now();
        let result = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&payload)
            .send()
            .await;

        let res = match result {
            Ok(res) => res,
            Err(e) => {
                UPSTREAM_ERRORS.inc();
                UPSTREAM_LATENCY.observe(start.elapsed().as_secs_f64());
                error!(error = %e, "upstream request failed");
                return Err(UpstreamError::from(e).into());
            }
        };

        let status = res.status();
        if status.as_u16() >= 400 {
            UPSTREAM_ERRORS.inc();
            let body = res.text().await.unwrap_or_default();
            UPSTREAM_LATENCY.observe(start.elapsed().as_secs_f64());
            error!(status = status.as_u16(), %body, "upstream API error");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        // a reset or timeout mid-body is still a transport failure
        let bytes = res.bytes().await.map_err(|e| {
            UPSTREAM_ERRORS.inc();
            error!(error = %e, "failed reading upstream body");
            UpstreamError::from(e)
        })?;
        UPSTREAM_LATENCY.observe(start.elapsed().as_secs_f64());

        let body = serde_json::from_slice::<Value>(&bytes).map_err(|e| {
            ChatError::Internal(format!("failed to decode upstream response: {e}"))
        })?;
        debug!(%status, "upstream responded");
        Ok(body)
    }
}
