use async_trait::async_trait;
use guardian_core::config::LlmConfig;
use guardian_core::Issue;
use serde_json::json;
use tracing::debug;

use super::{AnnotateError, Annotator};

const SYSTEM_PROMPT: &str = "You are a data quality expert reviewing business dashboards.";

/// Annotator backed by an OpenAI-compatible chat completions endpoint.
pub struct LlmAnnotator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmAnnotator {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            temperature: 0.4,
            max_tokens: 80,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, AnnotateError> {
        if config.provider != "openai" {
            return Err(AnnotateError::NotConfigured(format!(
                "unsupported LLM provider: '{}'",
                config.provider
            )));
        }
        let api_key = config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| AnnotateError::NotConfigured("OPENAI_API_KEY not set".into()))?;
        let mut annotator = Self::new(
            api_key.clone(),
            config.openai_model.clone(),
            config.openai_base_url.clone(),
        );
        annotator.temperature = config.temperature;
        annotator.max_tokens = config.max_tokens;
        Ok(annotator)
    }

    /// User prompt describing one issue.
    pub fn prompt(issue: &Issue) -> String {
        format!(
            "Explain the possible cause for the following data issue:\n\
             Metric: {}\n\
             Issue: {} ({})\n\
             Details: {}\n\
             Provide 1-2 clear, actionable sentences.",
            issue.metric_name(),
            issue.kind().label(),
            issue.severity(),
            issue.message()
        )
    }
}

#[async_trait]
impl Annotator for LlmAnnotator {
    async fn explain(&self, issue: &Issue) -> Result<String, AnnotateError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": Self::prompt(issue) },
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        debug!(metric_id = issue.metric_id(), "LLM annotation request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(AnnotateError::Api { status, body });
        }

        let resp: serde_json::Value = response.json().await?;
        let content = resp["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AnnotateError::Parse("missing choices[0].message.content".into()))?
            .trim()
            .to_string();

        Ok(content)
    }

    fn name(&self) -> &str {
        "llm"
    }
}
