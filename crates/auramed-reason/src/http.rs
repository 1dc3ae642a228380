//! Remote engine over an OpenAI-compatible chat completions API.
//!
//! Any server speaking that format works: a hosted provider, or a local
//! llama.cpp / vLLM instance serving a medical model.

use std::time::Duration;

use auramed_audio::Embedding;
use auramed_core::{Error, PatientVitals, Result};
use reqwest::blocking::Client;
use serde_json::json;
use tracing::{debug, error};

use crate::config::ReasoningConfig;
use crate::engine::ReasoningEngine;
use crate::prompt::build_messages;
use crate::types::EngineOutput;

pub struct HttpEngine {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f64,
    max_tokens: usize,
    name: String,
}

impl HttpEngine {
    pub fn new(config: &ReasoningConfig) -> Result<Self> {
        let endpoint = config
            .remote_endpoint()
            .ok_or_else(|| Error::Config("no reasoning endpoint configured".into()))?
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            name: format!("http/{}", config.model),
            endpoint,
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

impl ReasoningEngine for HttpEngine {
    fn generate(&self, embedding: &Embedding, vitals: &PatientVitals) -> Result<EngineOutput> {
        let msgs: Vec<serde_json::Value> = build_messages(embedding, vitals)
            .iter()
            .map(|m| json!({"role": m.role, "content": m.content}))
            .collect();

        let body = json!({
            "model": self.model,
            "messages": msgs,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "stream": false,
        });

        debug!("Requesting {} with model {}", self.endpoint, self.model);

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            error!("Reasoning API error {}: {}", status, body);
            return Err(Error::Inference(format!("API error {}: {}", status, body)));
        }

        let parsed: serde_json::Value = response
            .json()
            .map_err(|e| Error::Inference(format!("Invalid response body: {}", e)))?;

        let content = parsed["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| Error::Inference("response has no message content".into()))?;

        Ok(EngineOutput::Text(content.to_string()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
