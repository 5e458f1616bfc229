use crate::config::EndpointConfig;
use crate::summarize::providers::endpoint_url;
use crate::summarize::{fill_template, ProviderKind, Summary, SummaryProvider, TalkContent};
use crate::{ConfigError, ConfigResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Local Ollama server
///
/// The model is asked to answer with Summary JSON directly, so the
/// `response` field is decoded as a [`Summary`] rather than parsed
/// heuristically.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(client: Client, endpoint: &EndpointConfig) -> Self {
        Self {
            client,
            base_url: endpoint.base_url.clone(),
            model: endpoint.model.clone(),
        }
    }

    /// Checks the server answers on its base URL
    pub async fn check_liveness(&self) -> ConfigResult<()> {
        let unreachable = |reason: String| ConfigError::EndpointUnreachable {
            url: self.base_url.clone(),
            reason,
        };

        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unreachable(format!("HTTP {}", response.status())));
        }
        Ok(())
    }

    async fn generate(&self, prompt: String) -> Result<Summary, String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(endpoint_url(&self.base_url, "api/generate"))
            .json(&request)
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        let body: GenerateResponse = response.json().await.map_err(|e| e.to_string())?;
        serde_json::from_str(&body.response).map_err(|e| e.to_string())
    }
}

#[async_trait]
impl SummaryProvider for OllamaProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    async fn summarize(&self, content: &TalkContent, template: &str) -> ConfigResult<Summary> {
        self.check_liveness().await?;

        match self.generate(fill_template(template, &content.text)).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                tracing::warn!("Error generating or validating summary: {}", e);
                Ok(Summary::error())
            }
        }
    }
}
