use crate::config::EndpointConfig;
use crate::summarize::providers::{endpoint_url, read_api_key, MAX_TOKENS, TEMPERATURE};
use crate::summarize::{
    fill_template, parse_completion, ProviderKind, Summary, SummaryProvider, TalkContent,
};
use crate::ConfigResult;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
struct Generation {
    text: String,
}

/// Cohere generate API
#[derive(Debug, Clone)]
pub struct CohereProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key_env: String,
}

impl CohereProvider {
    pub fn new(client: Client, endpoint: &EndpointConfig) -> Self {
        Self {
            client,
            base_url: endpoint.base_url.clone(),
            model: endpoint.model.clone(),
            api_key_env: endpoint.api_key_env.clone(),
        }
    }

    async fn complete(&self, api_key: &str, prompt: String) -> Result<String, String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response: GenerateResponse = self
            .client
            .post(endpoint_url(&self.base_url, "v1/generate"))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?
            .json()
            .await
            .map_err(|e| e.to_string())?;

        response
            .generations
            .into_iter()
            .next()
            .map(|g| g.text)
            .ok_or_else(|| "response contained no generations".to_string())
    }
}

#[async_trait]
impl SummaryProvider for CohereProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Cohere
    }

    async fn summarize(&self, content: &TalkContent, template: &str) -> ConfigResult<Summary> {
        let api_key = read_api_key("cohere", &self.api_key_env)?;

        match self
            .complete(&api_key, fill_template(template, &content.text))
            .await
        {
            Ok(text) => Ok(parse_completion(&text)),
            Err(e) => {
                tracing::warn!("Cohere summary request failed: {}", e);
                Ok(Summary::error())
            }
        }
    }
}
