use crate::config::EndpointConfig;
use crate::summarize::providers::{endpoint_url, read_api_key, MAX_TOKENS, TEMPERATURE};
use crate::summarize::{
    fill_template, parse_completion, ProviderKind, Summary, SummaryProvider, TalkContent,
};
use crate::ConfigResult;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Messages API version sent with every request
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic messages API
#[derive(Debug, Clone)]
pub struct ClaudeProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key_env: String,
}

impl ClaudeProvider {
    pub fn new(client: Client, endpoint: &EndpointConfig) -> Self {
        Self {
            client,
            base_url: endpoint.base_url.clone(),
            model: endpoint.model.clone(),
            api_key_env: endpoint.api_key_env.clone(),
        }
    }

    async fn complete(&self, api_key: &str, prompt: String) -> Result<String, String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response: MessagesResponse = self
            .client
            .post(endpoint_url(&self.base_url, "v1/messages"))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
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
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| "response contained no text block".to_string())
    }
}

#[async_trait]
impl SummaryProvider for ClaudeProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Claude
    }

    async fn summarize(&self, content: &TalkContent, template: &str) -> ConfigResult<Summary> {
        let api_key = read_api_key("claude", &self.api_key_env)?;

        match self
            .complete(&api_key, fill_template(template, &content.text))
            .await
        {
            Ok(text) => Ok(parse_completion(&text)),
            Err(e) => {
                tracing::warn!("Claude summary request failed: {}", e);
                Ok(Summary::error())
            }
        }
    }
}
