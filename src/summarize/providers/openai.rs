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
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// OpenAI chat completions API
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key_env: String,
}

impl OpenAiProvider {
    pub fn new(client: Client, endpoint: &EndpointConfig) -> Self {
        Self {
            client,
            base_url: endpoint.base_url.clone(),
            model: endpoint.model.clone(),
            api_key_env: endpoint.api_key_env.clone(),
        }
    }

    async fn complete(&self, api_key: &str, prompt: String) -> Result<String, String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response: ChatResponse = self
            .client
            .post(endpoint_url(&self.base_url, "v1/chat/completions"))
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
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| "response contained no choices".to_string())
    }
}

#[async_trait]
impl SummaryProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn summarize(&self, content: &TalkContent, template: &str) -> ConfigResult<Summary> {
        let api_key = read_api_key("openai", &self.api_key_env)?;

        match self
            .complete(&api_key, fill_template(template, &content.text))
            .await
        {
            Ok(text) => Ok(parse_completion(&text)),
            Err(e) => {
                tracing::warn!("OpenAI summary request failed: {}", e);
                Ok(Summary::error())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: &str, var: &str) -> OpenAiProvider {
        OpenAiProvider::new(Client::new(), &EndpointConfig::new(base_url, "gpt-4o-mini", var))
    }

    fn content() -> TalkContent {
        TalkContent {
            text: "talk".to_string(),
            ..TalkContent::default()
        }
    }

    #[tokio::test]
    async fn test_chat_completion() {
        let var = "DEFCON_ARCHIVER_TEST_OPENAI_KEY_OK";
        std::env::set_var(var, "sk-test");

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [{ "role": "user", "content": "S: talk" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": "Badge Hacking\n- soldering\n- firmware" }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let summary = provider(&server.uri(), var)
            .summarize(&content(), "S: {{CONTENT}}")
            .await
            .unwrap();
        assert_eq!(summary.title, "Badge Hacking");
        assert_eq!(summary.main_points, vec!["soldering", "firmware"]);
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        let result = provider("http://127.0.0.1:1", "DEFCON_ARCHIVER_TEST_OPENAI_KEY_UNSET")
            .summarize(&content(), "{{CONTENT}}")
            .await;
        assert!(matches!(
            result,
            Err(ConfigError::MissingApiKey {
                provider: "openai",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_gives_sentinel() {
        let var = "DEFCON_ARCHIVER_TEST_OPENAI_KEY_DOWN";
        std::env::set_var(var, "sk-test");

        let summary = provider("http://127.0.0.1:1", var)
            .summarize(&content(), "{{CONTENT}}")
            .await
            .unwrap();
        assert!(summary.is_error());
    }

    #[tokio::test]
    async fn test_malformed_body_gives_sentinel() {
        let var = "DEFCON_ARCHIVER_TEST_OPENAI_KEY_BAD";
        std::env::set_var(var, "sk-test");

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let summary = provider(&server.uri(), var)
            .summarize(&content(), "{{CONTENT}}")
            .await
            .unwrap();
        assert!(summary.is_error());
    }
}
