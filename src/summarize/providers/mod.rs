//! HTTP clients for the summary providers
//!
//! Hosted providers share fixed sampling parameters and read their API key
//! from the environment on every call.

mod claude;
mod cohere;
mod ollama;
mod openai;

pub use claude::ClaudeProvider;
pub use cohere::CohereProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use crate::{ConfigError, ConfigResult};

/// Completion length requested from hosted providers
pub const MAX_TOKENS: u32 = 1000;

/// Sampling temperature for hosted providers
pub const TEMPERATURE: f32 = 0.7;

/// Reads a provider API key; unset or empty is a configuration error
pub(crate) fn read_api_key(provider: &'static str, var: &str) -> ConfigResult<String> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ConfigError::MissingApiKey {
            provider,
            var: var.to_string(),
        }),
    }
}

/// Joins a base URL and an API path without doubling slashes
pub(crate) fn endpoint_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url("https://api.cohere.ai/", "/v1/generate"),
            "https://api.cohere.ai/v1/generate"
        );
        assert_eq!(
            endpoint_url("http://localhost:11434", "api/generate"),
            "http://localhost:11434/api/generate"
        );
    }

    #[test]
    fn test_missing_key() {
        let var = "DEFCON_ARCHIVER_TEST_KEY_THAT_IS_NEVER_SET";
        match read_api_key("cohere", var) {
            Err(ConfigError::MissingApiKey { provider, var: v }) => {
                assert_eq!(provider, "cohere");
                assert_eq!(v, var);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_present_key() {
        let var = "DEFCON_ARCHIVER_TEST_KEY_PRESENT";
        std::env::set_var(var, "secret");
        assert_eq!(read_api_key("openai", var).unwrap(), "secret");
    }
}
