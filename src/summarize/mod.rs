//! Talk summarization
//!
//! Downloaded PDFs are turned into plain text by a [`DocumentExtractor`],
//! then into a structured [`Summary`] by one of a closed set of LLM
//! providers. [`SummarizationBatch`] drives the whole directory.

mod batch;
mod extractor;
mod parse;
pub mod providers;
mod template;

pub use batch::{BatchReport, SummarizationBatch, SUMMARY_SUFFIX};
pub use extractor::{DocumentExtractor, ExtractError, PdfExtractor};
pub use parse::parse_completion;
pub use providers::{ClaudeProvider, CohereProvider, OllamaProvider, OpenAiProvider};
pub use template::{fill_template, read_template, CONTENT_PLACEHOLDER};

use crate::config::SummarizerConfig;
use crate::{ConfigError, ConfigResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Title carried by the sentinel summary
pub const ERROR_TITLE: &str = "Error";

/// Structured summary of one talk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub title: String,
    pub main_points: Vec<String>,
    pub technical_details: Vec<String>,
    pub implications: Vec<String>,
}

impl Summary {
    /// The sentinel substituted when a provider call fails
    pub fn error() -> Self {
        Self {
            title: ERROR_TITLE.to_string(),
            ..Self::default()
        }
    }

    /// Returns true for the sentinel summary
    pub fn is_error(&self) -> bool {
        self.title == ERROR_TITLE
            && self.main_points.is_empty()
            && self.technical_details.is_empty()
            && self.implications.is_empty()
    }
}

/// Text and metadata extracted from one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TalkContent {
    pub text: String,
    pub metadata: BTreeMap<String, String>,
}

impl TalkContent {
    /// Returns true if there is nothing worth summarizing
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// The supported providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Cohere,
    Ollama,
    OpenAi,
    Claude,
}

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cohere => "cohere",
            Self::Ollama => "ollama",
            Self::OpenAi => "openai",
            Self::Claude => "claude",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    /// Parses a provider name; unknown names are configuration errors
    ///
    /// ```
    /// use defcon_archiver::summarize::ProviderKind;
    ///
    /// assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
    /// assert_eq!("anthropic".parse::<ProviderKind>().unwrap(), ProviderKind::Claude);
    /// assert!("gemini".parse::<ProviderKind>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cohere" => Ok(Self::Cohere),
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAi),
            "claude" | "anthropic" => Ok(Self::Claude),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

/// Turns extracted talk text into a summary
///
/// `Err` is reserved for configuration problems (missing key, unreachable
/// local endpoint). Every other failure yields [`Summary::error`].
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn summarize(&self, content: &TalkContent, template: &str) -> ConfigResult<Summary>;
}

/// A configured provider, selected by name
#[derive(Debug, Clone)]
pub enum Provider {
    Cohere(CohereProvider),
    Ollama(OllamaProvider),
    OpenAi(OpenAiProvider),
    Claude(ClaudeProvider),
}

impl Provider {
    /// Builds the provider named in the configuration
    pub fn from_config(config: &SummarizerConfig) -> ConfigResult<Self> {
        let kind = config.provider.parse::<ProviderKind>()?;
        Self::build(kind, config)
    }

    /// Builds a specific provider using the endpoint settings in `config`
    pub fn build(kind: ProviderKind, config: &SummarizerConfig) -> ConfigResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::Validation(format!("Failed to build HTTP client: {}", e)))?;

        let provider = match kind {
            ProviderKind::Cohere => Self::Cohere(CohereProvider::new(client, &config.cohere)),
            ProviderKind::Ollama => Self::Ollama(OllamaProvider::new(client, &config.ollama)),
            ProviderKind::OpenAi => Self::OpenAi(OpenAiProvider::new(client, &config.openai)),
            ProviderKind::Claude => Self::Claude(ClaudeProvider::new(client, &config.claude)),
        };
        tracing::debug!("Using {} summary provider", kind);
        Ok(provider)
    }
}

#[async_trait]
impl SummaryProvider for Provider {
    fn kind(&self) -> ProviderKind {
        match self {
            Self::Cohere(_) => ProviderKind::Cohere,
            Self::Ollama(_) => ProviderKind::Ollama,
            Self::OpenAi(_) => ProviderKind::OpenAi,
            Self::Claude(_) => ProviderKind::Claude,
        }
    }

    async fn summarize(&self, content: &TalkContent, template: &str) -> ConfigResult<Summary> {
        match self {
            Self::Cohere(p) => p.summarize(content, template).await,
            Self::Ollama(p) => p.summarize(content, template).await,
            Self::OpenAi(p) => p.summarize(content, template).await,
            Self::Claude(p) => p.summarize(content, template).await,
        }
    }
}
