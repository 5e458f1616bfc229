use serde::{Deserialize, Serialize};

/// Main configuration structure for the archiver
///
/// Every section is optional in the TOML file; missing values fall back to
/// the defaults below, which reproduce a plain `defcon-archiver crawl` run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Verbose diagnostics, threaded explicitly to the components that use it
    pub debug: bool,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub mirror: MirrorConfig,
    pub summarizer: SummarizerConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Listing the crawl starts from
    pub start_url: String,

    /// Domains links may point to (supports `*.example.com`)
    pub allowed_domains: Vec<String>,

    /// Files announcing a larger Content-Length are not stored
    pub max_file_size: u64,

    /// Pause after every saved file (milliseconds)
    pub save_delay_ms: u64,

    /// Maximum nesting of event listings below the root
    pub max_depth: u32,

    /// Check robots.txt before every request
    pub obey_robots: bool,

    /// Seed the duplicate filter with hashes of files already on disk
    pub dedup_existing: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_url: "https://media.defcon.org/".to_string(),
            allowed_domains: vec!["media.defcon.org".to_string()],
            max_file_size: 100 * 1024 * 1024,
            save_delay_ms: 1000,
            max_depth: 16,
            obey_robots: true,
            dedup_existing: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,

    /// Free-form purpose shown in the user agent
    pub purpose: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "DEF-CON-Content-Archiver".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://media.defcon.org/".to_string(),
            purpose: "Educational/Research Use".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.purpose
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root of the archive tree
    pub root: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: "defcon-comprehensive-archive".to_string(),
        }
    }
}

/// Single-listing PDF mirror configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Listing whose PDFs are mirrored
    pub source: String,

    /// Flat directory the PDFs are written to
    pub directory: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            source: "https://media.defcon.org/DEF%20CON%2032/DEF%20CON%2032%20presentations/"
                .to_string(),
            directory: "defcon32-media".to_string(),
        }
    }
}

/// Summarization configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SummarizerConfig {
    /// Provider name: cohere, ollama, openai or claude
    pub provider: String,

    /// Prompt template containing a `{{CONTENT}}` placeholder
    pub template_path: String,

    /// Where `<stem>_summary.json` files are written
    pub output_dir: String,

    /// Transport timeout for provider calls (seconds)
    pub timeout_secs: u64,

    pub ollama: EndpointConfig,
    pub cohere: EndpointConfig,
    pub openai: EndpointConfig,
    pub claude: EndpointConfig,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            provider: "cohere".to_string(),
            template_path: "prompt_defcon_talk_summary_pqrst.tmpl".to_string(),
            output_dir: "summaries".to_string(),
            timeout_secs: 120,
            ollama: EndpointConfig::new("http://localhost:11434", "llama2", ""),
            cohere: EndpointConfig::new("https://api.cohere.ai", "command", "COHERE_API_KEY"),
            openai: EndpointConfig::new("https://api.openai.com", "gpt-4o-mini", "OPENAI_API_KEY"),
            claude: EndpointConfig::new(
                "https://api.anthropic.com",
                "claude-3-5-haiku-latest",
                "ANTHROPIC_API_KEY",
            ),
        }
    }
}

/// Connection settings for one summary provider
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct EndpointConfig {
    /// Base URL, without a trailing path
    pub base_url: String,

    /// Model identifier sent with each request
    pub model: String,

    /// Environment variable holding the API key (empty for keyless providers)
    #[serde(default)]
    pub api_key_env: String,
}

impl EndpointConfig {
    pub fn new(base_url: &str, model: &str, api_key_env: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            model: model.to_string(),
            api_key_env: api_key_env.to_string(),
        }
    }
}
