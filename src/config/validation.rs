use crate::config::types::{
    Config, CrawlerConfig, EndpointConfig, MirrorConfig, OutputConfig, SummarizerConfig,
    UserAgentConfig,
};
use crate::summarize::ProviderKind;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_mirror_config(&config.mirror)?;
    validate_summarizer_config(&config.summarizer)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let start = Url::parse(&config.start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start-url: {}", e)))?;

    if start.scheme() != "http" && start.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "start-url '{}' must use HTTP or HTTPS",
            config.start_url
        )));
    }

    if config.allowed_domains.is_empty() {
        return Err(ConfigError::Validation(
            "allowed-domains must list at least one domain".to_string(),
        ));
    }

    for domain in &config.allowed_domains {
        validate_domain_pattern(domain)?;
    }

    if config.max_file_size == 0 {
        return Err(ConfigError::Validation(
            "max-file-size must be greater than zero".to_string(),
        ));
    }

    if config.max_depth < 1 {
        return Err(ConfigError::Validation(format!(
            "max-depth must be >= 1, got {}",
            config.max_depth
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.is_empty() {
        return Err(ConfigError::Validation(
            "output root cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates mirror configuration
fn validate_mirror_config(config: &MirrorConfig) -> Result<(), ConfigError> {
    let source = Url::parse(&config.source)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid mirror source: {}", e)))?;

    if source.scheme() != "http" && source.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "mirror source '{}' must use HTTP or HTTPS",
            config.source
        )));
    }

    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "mirror directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates summarizer configuration
fn validate_summarizer_config(config: &SummarizerConfig) -> Result<(), ConfigError> {
    config.provider.parse::<ProviderKind>()?;

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "summarizer timeout-secs must be greater than zero".to_string(),
        ));
    }

    for (name, endpoint) in [
        ("ollama", &config.ollama),
        ("cohere", &config.cohere),
        ("openai", &config.openai),
        ("claude", &config.claude),
    ] {
        validate_endpoint(name, endpoint)?;
    }

    Ok(())
}

fn validate_endpoint(name: &str, endpoint: &EndpointConfig) -> Result<(), ConfigError> {
    Url::parse(&endpoint.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} base-url: {}", name, e)))?;

    if endpoint.model.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} model cannot be empty",
            name
        )));
    }

    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    match pattern.strip_prefix("*.") {
        Some(domain) => validate_domain_string(domain),
        None => validate_domain_string(pattern),
    }
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    // localhost is accepted so the crawler can be pointed at a local mirror
    if !domain.contains('.') && domain != "localhost" {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}
