use crate::{ConfigError, ConfigResult};
use std::fs;
use std::path::Path;

/// Placeholder replaced with the extracted talk text
pub const CONTENT_PLACEHOLDER: &str = "{{CONTENT}}";

/// Reads a prompt template; a missing or unreadable file is fatal
pub fn read_template(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|e| {
        tracing::error!("Failed to read prompt template {}: {}", path.display(), e);
        ConfigError::MissingTemplate(path.to_path_buf())
    })
}

/// Substitutes the talk text into the template
pub fn fill_template(template: &str, content: &str) -> String {
    template.replace(CONTENT_PLACEHOLDER, content)
}
