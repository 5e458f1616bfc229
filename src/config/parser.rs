use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use defcon_archiver::config::load_config;
///
/// let config = load_config(Path::new("archiver.toml")).unwrap();
/// println!("Output root: {}", config.output.root);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads the configuration file when one is given, defaults otherwise
///
/// Defaults are not validated here; callers validate after applying
/// command-line overrides.
pub fn load_or_default(path: Option<&Path>) -> Result<(Config, Option<String>), ConfigError> {
    match path {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)?;
            Ok((config, Some(hash)))
        }
        None => Ok((Config::default(), None)),
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The digest is recorded in the mirror manifest so a mirror can be traced
/// back to the exact configuration that produced it.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
