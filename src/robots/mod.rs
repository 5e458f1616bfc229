//! Robots.txt handling module
//!
//! Fetches robots.txt once per host and answers allow/deny questions for
//! every request the crawler makes.

mod parser;

pub use parser::ParsedRobots;

use reqwest::Client;
use std::collections::HashMap;
use url::Url;

/// Fetches robots.txt for the host of `url`
///
/// A missing file, a non-success status or a network error all yield
/// allow-all rules; robots.txt problems never stop a crawl.
pub async fn fetch_robots(client: &Client, url: &Url) -> ParsedRobots {
    let robots_url = match url.join("/robots.txt") {
        Ok(u) => u,
        Err(_) => return ParsedRobots::allow_all(),
    };

    match client.get(robots_url.as_str()).send().await {
        Ok(response) if response.status().is_success() => match response.text().await {
            Ok(body) => ParsedRobots::from_content(&body),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", robots_url, e);
                ParsedRobots::allow_all()
            }
        },
        Ok(response) => {
            tracing::debug!("{} returned {}", robots_url, response.status());
            ParsedRobots::allow_all()
        }
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}

/// Per-host robots.txt rules for the lifetime of a run
pub struct RobotsCache {
    enabled: bool,
    user_agent: String,
    hosts: HashMap<String, ParsedRobots>,
}

impl RobotsCache {
    /// Creates a cache; a disabled cache allows every URL without fetching
    pub fn new(enabled: bool, user_agent: &str) -> Self {
        Self {
            enabled,
            user_agent: user_agent.to_string(),
            hosts: HashMap::new(),
        }
    }

    /// Checks `url`, fetching the host's robots.txt on first use
    pub async fn is_allowed(&mut self, client: &Client, url: &Url) -> bool {
        if !self.enabled {
            return true;
        }

        let key = host_key(url);
        if !self.hosts.contains_key(&key) {
            tracing::debug!("Fetching robots.txt for {}", key);
            let robots = fetch_robots(client, url).await;
            self.hosts.insert(key.clone(), robots);
        }

        self.hosts
            .get(&key)
            .map(|robots| robots.is_allowed(url.as_str(), &self.user_agent))
            .unwrap_or(true)
    }
}

fn host_key(url: &Url) -> String {
    match url.port() {
        Some(port) => format!("{}:{}", url.host_str().unwrap_or_default(), port),
        None => url.host_str().unwrap_or_default().to_string(),
    }
}
