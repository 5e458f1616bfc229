//! Robots.txt rules wrapper around the robotstxt crate

use robotstxt::DefaultMatcher;

/// Parsed robots.txt data for one host
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content
    content: String,
    /// Skip matching entirely (missing or unreadable robots.txt)
    allow_all: bool,
}

impl ParsedRobots {
    /// Creates rules from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Creates permissive rules
    ///
    /// Used when robots.txt is absent, fails to load, or compliance is
    /// switched off in the configuration.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Checks if a full URL may be fetched by the given user agent
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.allow_all || self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGENT: &str = "DEF-CON-Content-Archiver";

    #[test]
    fn test_allow_all() {
        let robots = ParsedRobots::allow_all();
        assert!(robots.is_allowed("https://media.defcon.org/private/", AGENT));
    }

    #[test]
    fn test_empty_content_allows() {
        let robots = ParsedRobots::from_content("");
        assert!(robots.is_allowed("https://media.defcon.org/x", AGENT));
    }

    #[test]
    fn test_disallow_path() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /private/\n");
        assert!(!robots.is_allowed("https://media.defcon.org/private/a.pdf", AGENT));
        assert!(robots.is_allowed("https://media.defcon.org/DEF%20CON%2030/a.pdf", AGENT));
    }

    #[test]
    fn test_agent_specific_group() {
        let robots = ParsedRobots::from_content(
            "User-agent: DEF-CON-Content-Archiver\nDisallow: /\n\nUser-agent: *\nAllow: /\n",
        );
        assert!(!robots.is_allowed("https://media.defcon.org/a.pdf", AGENT));
        assert!(robots.is_allowed("https://media.defcon.org/a.pdf", "OtherBot"));
    }
}
