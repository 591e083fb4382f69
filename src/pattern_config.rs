use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const AI_CATEGORY: &str = "AI Agents";
pub const SEARCH_CATEGORY: &str = "Search Engines";
pub const SEO_CATEGORY: &str = "SEO/Marketing";

/// Pattern sets driving bot classification and categorization.
///
/// Each pattern is either a plain substring or a regular expression; both
/// are matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    pub bot_patterns: Vec<String>,
    #[serde(default)]
    pub categories: Vec<CategoryDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub name: String,
    pub patterns: Vec<String>,
}

impl CategoryDefinition {
    pub fn new(name: &str, patterns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            patterns: to_owned(patterns),
        }
    }
}

// AI-company agents are kept apart so they can be categorized on their own.
const AI_AGENTS: &[&str] = &[
    "gptbot",
    "chatgpt-user",
    "oai-searchbot",
    "claudebot",
    "claude-web",
    "claude-user",
    "claude-searchbot",
    "anthropic-ai",
    "perplexitybot",
    "perplexity-user",
    "ccbot",
    "google-extended",
    "googleother",
    "bytespider",
    "amazonbot",
    "applebot-extended",
    "cohere-ai",
    "cohere-training-data-crawler",
    "meta-externalagent",
    "meta-externalfetcher",
    "facebookbot",
    "diffbot",
    "youbot",
    "ai2bot",
    "omgili",
    "timpibot",
    "imagesiftbot",
    "mistralai-user",
    "duckassistbot",
    "petalbot",
];

const SEARCH_ENGINES: &[&str] = &[
    "googlebot",
    "bingbot",
    "bingpreview",
    "msnbot",
    "slurp",
    "duckduckbot",
    "baiduspider",
    "yandexbot",
    "yandex.com/bots",
    "sogou",
    "exabot",
    "applebot",
    "seznambot",
    "naverbot",
    "yeti",
    "qwantify",
    "mojeekbot",
    "coccocbot",
];

const SEO_MARKETING: &[&str] = &[
    "ahrefsbot",
    "semrushbot",
    "mj12bot",
    "dotbot",
    "rogerbot",
    "screaming frog",
    "blexbot",
    "serpstatbot",
    "dataforseobot",
    "seokicks",
    "megaindex",
    "barkrowler",
    "linkdexbot",
    "siteauditbot",
    "sistrix",
];

const GENERIC: &[&str] = &["bot", "crawler", "spider", "scraper"];

const SOCIAL_PREVIEW: &[&str] = &[
    "facebookexternalhit",
    "twitterbot",
    "linkedinbot",
    "slackbot",
    "discordbot",
    "telegrambot",
    "whatsapp",
    "pinterest",
    "redditbot",
    "skypeuripreview",
];

const MONITORING: &[&str] = &[
    r"uptime(robot|-kuma)",
    "pingdom",
    "statuscake",
    "site24x7",
    "newrelicpinger",
    "datadog",
    "checkly",
    "better uptime",
];

const ARCHIVAL: &[&str] = &["ia_archiver", "archive.org_bot", "heritrix", "wayback"];

const SECURITY_SCANNERS: &[&str] = &[
    "sqlmap",
    "nikto",
    "nessus",
    "nmap",
    "masscan",
    "zgrab",
    "gobuster",
    "dirbuster",
    "nuclei",
    "censysinspect",
    "shodan",
    "expanse",
];

const TOOLS: &[&str] = &[
    r"^curl/",
    r"^wget/",
    r"python-(requests|urllib)",
    "go-http-client",
    r"^java/",
    "headlesschrome",
    "phantomjs",
];

fn to_owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

impl Default for PatternConfig {
    fn default() -> Self {
        let bot_patterns = [
            GENERIC,
            SEARCH_ENGINES,
            SOCIAL_PREVIEW,
            SEO_MARKETING,
            MONITORING,
            ARCHIVAL,
            SECURITY_SCANNERS,
            TOOLS,
            AI_AGENTS,
        ]
        .concat();

        Self {
            bot_patterns: to_owned(&bot_patterns),
            categories: vec![
                CategoryDefinition::new(AI_CATEGORY, AI_AGENTS),
                CategoryDefinition::new(SEARCH_CATEGORY, SEARCH_ENGINES),
                CategoryDefinition::new(SEO_CATEGORY, SEO_MARKETING),
            ],
        }
    }
}

impl PatternConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pattern set with no patterns at all; every user-agent is a non-bot.
    pub fn empty() -> Self {
        Self {
            bot_patterns: Vec::new(),
            categories: Vec::new(),
        }
    }

    /// Load an operator-supplied pattern file (JSON).
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read pattern file: {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Invalid pattern file: {}", path.display()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn with_bot_pattern(mut self, pattern: &str) -> Self {
        self.bot_patterns.push(pattern.to_string());
        self
    }

    pub fn with_category(mut self, name: &str, patterns: &[&str]) -> Self {
        self.categories.push(CategoryDefinition::new(name, patterns));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PatternConfig::default();
        assert!(config.bot_patterns.iter().any(|p| p == "bot"));
        assert!(config.bot_patterns.iter().any(|p| p == "gptbot"));
        let names: Vec<&str> = config.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec![AI_CATEGORY, SEARCH_CATEGORY, SEO_CATEGORY]);
    }

    #[test]
    fn test_builder() {
        let config = PatternConfig::empty()
            .with_bot_pattern("mybot")
            .with_category("Internal", &["mybot"]);

        assert_eq!(config.bot_patterns, vec!["mybot".to_string()]);
        assert_eq!(config.categories.len(), 1);
        assert_eq!(config.categories[0].name, "Internal");
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "bot_patterns": ["examplebot", "^probe/"],
            "categories": [{ "name": "Probes", "patterns": ["^probe/"] }]
        }"#;
        let config = PatternConfig::from_json_str(json).unwrap();
        assert_eq!(config.bot_patterns.len(), 2);
        assert_eq!(config.categories[0].patterns, vec!["^probe/".to_string()]);
    }

    #[test]
    fn test_categories_optional_in_json() {
        let config = PatternConfig::from_json_str(r#"{ "bot_patterns": ["x"] }"#).unwrap();
        assert!(config.categories.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert!(PatternConfig::from_json_str("not json").is_err());
    }
}
