use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::analyzer_config::AnalyzerConfig;
use crate::pattern_config::PatternConfig;

#[derive(Debug, Clone)]
pub struct Config {
    // Pattern sets (optional JSON file, built-in defaults otherwise)
    pub patterns_file: Option<PathBuf>,

    // Processing
    pub threads: Option<usize>,
    pub sample_size: Option<usize>,
    pub top_bots_limit: Option<usize>,

    // Output
    pub pretty_output: bool,
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} must be a number, got '{}'", name, raw)),
        Err(_) => Ok(None),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            patterns_file: env::var("BOT_PATTERNS_FILE").ok().map(PathBuf::from),

            threads: parse_var("ANALYZER_THREADS")?,
            sample_size: parse_var("ANALYZER_SAMPLE_SIZE")?,
            top_bots_limit: parse_var("ANALYZER_TOP_BOTS")?,

            pretty_output: env::var("ANALYZER_PRETTY")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(true),
        })
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        let mut config = AnalyzerConfig::new();
        if let Some(threads) = self.threads {
            config = config.with_threads(threads);
        }
        if let Some(size) = self.sample_size {
            config = config.with_sample_size(size);
        }
        if let Some(limit) = self.top_bots_limit {
            config = config.with_top_bots_limit(limit);
        }
        config
    }

    pub fn pattern_config(&self) -> Result<PatternConfig> {
        match &self.patterns_file {
            Some(path) => PatternConfig::from_json_file(path),
            None => Ok(PatternConfig::default()),
        }
    }

    pub fn log_config(&self) {
        tracing::info!("📋 Configuration:");
        match &self.patterns_file {
            Some(path) => tracing::info!("   Patterns file: {}", path.display()),
            None => tracing::info!("   Patterns file: (built-in defaults)"),
        }
        match self.threads {
            Some(threads) => tracing::info!("   Worker threads: {}", threads),
            None => tracing::info!("   Worker threads: (rayon default)"),
        }
        let analyzer = self.analyzer_config();
        tracing::info!("   Sample size: {}", analyzer.sample_size);
        tracing::info!("   Top bots (per file and overall): {}", analyzer.top_bots_limit);
        tracing::info!("   Pretty output: {}", self.pretty_output);
    }
}
