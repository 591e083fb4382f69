use serde::{Deserialize, Serialize};

use crate::log_format_detector::DEFAULT_SAMPLE_SIZE;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Content lines inspected for format detection
    pub sample_size: usize,
    /// Length of the per-file and global top-bot rankings
    pub top_bots_limit: usize,
    /// Worker threads for multi-file runs; `None` uses rayon's global pool
    pub threads: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            top_bots_limit: 5,
            threads: None,
        }
    }
}

impl AnalyzerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process files one at a time on the calling thread's pool.
    pub fn sequential() -> Self {
        Self {
            threads: Some(1),
            ..Default::default()
        }
    }

    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size.max(1);
        self
    }

    pub fn with_top_bots_limit(mut self, limit: usize) -> Self {
        self.top_bots_limit = limit;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.sample_size, 10);
        assert_eq!(config.top_bots_limit, 5);
        assert_eq!(config.threads, None);
    }

    #[test]
    fn test_builder() {
        let config = AnalyzerConfig::new()
            .with_sample_size(0)
            .with_top_bots_limit(3)
            .with_threads(0);

        assert_eq!(config.sample_size, 1);
        assert_eq!(config.top_bots_limit, 3);
        assert_eq!(config.threads, Some(1));
    }

    #[test]
    fn test_sequential() {
        assert_eq!(AnalyzerConfig::sequential().threads, Some(1));
    }
}
