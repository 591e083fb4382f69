//! Multi-file driver: process every file independently, then reduce the
//! per-file results into global statistics in one sequential pass.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::aggregator::GlobalStats;
use crate::analyzer_config::AnalyzerConfig;
use crate::bot_classifier::BotClassifier;
use crate::categorizer::Categorizer;
use crate::file_processor::{FileProcessor, FileStats};
use crate::pattern_config::PatternConfig;
use crate::report::AnalysisReport;

pub struct BotTrafficAnalyzer {
    classifier: BotClassifier,
    categorizer: Categorizer,
    config: AnalyzerConfig,
}

impl BotTrafficAnalyzer {
    pub fn new(patterns: &PatternConfig) -> Result<Self> {
        Self::with_config(patterns, AnalyzerConfig::default())
    }

    pub fn with_config(patterns: &PatternConfig, config: AnalyzerConfig) -> Result<Self> {
        let classifier = BotClassifier::from_config(patterns)?;
        let categorizer = Categorizer::from_config(patterns)?;

        info!(
            "Analyzer ready: {} bot patterns, {} categories",
            classifier.pattern_count(),
            categorizer.category_names().len()
        );

        Ok(Self {
            classifier,
            categorizer,
            config,
        })
    }

    /// Process every path. FileStats come back in input order; a file that
    /// cannot be read contributes zero records instead of failing the run.
    pub fn process_files<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> Result<Vec<FileStats>> {
        let run = || -> Vec<FileStats> {
            let processor = FileProcessor::with_config(&self.classifier, self.config.clone());
            paths
                .par_iter()
                .map(|path| processor.process_path(path.as_ref()))
                .collect()
        };

        match self.config.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .context("Failed to build worker pool")?;
                Ok(pool.install(run))
            }
            None => Ok(run()),
        }
    }

    /// Full pipeline: per-file stats, global merge and ranking, categorization.
    pub fn analyze<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> Result<AnalysisReport> {
        if paths.is_empty() {
            info!("No log files to analyze");
        }

        let files = self.process_files(paths)?;
        let global = GlobalStats::from_files(&files);
        let categories = self.categorizer.categorize(&global);

        info!(
            "Analyzed {} files ({} failed): {} requests, {} bots ({:.2}%), {} unique bots",
            global.files_processed,
            global.files_failed,
            global.total_requests,
            global.bot_requests,
            global.bot_percentage(),
            global.unique_bot_count()
        );

        Ok(AnalysisReport {
            files,
            top_bots: global.top_bots(self.config.top_bots_limit),
            global,
            categories,
        })
    }
}

/// Expand path arguments: files are taken as-is, directories contribute
/// their regular files (one level, sorted by name). Unreadable directories
/// and entries are logged and skipped.
pub fn collect_log_files<P: AsRef<Path>>(inputs: &[P]) -> Vec<PathBuf> {
    expand_inputs(inputs, list_dir)
}

fn list_dir(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_file() {
                    files.push(path);
                }
            }
            Err(e) => warn!("Skipping unreadable entry in {}: {}", dir.display(), e),
        }
    }

    files.sort();
    Ok(files)
}

fn expand_inputs<P, F>(inputs: &[P], list: F) -> Vec<PathBuf>
where
    P: AsRef<Path>,
    F: Fn(&Path) -> io::Result<Vec<PathBuf>>,
{
    let mut files = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        if !input.is_dir() {
            files.push(input.to_path_buf());
            continue;
        }
        match list(input) {
            Ok(entries) => files.extend(entries),
            Err(e) => warn!("Skipping unreadable directory {}: {}", input.display(), e),
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unreadable_directory_is_skipped() {
        let root = TempDir::new().unwrap();
        let good = root.path().join("good");
        let bad = root.path().join("bad");
        fs::create_dir(&good).unwrap();
        fs::create_dir(&bad).unwrap();
        fs::write(good.join("access.log"), "x").unwrap();
        let explicit = root.path().join("explicit.log");

        let list = |dir: &Path| {
            if dir == bad.as_path() {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            } else {
                list_dir(dir)
            }
        };
        let files = expand_inputs(&[bad.clone(), good.clone(), explicit.clone()], list);

        assert_eq!(files, vec![good.join("access.log"), explicit]);
    }

    #[test]
    fn test_list_dir_only_regular_files() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("b.log"), "x").unwrap();
        fs::write(root.path().join("a.log"), "x").unwrap();
        fs::create_dir(root.path().join("nested")).unwrap();

        let files = list_dir(root.path()).unwrap();
        assert_eq!(files, vec![root.path().join("a.log"), root.path().join("b.log")]);
    }
}
