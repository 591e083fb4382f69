//! Per-file pipeline: detect the format once, then extract and classify
//! every data line while streaming.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::analyzer_config::AnalyzerConfig;
use crate::bot_classifier::{is_usable_user_agent, BotClassifier};
use crate::field_extractor::extractor_for;
use crate::log_format_detector::{LogFormat, LogFormatDetector};
use crate::traits::UserAgentExtractor;

/// Per user-agent bot hit counts.
pub type BotCounts = FxHashMap<String, u64>;

/// `part / whole * 100`, rounded to two decimals; zero when `whole` is zero.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 10_000.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopBot {
    pub user_agent: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStats {
    pub file_name: String,
    pub format: LogFormat,
    pub total_requests: u64,
    pub bot_requests: u64,
    pub bot_percentage: f64,
    pub unique_bot_count: usize,
    pub top_bots: Vec<TopBot>,
    #[serde(skip)]
    pub bot_counts: BotCounts,
    /// Set when the file could not be read and contributes no records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileStats {
    /// Zero-record stats for a file with no content lines.
    pub fn empty(file_name: &str, format: LogFormat) -> Self {
        Self {
            file_name: file_name.to_string(),
            format,
            total_requests: 0,
            bot_requests: 0,
            bot_percentage: 0.0,
            unique_bot_count: 0,
            top_bots: Vec::new(),
            bot_counts: BotCounts::default(),
            error: None,
        }
    }

    /// Zero-record stats for a file that failed to read.
    pub fn failed(file_name: &str, error: impl std::fmt::Display) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::empty(file_name, LogFormat::Unknown)
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Running counts for one file. Bot entries are kept in first-seen order so
/// equal counts rank deterministically.
#[derive(Debug, Default)]
struct FileTally {
    total_requests: u64,
    bot_requests: u64,
    index: FxHashMap<String, usize>,
    entries: Vec<TopBot>,
}

impl FileTally {
    fn record_request(&mut self) {
        self.total_requests += 1;
    }

    fn record_bot(&mut self, user_agent: String) {
        self.bot_requests += 1;
        if let Some(&idx) = self.index.get(&user_agent) {
            self.entries[idx].count += 1;
        } else {
            self.index.insert(user_agent.clone(), self.entries.len());
            self.entries.push(TopBot {
                user_agent,
                count: 1,
            });
        }
    }

    fn finish(self, file_name: &str, format: LogFormat, top_limit: usize) -> FileStats {
        let bot_counts: BotCounts = self
            .entries
            .iter()
            .map(|e| (e.user_agent.clone(), e.count))
            .collect();

        let mut ranked = self.entries;
        // Stable: ties keep first-seen order.
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(top_limit);

        FileStats {
            file_name: file_name.to_string(),
            format,
            total_requests: self.total_requests,
            bot_requests: self.bot_requests,
            bot_percentage: percentage(self.bot_requests, self.total_requests),
            unique_bot_count: bot_counts.len(),
            top_bots: ranked,
            bot_counts,
            error: None,
        }
    }
}

pub struct FileProcessor<'a> {
    classifier: &'a BotClassifier,
    detector: LogFormatDetector,
    config: AnalyzerConfig,
}

impl<'a> FileProcessor<'a> {
    pub fn new(classifier: &'a BotClassifier) -> Self {
        Self::with_config(classifier, AnalyzerConfig::default())
    }

    pub fn with_config(classifier: &'a BotClassifier, config: AnalyzerConfig) -> Self {
        Self {
            classifier,
            detector: LogFormatDetector::new(),
            config,
        }
    }

    pub fn with_detector(mut self, detector: LogFormatDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Process one file on disk. Read failures are logged and yield
    /// zero-record stats.
    pub fn process_path(&self, path: &Path) -> FileStats {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match File::open(path) {
            Ok(file) => self.process_reader(&file_name, BufReader::new(file)),
            Err(e) => {
                warn!("Failed to open {}: {}", path.display(), e);
                FileStats::failed(&file_name, e)
            }
        }
    }

    /// Process any line-oriented reader in a single pass.
    ///
    /// The first `sample_size` content lines are buffered for format
    /// detection and then replayed through the extractor before the rest of
    /// the stream is read.
    pub fn process_reader<R: BufRead>(&self, file_name: &str, reader: R) -> FileStats {
        let mut lines = reader.lines();
        let mut sample: Vec<String> = Vec::with_capacity(self.config.sample_size);

        while sample.len() < self.config.sample_size {
            match lines.next() {
                Some(Ok(line)) => {
                    if !LogFormatDetector::is_skippable(&line) {
                        sample.push(line);
                    }
                }
                Some(Err(e)) => return self.read_failure(file_name, e),
                None => break,
            }
        }

        let format = self.detector.detect(sample.as_slice());
        let Some(extractor) = extractor_for(format) else {
            debug!("{}: no content lines, format unknown", file_name);
            return FileStats::empty(file_name, format);
        };
        debug!(
            "{}: detected {} format, using {} extractor",
            file_name,
            extractor.format(),
            extractor.name()
        );

        let mut tally = FileTally::default();
        for line in sample.iter() {
            self.process_line(line, extractor.as_ref(), &mut tally);
        }
        for line in lines {
            match line {
                Ok(line) => self.process_line(&line, extractor.as_ref(), &mut tally),
                Err(e) => return self.read_failure(file_name, e),
            }
        }

        let stats = tally.finish(file_name, format, self.config.top_bots_limit);
        info!(
            "Processed {} ({}): {} requests, {} bots ({:.2}%), {} unique bots",
            stats.file_name,
            stats.format,
            stats.total_requests,
            stats.bot_requests,
            stats.bot_percentage,
            stats.unique_bot_count
        );
        stats
    }

    fn process_line(
        &self,
        line: &str,
        extractor: &dyn UserAgentExtractor,
        tally: &mut FileTally,
    ) {
        if LogFormatDetector::is_skippable(line) {
            return;
        }
        tally.record_request();

        let Some(user_agent) = extractor.extract(line.trim()) else {
            tracing::trace!("no user-agent in line: {}", line);
            return;
        };
        if !is_usable_user_agent(&user_agent) {
            return;
        }
        if self.classifier.is_bot(&user_agent) {
            tally.record_bot(user_agent);
        }
    }

    fn read_failure(&self, file_name: &str, error: std::io::Error) -> FileStats {
        warn!("Failed to read {}: {}", file_name, error);
        FileStats::failed(file_name, error)
    }
}
