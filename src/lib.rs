// Core pipeline
pub mod log_format_detector;
pub mod field_extractor;
pub mod bot_classifier;
pub mod file_processor;
pub mod aggregator;
pub mod categorizer;

// Configuration
pub mod analyzer_config;
pub mod config;
pub mod pattern_config;

// Driver and collaborator seams
pub mod analyzer;
pub mod report;
pub mod traits;

pub use aggregator::GlobalStats;
pub use analyzer::BotTrafficAnalyzer;
pub use bot_classifier::BotClassifier;
pub use categorizer::{CategoryStats, Categorizer};
pub use file_processor::{FileProcessor, FileStats};
pub use log_format_detector::LogFormat;
pub use pattern_config::PatternConfig;
