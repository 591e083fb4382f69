use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::aggregator::GlobalStats;
use crate::categorizer::CategoryStats;
use crate::file_processor::{FileStats, TopBot};
use crate::traits::ReportRenderer;

/// Everything a report renderer needs from one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub files: Vec<FileStats>,
    pub global: GlobalStats,
    /// Highest-count bot user-agents across all files
    #[serde(default)]
    pub top_bots: Vec<TopBot>,
    pub categories: Vec<CategoryStats>,
}

impl AnalysisReport {
    pub fn is_empty(&self) -> bool {
        self.global.total_requests == 0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportRenderer {
    pub pretty: bool,
}

impl JsonReportRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl ReportRenderer for JsonReportRenderer {
    fn render(&self, report: &AnalysisReport) -> Result<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(rendered)
    }

    fn name(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_format_detector::LogFormat;

    #[test]
    fn test_json_render() {
        let mut file = FileStats::empty("access.log", LogFormat::Iis);
        file.total_requests = 4;
        file.bot_counts.insert("GPTBot/1.0".to_string(), 2);
        let global = GlobalStats::from_files([&file]);
        let report = AnalysisReport {
            top_bots: global.top_bots(5),
            global,
            files: vec![file],
            categories: vec![CategoryStats {
                category_name: "AI Agents".to_string(),
                total_hits: 0,
                percentage_of_bot_traffic: 0.0,
            }],
        };

        let json = JsonReportRenderer::new().render(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["files"][0]["format"], "IIS");
        assert_eq!(value["files"][0]["total_requests"], 4);
        assert!(value["files"][0].get("error").is_none());
        assert_eq!(value["global"]["total_requests"], 4);
        assert_eq!(value["top_bots"][0]["user_agent"], "GPTBot/1.0");
        assert_eq!(value["top_bots"][0]["count"], 2);
        assert_eq!(value["categories"][0]["category_name"], "AI Agents");
    }

    #[test]
    fn test_render_to_writer() {
        let report = AnalysisReport::default();
        let mut out = Vec::new();
        JsonReportRenderer::pretty().render_to(&report, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("\"files\": []"));
        assert!(report.is_empty());
    }
}
