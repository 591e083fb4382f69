/// Seams between the analysis pipeline and its collaborators
///
/// This module provides trait-based abstractions for:
/// - User-agent extraction (one strategy per log grammar)
/// - Report rendering (the consumer of the aggregated statistics)
///
/// This allows you to plug in another log grammar or output format
/// without touching the processing and aggregation code.
use crate::log_format_detector::LogFormat;
use crate::report::AnalysisReport;
use anyhow::Result;

// ============================================================================
// User-Agent Extraction Trait
// ============================================================================

/// Trait for pulling the user-agent field out of one data line
///
/// Implementations exist for:
/// - Apache/Nginx common and combined logs
/// - IIS W3C extended logs
pub trait UserAgentExtractor: Send + Sync {
    /// Extract the user-agent from a single line
    ///
    /// # Returns
    /// - `Some(user_agent)` when the field could be located
    /// - `None` when the line is malformed or carries no such field
    fn extract(&self, line: &str) -> Option<String>;

    /// The log grammar this extractor understands
    fn format(&self) -> LogFormat;

    /// Get the name/identifier of this extractor (for logging)
    fn name(&self) -> &str;
}

// ============================================================================
// Report Renderer Trait
// ============================================================================

/// Trait for turning a finished analysis into output
///
/// Implementations can produce:
/// - JSON documents
/// - Human-readable text reports
/// - CSV exports
pub trait ReportRenderer {
    /// Render the report to a string
    fn render(&self, report: &AnalysisReport) -> Result<String>;

    /// Render the report into any writer
    ///
    /// Default implementation renders to a string first
    fn render_to<W: std::io::Write>(&self, report: &AnalysisReport, mut out: W) -> Result<()>
    where
        Self: Sized,
    {
        let rendered = self.render(report)?;
        out.write_all(rendered.as_bytes())?;
        Ok(())
    }

    /// Get the name/identifier of this renderer
    fn name(&self) -> &str;
}
