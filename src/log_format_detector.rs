/// Detects which access-log grammar a file uses from a sample of its lines
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default number of content lines inspected per file.
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// IIS metadata directives that may lead a W3C extended log.
const IIS_DIRECTIVES: [&str; 4] = ["#Software", "#Version", "#Date", "#Fields"];

static IPV4_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b").unwrap());
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""[^"]*""#).unwrap());
static IIS_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static IIS_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogFormat {
    /// Apache/Nginx common or combined log format
    Apache,
    /// IIS W3C extended log format
    #[serde(rename = "IIS")]
    Iis,
    /// No content lines to decide from
    Unknown,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Apache => write!(f, "Apache"),
            LogFormat::Iis => write!(f, "IIS"),
            LogFormat::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A single detection rule: when `predicate` holds for the first sample line,
/// the file is `format`.
#[derive(Clone, Copy)]
pub struct FormatRule {
    pub name: &'static str,
    pub predicate: fn(&str) -> bool,
    pub format: LogFormat,
}

impl std::fmt::Debug for FormatRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRule")
            .field("name", &self.name)
            .field("format", &self.format)
            .finish()
    }
}

/// Ordered rule list; the first matching rule wins, otherwise `fallback`.
#[derive(Debug, Clone)]
pub struct LogFormatDetector {
    rules: Vec<FormatRule>,
    fallback: LogFormat,
}

impl Default for LogFormatDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LogFormatDetector {
    pub fn new() -> Self {
        Self {
            rules: vec![
                FormatRule {
                    name: "iis_directive",
                    predicate: Self::is_iis_directive,
                    format: LogFormat::Iis,
                },
                FormatRule {
                    name: "ip_with_quotes",
                    predicate: Self::is_ip_with_quotes,
                    format: LogFormat::Apache,
                },
                FormatRule {
                    name: "w3c_date_time",
                    predicate: Self::is_w3c_record,
                    format: LogFormat::Iis,
                },
            ],
            fallback: LogFormat::Apache,
        }
    }

    /// Append a rule evaluated after the built-in ones.
    pub fn with_rule(mut self, rule: FormatRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[FormatRule] {
        &self.rules
    }

    /// Detect the format from a sample of content lines.
    ///
    /// An empty sample yields `LogFormat::Unknown`.
    pub fn detect<S: AsRef<str>>(&self, sample: &[S]) -> LogFormat {
        let Some(first) = sample.first() else {
            return LogFormat::Unknown;
        };
        let first = first.as_ref();

        self.rules
            .iter()
            .find(|rule| (rule.predicate)(first))
            .map(|rule| {
                tracing::trace!("format rule '{}' matched", rule.name);
                rule.format
            })
            .unwrap_or(self.fallback)
    }

    /// True for lines that carry no record: blank, or `#`-prefixed once
    /// leading whitespace is trimmed.
    pub fn is_skippable(line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with('#')
    }

    fn is_iis_directive(line: &str) -> bool {
        IIS_DIRECTIVES.iter().any(|d| line.starts_with(d))
    }

    fn is_ip_with_quotes(line: &str) -> bool {
        IPV4_PREFIX.is_match(line) && QUOTED.is_match(line)
    }

    fn is_w3c_record(line: &str) -> bool {
        let fields: Vec<&str> = line.split_whitespace().collect();
        fields.len() >= 14 && IIS_DATE.is_match(fields[0]) && IIS_TIME.is_match(fields[1])
    }
}
