//! User-agent extraction for the supported access-log grammars.
//!
//! Apache/Nginx lines carry the user-agent as a double-quoted field, usually
//! the last one. IIS W3C lines carry it as a whitespace-delimited token with
//! `+` standing in for spaces and reserved bytes percent-encoded.

use crate::log_format_detector::LogFormat;
use crate::traits::UserAgentExtractor;
use memchr::memchr_iter;
use percent_encoding::percent_decode_str;
use smallvec::SmallVec;

/// Tokens that identify a quoted field as a user-agent when the layout is
/// not the standard one.
const UA_HINTS: [&str; 6] = ["Mozilla", "bot", "Bot", "crawler", "spider", "scan"];

/// Maximum number of whitespace-separated fields split from an IIS line.
const IIS_MAX_FIELDS: usize = 15;
/// Zero-based position of `cs(User-Agent)` in the default IIS field layout.
const IIS_USER_AGENT_FIELD: usize = 9;

/// Return the contents of every `"..."` span, in order.
///
/// Quotes pair up left to right; an unterminated trailing quote is ignored.
pub fn quoted_spans(line: &str) -> SmallVec<[&str; 4]> {
    let mut spans = SmallVec::new();
    let mut open: Option<usize> = None;

    for pos in memchr_iter(b'"', line.as_bytes()) {
        match open.take() {
            None => open = Some(pos + 1),
            Some(start) => spans.push(&line[start..pos]),
        }
    }

    spans
}

/// Split on runs of whitespace into at most `max` fields; the last field
/// keeps the remainder of the line, embedded spaces included.
pub fn split_fields(line: &str, max: usize) -> SmallVec<[&str; 16]> {
    let mut fields = SmallVec::new();
    let mut rest = line.trim();

    while !rest.is_empty() {
        if fields.len() + 1 == max {
            fields.push(rest);
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                fields.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                fields.push(rest);
                break;
            }
        }
    }

    fields
}

/// Decode an IIS-encoded field: `+` becomes a space, then `%XX` escapes are
/// resolved. Invalid UTF-8 after decoding is replaced lossily.
pub fn decode_iis_field(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApacheExtractor;

impl ApacheExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl UserAgentExtractor for ApacheExtractor {
    fn extract(&self, line: &str) -> Option<String> {
        let spans = quoted_spans(line);

        match spans.len() {
            // Vendor-appended fields come after the user-agent in some
            // layouts, but the common case puts it last.
            n if n >= 4 => spans.last().map(|s| s.to_string()),
            // Referer missing.
            3 => Some(spans[2].to_string()),
            _ => spans
                .iter()
                .find(|span| UA_HINTS.iter().any(|hint| span.contains(hint)))
                .map(|s| s.to_string()),
        }
    }

    fn format(&self) -> LogFormat {
        LogFormat::Apache
    }

    fn name(&self) -> &str {
        "apache"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IisExtractor;

impl IisExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl UserAgentExtractor for IisExtractor {
    fn extract(&self, line: &str) -> Option<String> {
        if line.starts_with('#') {
            return None;
        }

        let fields = split_fields(line, IIS_MAX_FIELDS);
        fields
            .get(IIS_USER_AGENT_FIELD)
            .map(|raw| decode_iis_field(raw))
    }

    fn format(&self) -> LogFormat {
        LogFormat::Iis
    }

    fn name(&self) -> &str {
        "iis"
    }
}

/// Pick the extractor for a detected format. `Unknown` files have no data
/// lines, so they get none.
pub fn extractor_for(format: LogFormat) -> Option<Box<dyn UserAgentExtractor>> {
    match format {
        LogFormat::Apache => Some(Box::new(ApacheExtractor)),
        LogFormat::Iis => Some(Box::new(IisExtractor)),
        LogFormat::Unknown => None,
    }
}
