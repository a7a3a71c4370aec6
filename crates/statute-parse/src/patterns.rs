//! Single-line marker recognition against the level taxonomy.
//!
//! Levels are tried broadest first and the first recognizer that matches
//! wins. Level keywords match case-insensitively in English and in the
//! source-language vocabulary; ordinals are returned exactly as written.

use once_cell::sync::Lazy;
use regex::Regex;
use statute_core::Level;

/// A recognised structural marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerMatch {
    pub level: Level,
    pub ordinal: String,
    /// Heading text after the marker, `None` when empty.
    pub heading: Option<String>,
}

pub(crate) const ROMAN: &str = r"[IVXLCDM]+";

/// Spelled-out Part ordinals, cardinal and ordinal forms.
pub(crate) const ORDINAL_WORDS: &str = "one|two|three|four|five|six|seven|eight|nine|ten|\
     first|second|third|fourth|fifth|sixth|seventh|eighth|ninth|tenth";

static LEVEL_PATTERNS: Lazy<Vec<(Level, Vec<Regex>)>> = Lazy::new(|| {
    let compile = |pattern: String| Regex::new(&pattern).expect("marker pattern");
    vec![
        (
            Level::Part,
            vec![compile(format!(
                r"^(?i:part|phần)\s+({ROMAN}|\d+|(?i:thứ)\s+\p{{L}}+|(?i:{ORDINAL_WORDS}))\s*:\s*(.*)$"
            ))],
        ),
        (
            Level::Chapter,
            vec![compile(format!(
                r"^(?i:chapter|chương)\s+({ROMAN}|\d+)\s*:\s*(.*)$"
            ))],
        ),
        (
            Level::Section,
            vec![compile(format!(r"^(?i:section|mục)\s+({ROMAN}|\d+)\s*:\s*(.*)$"))],
        ),
        (
            Level::Article,
            vec![compile(r"^(?i:article|điều)\s+(\d+)\s*\.\s*(.*)$".to_string())],
        ),
        (
            // Letters stay lowercase so Roman headings never read as clauses.
            Level::Clause,
            vec![
                compile(r"^(\d+)\.\s+(.+)$".to_string()),
                compile(r"^([a-z])\)\s+(.+)$".to_string()),
                compile(r"^([a-z])\.\s+(.+)$".to_string()),
            ],
        ),
    ]
});

/// Classify one line. Surrounding whitespace is ignored.
pub fn match_marker(line: &str) -> Option<MarkerMatch> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    for (level, patterns) in LEVEL_PATTERNS.iter() {
        for re in patterns {
            if let Some(caps) = re.captures(line) {
                let ordinal = caps.get(1)?.as_str().to_string();
                let heading = caps
                    .get(2)
                    .map(|m| m.as_str().trim())
                    .filter(|h| !h.is_empty())
                    .map(String::from);
                return Some(MarkerMatch {
                    level: *level,
                    ordinal,
                    heading,
                });
            }
        }
    }
    None
}
