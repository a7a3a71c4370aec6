//! Whitespace and punctuation clean-up for legal text.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));
static REPEATED_DOTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").expect("dots pattern"));
static REPEATED_COMMAS: Lazy<Regex> = Lazy::new(|| Regex::new(r",{2,}").expect("commas pattern"));

/// Collapse whitespace runs to a single space, squeeze repeated `.` and `,`, trim.
///
/// Line structure is not preserved, so this is for embedding or display
/// text, never for input to provision extraction.
pub fn normalize_legal_text(text: &str) -> String {
    let text = WHITESPACE.replace_all(text, " ");
    let text = REPEATED_DOTS.replace_all(&text, ".");
    let text = REPEATED_COMMAS.replace_all(&text, ",");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize_legal_text("  Article 1.  Scope\n\tof   the code...,, and more  "),
            "Article 1. Scope of the code., and more"
        );
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_legal_text(" \n "), "");
    }
}
