//! Keyword summarizer for policy documents.
//!
//! Splits on sentence terminators, keeps sentences that are long enough and
//! mention a sustainability keyword, and renders the first few as a
//! numbered list. Never returns an empty string.

use once_cell::sync::Lazy;
use regex::Regex;

pub const SUMMARY_KEYWORDS: &[&str] = &[
    "sustainable",
    "environment",
    "energy",
    "water",
    "waste",
    "transport",
    "green",
    "carbon",
    "renewable",
];

pub const DEFAULT_MAX_POINTS: usize = 3;
/// Trimmed sentences must be longer than this many characters.
pub const DEFAULT_MIN_SENTENCE_LEN: usize = 20;

pub const SUMMARY_FALLBACK: &str =
    "Summary: This policy document focuses on urban sustainability initiatives and environmental regulations.";

static SENTENCE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").expect("sentence regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryParams {
    pub max_points: usize,
    pub min_sentence_len: usize,
}

impl Default for SummaryParams {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_POINTS,
            min_sentence_len: DEFAULT_MIN_SENTENCE_LEN,
        }
    }
}

/// Sentences that qualify as key points, in document order (uncapped).
pub fn key_sentences<'a>(text: &'a str, min_len: usize) -> impl Iterator<Item = &'a str> + 'a {
    SENTENCE_SPLIT
        .split(text)
        .map(str::trim)
        .filter(move |s| s.chars().count() > min_len)
        .filter(|s| {
            let lower = s.to_lowercase();
            SUMMARY_KEYWORDS.iter().any(|k| lower.contains(k))
        })
}

pub fn summarize(text: &str, params: SummaryParams) -> String {
    let points: Vec<String> = key_sentences(text, params.min_sentence_len)
        .take(params.max_points)
        .enumerate()
        .map(|(i, s)| format!("{}. {}.", i + 1, s))
        .collect();

    if points.is_empty() {
        return SUMMARY_FALLBACK.to_string();
    }
    format!("Key Policy Points:\n\n{}", points.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: &str = "The city will expand renewable energy across all districts. \
        Parking fees rise next year for downtown visitors! \
        Every household must separate organic waste from recyclables? \
        Green. \
        New bus lanes will improve public transport reliability. \
        Carbon reporting becomes mandatory for large employers.";

    #[test]
    fn keeps_first_three_keyword_sentences_in_order() {
        let out = summarize(POLICY, SummaryParams::default());
        let expected = "Key Policy Points:\n\n\
            1. The city will expand renewable energy across all districts.\n\n\
            2. Every household must separate organic waste from recyclables.\n\n\
            3. New bus lanes will improve public transport reliability.";
        assert_eq!(out, expected);
    }

    #[test]
    fn short_keyword_sentence_is_dropped() {
        let hits: Vec<&str> = key_sentences("Go green now. Water bills are rising this summer.", 20).collect();
        assert_eq!(hits, vec!["Water bills are rising this summer"]);
    }

    #[test]
    fn exactly_min_length_is_not_enough() {
        // 20 characters after trimming
        let s = "green roofs are good";
        assert_eq!(s.chars().count(), 20);
        assert_eq!(summarize(s, SummaryParams::default()), SUMMARY_FALLBACK);
    }

    #[test]
    fn no_keywords_falls_back() {
        let out = summarize(
            "Parking permits will be renewed annually by the council office.",
            SummaryParams::default(),
        );
        assert_eq!(out, SUMMARY_FALLBACK);
    }

    #[test]
    fn empty_input_falls_back() {
        assert_eq!(summarize("", SummaryParams::default()), SUMMARY_FALLBACK);
    }

    #[test]
    fn keywords_match_case_insensitively() {
        let out = summarize("CARBON NEUTRALITY IS TARGETED FOR 2040", SummaryParams::default());
        assert!(out.starts_with("Key Policy Points:"));
        assert!(out.contains("1. CARBON NEUTRALITY IS TARGETED FOR 2040."));
    }
}
