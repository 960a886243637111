// Sentence Segmenter Service
// Splits one paragraph-level string into sentence spans using a layered
// fallback: punctuation scan with abbreviation guards, then an explicit
// stem-list split, then a naive period split.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Strings at or below this length are assumed to be a single sentence when
/// the primary split finds no boundary; longer ones trigger the fallbacks.
const FALLBACK_MIN_CHARS: usize = 50;

/// Per-language abbreviation stems that must not be treated as sentence ends.
///
/// The stem lists are configuration, not a built-in constant, so callers can
/// extend the segmenter to other language pairs without touching the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmenterConfig {
    pub abbreviations: HashMap<String, Vec<String>>,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        let mut abbreviations = HashMap::new();
        abbreviations.insert(
            "en".to_string(),
            ["Mr", "Mrs", "Dr", "Ms", "Prof", "Rev", "St"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        abbreviations.insert(
            "cs".to_string(),
            ["p", "č", "str", "r"].iter().map(|s| s.to_string()).collect(),
        );
        Self { abbreviations }
    }
}

impl SegmenterConfig {
    pub fn stems_for(&self, lang: &str) -> &[String] {
        self.abbreviations.get(lang).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Sentence segmenter for one language pair.
///
/// Guard stems of both languages apply to either column: rows routinely mix
/// proper names and citations across languages, and a spurious guard is
/// cheaper than a spurious split.
pub struct Segmenter {
    stems: Vec<String>,
}

impl Segmenter {
    pub fn for_pair(config: &SegmenterConfig, source_lang: &str, target_lang: &str) -> Self {
        let mut stems: Vec<String> = Vec::new();
        for lang in [source_lang, target_lang] {
            for stem in config.stems_for(lang) {
                if !stems.contains(stem) {
                    stems.push(stem.clone());
                }
            }
        }

        // Unknown language pairs still get the default guard list rather than
        // an unguarded fallback split.
        if stems.is_empty() {
            let defaults = SegmenterConfig::default();
            for list in defaults.abbreviations.values() {
                for stem in list {
                    if !stems.contains(stem) {
                        stems.push(stem.clone());
                    }
                }
            }
        }

        Self { stems }
    }

    /// Split `text` into trimmed sentence spans with normalized terminal
    /// punctuation. Empty or whitespace-only input yields no spans.
    pub fn segment(&self, text: &str) -> Vec<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return vec![];
        }

        let mut spans = primary_split(trimmed);

        // A single segment from a long string means the primary pattern most
        // likely failed to find real boundaries.
        if spans.len() <= 1 && trimmed.chars().count() > FALLBACK_MIN_CHARS {
            debug!(
                "[segmenter] primary split found no boundary in {} chars, trying fallbacks",
                trimmed.chars().count()
            );
            spans = match self.abbreviation_split(trimmed) {
                Some(alt) => alt,
                None => naive_split(trimmed),
            };
        }

        normalize_spans(spans)
    }

    /// Abbreviation-aware fallback: cut after every period that is followed by
    /// whitespace and an uppercase letter or digit, unless the token before
    /// the period is a configured stem. Returns None when no boundary matches.
    fn abbreviation_split(&self, text: &str) -> Option<Vec<String>> {
        let boundary_re = Regex::new(r"\.\s+[A-Z0-9]").unwrap();

        let mut cuts: Vec<usize> = Vec::new();
        for m in boundary_re.find_iter(text) {
            let dot = m.start();
            if self.ends_in_stem(&text[..dot]) {
                continue;
            }
            cuts.push(dot + 1);
        }

        if cuts.is_empty() {
            return None;
        }

        let mut spans = Vec::with_capacity(cuts.len() + 1);
        let mut prev = 0usize;
        for cut in cuts {
            spans.push(text[prev..cut].trim().to_string());
            prev = cut;
        }
        if prev < text.len() {
            spans.push(text[prev..].trim().to_string());
        }
        Some(spans)
    }

    /// True when `prefix` ends in one of the stems as a whole token.
    fn ends_in_stem(&self, prefix: &str) -> bool {
        self.stems.iter().any(|stem| {
            prefix.ends_with(stem.as_str()) && {
                let boundary = prefix.len() - stem.len();
                prefix[..boundary]
                    .chars()
                    .next_back()
                    .map_or(true, |c| !is_word_char(c))
            }
        })
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Primary split: sentence-final punctuation followed by whitespace, with two
/// regex-level guards. A `w.w.`-shaped tail suppresses the boundary
/// (initialisms like "U.S.", dotted numbers); so does a capital plus a single
/// lowercase letter before the period (titles like "Mr.", "Dr.").
fn primary_split(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut spans = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let ch = chars[i];
        let boundary = matches!(ch, '.' | '!' | '?')
            && i + 1 < chars.len()
            && chars[i + 1].is_whitespace()
            && !initialism_guard(&chars, i)
            && !title_guard(&chars, i);

        if boundary {
            spans.push(chars[start..=i].iter().collect());
            // The boundary consumes the single whitespace char after the
            // punctuation; any further whitespace is trimmed later.
            start = i + 2;
            i += 2;
        } else {
            i += 1;
        }
    }

    if start < chars.len() {
        spans.push(chars[start..].iter().collect());
    }

    spans
}

fn initialism_guard(chars: &[char], i: usize) -> bool {
    i >= 3 && is_word_char(chars[i - 1]) && chars[i - 2] == '.' && is_word_char(chars[i - 3])
}

fn title_guard(chars: &[char], i: usize) -> bool {
    chars[i] == '.'
        && i >= 2
        && chars[i - 2].is_ascii_uppercase()
        && chars[i - 1].is_ascii_lowercase()
}

/// Last-resort split on literal ". ", re-appending the period each piece lost.
fn naive_split(text: &str) -> Vec<String> {
    text.split(". ")
        .filter(|piece| !piece.trim().is_empty())
        .map(|piece| format!("{}.", piece).trim().to_string())
        .collect()
}

/// Trim spans, drop empties, and normalize terminal punctuation: a double
/// period loses its last character, a span with no terminal mark gains one.
fn normalize_spans(spans: Vec<String>) -> Vec<String> {
    spans
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(|mut s| {
            if s.ends_with("..") {
                s.pop();
            } else if !s.ends_with(['.', '!', '?']) {
                s.push('.');
            }
            s
        })
        .collect()
}
