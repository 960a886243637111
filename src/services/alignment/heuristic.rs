// Heuristic Alignment Scorer
// Estimates cross-lingual translation fidelity for one sentence pair from
// statistical surface signals, with no model call and no randomness.

use regex::Regex;

use crate::models::AlignmentVerdict;

use super::ALIGNED_THRESHOLD;

// Signal weights, summing to 1.0. Numeral parity dominates: mismatched
// numbers are the strongest surface evidence of misalignment.
const WEIGHT_LENGTH_RATIO: f64 = 0.15;
const WEIGHT_END_PUNCT: f64 = 0.10;
const WEIGHT_COMMAS: f64 = 0.10;
const WEIGHT_NUMBERS: f64 = 0.30;
const WEIGHT_CAPITALS: f64 = 0.25;
const WEIGHT_WORD_RATIO: f64 = 0.10;

/// Surface heuristics carry limited trust by construction, so the reported
/// confidence never varies with input.
const HEURISTIC_CONFIDENCE: f64 = 0.6;

/// Score one (source, target) sentence pair. Pure and deterministic.
///
/// Lengths and counts are measured in Unicode scalar values. The language
/// hints only select the expected length-ratio band; en->cs targets run
/// 10-50% longer than their source, other pairs get a wider generic band.
pub fn check_alignment(
    source_text: &str,
    target_text: &str,
    source_lang: &str,
    target_lang: &str,
) -> AlignmentVerdict {
    // 1. Length ratio against the expected band for the language pair.
    let source_length = source_text.chars().count();
    let target_length = target_text.chars().count();
    let length_ratio = if source_length > 0 {
        target_length as f64 / source_length as f64
    } else {
        0.0
    };

    let (ideal_ratio_min, ideal_ratio_max) = if source_lang == "en" && target_lang == "cs" {
        (0.9, 1.5)
    } else {
        (0.6, 1.6)
    };

    let mut ratio_score = 0.0;
    if length_ratio >= ideal_ratio_min && length_ratio <= ideal_ratio_max {
        let bandwidth = ideal_ratio_max - ideal_ratio_min;
        let ratio_distance = f64::min(
            (length_ratio - ideal_ratio_min).abs() / bandwidth,
            (length_ratio - ideal_ratio_max).abs() / bandwidth,
        );
        ratio_score = 1.0 - ratio_distance;
    }

    // 2. Do both sentences end with terminal punctuation, or neither?
    let source_end_punct = ends_with_terminal(source_text);
    let target_end_punct = ends_with_terminal(target_text);
    let punct_score = if source_end_punct == target_end_punct { 1.0 } else { 0.5 };

    // 3. Clause-marker parity, approximated by commas and semicolons.
    let source_commas = count_clause_markers(source_text);
    let target_commas = count_clause_markers(target_text);
    let comma_diff = source_commas.abs_diff(target_commas);
    let comma_score = match comma_diff {
        0 => 1.0,
        1 => 0.8,
        _ => 0.6,
    };

    // 4. Numbers must survive translation verbatim, in order.
    let number_re = Regex::new(r"\d+").unwrap();
    let source_numbers: Vec<&str> = number_re.find_iter(source_text).map(|m| m.as_str()).collect();
    let target_numbers: Vec<&str> = number_re.find_iter(target_text).map(|m| m.as_str()).collect();

    let mut numbers_score = 1.0;
    if (!source_numbers.is_empty() || !target_numbers.is_empty())
        && source_numbers != target_numbers
    {
        numbers_score = 0.0;
    }

    // 5. Named entities, approximated by capitalized-word counts. The target
    // class admits Czech diacritic letters.
    let source_capital_re = Regex::new(r"\b[A-Z][a-z]+\b").unwrap();
    let target_capital_re =
        Regex::new(r"\b[A-Z][a-zščřžýáíéěóúůďťňŠČŘŽÝÁÍÉĚÓÚŮĎŤŇ]+\b").unwrap();
    let source_capitals = source_capital_re.find_iter(source_text).count();
    let target_capitals = target_capital_re.find_iter(target_text).count();

    let capitals_diff = source_capitals.abs_diff(target_capitals);
    let capitals_score = if capitals_diff <= 1 {
        1.0
    } else if capitals_diff <= 2 {
        0.7
    } else {
        0.4
    };

    // 6. Extreme word-count ratios are suspicious regardless of characters.
    let word_re = Regex::new(r"\b\w+\b").unwrap();
    let source_words = word_re.find_iter(source_text).count();
    let target_words = word_re.find_iter(target_text).count();

    let word_ratio = if source_words > 0 {
        target_words as f64 / source_words as f64
    } else {
        0.0
    };
    let word_ratio_score = if word_ratio < 0.5 || word_ratio > 2.0 { 0.2 } else { 1.0 };

    let total_score = WEIGHT_LENGTH_RATIO * ratio_score
        + WEIGHT_END_PUNCT * punct_score
        + WEIGHT_COMMAS * comma_score
        + WEIGHT_NUMBERS * numbers_score
        + WEIGHT_CAPITALS * capitals_score
        + WEIGHT_WORD_RATIO * word_ratio_score;

    // Reasons are appended in fixed signal order.
    let mut explanation = Vec::new();
    if ratio_score < 0.7 {
        explanation.push(format!("Unusual length ratio ({:.2})", length_ratio));
    }
    if punct_score < 1.0 {
        explanation.push("Ending punctuation mismatch".to_string());
    }
    if comma_score < 0.8 {
        explanation.push("Different sentence structure (commas)".to_string());
    }
    if numbers_score < 1.0 {
        explanation.push("Numbers don't match".to_string());
    }
    if capitals_score < 0.7 {
        explanation.push("Capitalized words don't match".to_string());
    }
    if word_ratio_score < 0.5 {
        explanation.push(format!("Suspicious word count ratio ({:.2})", word_ratio));
    }

    if explanation.is_empty() {
        explanation.push("Sentences appear well-aligned".to_string());
    }

    AlignmentVerdict {
        alignment_score: total_score,
        confidence: HEURISTIC_CONFIDENCE,
        explanation,
        is_aligned: total_score >= ALIGNED_THRESHOLD,
    }
}

fn ends_with_terminal(text: &str) -> bool {
    text.chars().next_back().map_or(false, |c| matches!(c, '.' | '!' | '?'))
}

fn count_clause_markers(text: &str) -> usize {
    text.chars().filter(|c| matches!(c, ',' | ';')).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_pair_is_aligned() {
        // Identical strings, no digits, no capitals: every parity signal is
        // trivially satisfied and ratio 1.0 sits inside the en-cs band.
        let text = "the quick brown fox jumps over the lazy dog.";
        let verdict = check_alignment(text, text, "en", "cs");
        assert!(verdict.alignment_score >= 0.7, "score {}", verdict.alignment_score);
        assert!(verdict.is_aligned);
        assert_eq!(verdict.explanation, vec!["Sentences appear well-aligned"]);
        assert!((verdict.confidence - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_faithful_translation_scores_high() {
        let verdict = check_alignment(
            "The meeting on April 15, 2023 was very productive and we discussed version 2.0.4.",
            "Schůzka dne 15. dubna 2023 byla velmi produktivní a diskutovali jsme o verzi 2.0.4.",
            "en",
            "cs",
        );
        assert!(verdict.is_aligned, "explanation: {:?}", verdict.explanation);
    }

    #[test]
    fn test_numeral_mismatch_dominates() {
        let verdict = check_alignment("Cost: 100 units.", "Cost: 200 units.", "en", "cs");
        assert_eq!(
            verdict
                .explanation
                .iter()
                .filter(|r| r.as_str() == "Numbers don't match")
                .count(),
            1
        );
        assert!(verdict.alignment_score <= 0.70, "score {}", verdict.alignment_score);
        assert!(!verdict.is_aligned);
    }

    #[test]
    fn test_number_order_matters() {
        // Same digit runs in a different order are still a mismatch.
        let verdict = check_alignment(
            "Rooms 12 and 47 are open today.",
            "Rooms 47 and 12 are open today.",
            "en",
            "cs",
        );
        assert!(verdict.explanation.iter().any(|r| r == "Numbers don't match"));
    }

    #[test]
    fn test_both_sides_without_numbers_pass_numeral_check() {
        let verdict = check_alignment(
            "no digits appear in this sentence at all.",
            "ani zde se neobjevuje žádná číslice.",
            "en",
            "cs",
        );
        assert!(!verdict.explanation.iter().any(|r| r == "Numbers don't match"));
    }

    #[test]
    fn test_ending_punctuation_mismatch_reason() {
        let verdict = check_alignment(
            "they all arrived early today.",
            "všichni dnes dorazili brzy",
            "en",
            "cs",
        );
        assert!(verdict.explanation.iter().any(|r| r == "Ending punctuation mismatch"));
    }

    #[test]
    fn test_unrelated_sentences_score_low() {
        // Different capitals, different numbers, different structure.
        let verdict = check_alignment(
            "The GDP of Germany increased by 2.3% in 2019.",
            "Populace Německa je přibližně 83 milionů obyvatel.",
            "en",
            "cs",
        );
        assert!(!verdict.is_aligned, "score {}", verdict.alignment_score);
    }

    #[test]
    fn test_word_ratio_sanity_is_binary() {
        let verdict = check_alignment(
            "one two three four five six seven eight nine ten.",
            "krátké.",
            "en",
            "cs",
        );
        assert!(verdict
            .explanation
            .iter()
            .any(|r| r.starts_with("Suspicious word count ratio")));
    }

    #[test]
    fn test_generic_band_for_unknown_language_pair() {
        // Ratio 0.7 falls outside the en-cs band but inside the generic one.
        let source = "a".repeat(100) + ".";
        let target = "b".repeat(69) + ".";
        let en_cs = check_alignment(&source, &target, "en", "cs");
        let generic = check_alignment(&source, &target, "en", "de");
        assert!(generic.alignment_score > en_cs.alignment_score);
    }

    #[test]
    fn test_score_is_deterministic() {
        let a = check_alignment("Some text here, ok.", "Nějaký text zde, ok.", "en", "cs");
        let b = check_alignment("Some text here, ok.", "Nějaký text zde, ok.", "en", "cs");
        assert_eq!(a.alignment_score, b.alignment_score);
        assert_eq!(a.explanation, b.explanation);
    }
}
