// Batch Alignment Checking
// Scores a random sample of the assembled pair list and aggregates the
// verdicts into corpus-level statistics.

use rand::seq::index::sample;
use tracing::{debug, warn};

use crate::models::{AlignmentVerdict, BatchReport, PairCheckDetail, SentencePair};

use super::AlignmentChecker;

/// Corpora at or below this size are checked exhaustively, no sampling.
const FULL_CHECK_MAX: usize = 10;

/// Sampled pairs where either side has fewer whitespace tokens than this are
/// skipped silently; short fragments are presumed headers, not sentences.
const MIN_SENTENCE_TOKENS: usize = 3;

/// Check a sampled subset of `pairs` with `checker`.
///
/// Sampling draws distinct indices uniformly without replacement from an
/// unseeded source; runs are deliberately not reproducible. Scoring failures
/// count as attempted (`checked_count`, `failed_count`) but are excluded from
/// the `overall_score` mean.
pub async fn check_batch(
    pairs: &[SentencePair],
    source_lang: &str,
    target_lang: &str,
    sample_size: usize,
    checker: &AlignmentChecker,
) -> BatchReport {
    let indices: Vec<usize> = if pairs.len() <= FULL_CHECK_MAX {
        (0..pairs.len()).collect()
    } else {
        let take = sample_size.min(pairs.len());
        let mut rng = rand::thread_rng();
        sample(&mut rng, pairs.len(), take).into_vec()
    };

    let mut details: Vec<PairCheckDetail> = Vec::new();
    let mut total_score = 0.0;
    let mut scored_count = 0usize;
    let mut aligned_count = 0usize;
    let mut failed_count = 0usize;

    for index in indices {
        let pair = &pairs[index];
        if pair.source.split_whitespace().count() < MIN_SENTENCE_TOKENS
            || pair.target.split_whitespace().count() < MIN_SENTENCE_TOKENS
        {
            debug!("[batch] skipping short fragment pair at index {}", index);
            continue;
        }

        match checker.score(&pair.source, &pair.target, source_lang, target_lang).await {
            Ok(verdict) => {
                total_score += verdict.alignment_score;
                scored_count += 1;
                if verdict.is_aligned {
                    aligned_count += 1;
                }
                details.push(PairCheckDetail {
                    index,
                    source: pair.source.clone(),
                    target: pair.target.clone(),
                    verdict,
                    scoring_failed: false,
                });
            }
            Err(e) => {
                warn!("[batch] scoring failed for pair {}: {}", index, e);
                failed_count += 1;
                details.push(PairCheckDetail {
                    index,
                    source: pair.source.clone(),
                    target: pair.target.clone(),
                    verdict: AlignmentVerdict {
                        alignment_score: 0.0,
                        confidence: 0.0,
                        explanation: vec![format!("Error: {}", e)],
                        is_aligned: false,
                    },
                    scoring_failed: true,
                });
            }
        }
    }

    let checked_count = details.len();
    let overall_score = if scored_count > 0 {
        total_score / scored_count as f64
    } else {
        0.0
    };
    let aligned_percentage = if checked_count > 0 {
        aligned_count as f64 / checked_count as f64 * 100.0
    } else {
        0.0
    };

    BatchReport {
        overall_score,
        aligned_percentage,
        checked_count,
        aligned_count,
        failed_count,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::alignment::llm_checker::{LlmChecker, DEFAULT_JUDGE_MODEL};
    use crate::services::providers::ProviderClient;
    use std::collections::HashSet;

    fn pair(source: &str, target: &str, origin_row: usize) -> SentencePair {
        SentencePair {
            source: source.to_string(),
            target: target.to_string(),
            origin_row,
            alignment_score: None,
            issues: String::new(),
        }
    }

    fn aligned_pairs(count: usize) -> Vec<SentencePair> {
        (0..count)
            .map(|i| {
                pair(
                    &format!("The delegates approved resolution number {} today.", i),
                    &format!("Delegáti dnes schválili rezoluci číslo {}.", i),
                    i + 1,
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_small_corpus_checks_every_pair() {
        let pairs = aligned_pairs(6);
        let report = check_batch(&pairs, "en", "cs", 50, &AlignmentChecker::Heuristic).await;
        assert_eq!(report.checked_count, 6);
        assert_eq!(report.failed_count, 0);
        assert!(report.overall_score > 0.0);
    }

    #[tokio::test]
    async fn test_short_fragments_are_skipped_silently() {
        let mut pairs = aligned_pairs(4);
        pairs.push(pair("Header.", "Hlavička.", 5));
        pairs.push(pair("Intro text.", "Úvod.", 6));
        let report = check_batch(&pairs, "en", "cs", 50, &AlignmentChecker::Heuristic).await;
        // 6 pairs total, 2 below the token floor.
        assert_eq!(report.checked_count, 4);
        assert!(report.details.iter().all(|d| d.index < 4));
    }

    #[tokio::test]
    async fn test_large_corpus_samples_distinct_indices() {
        let pairs = aligned_pairs(200);
        let report = check_batch(&pairs, "en", "cs", 50, &AlignmentChecker::Heuristic).await;
        assert_eq!(report.checked_count, 50);
        let distinct: HashSet<usize> = report.details.iter().map(|d| d.index).collect();
        assert_eq!(distinct.len(), 50);
    }

    #[tokio::test]
    async fn test_sample_size_capped_by_corpus_size() {
        let pairs = aligned_pairs(12);
        let report = check_batch(&pairs, "en", "cs", 50, &AlignmentChecker::Heuristic).await;
        assert_eq!(report.checked_count, 12);
    }

    #[tokio::test]
    async fn test_empty_corpus_reports_zero_without_dividing() {
        let report = check_batch(&[], "en", "cs", 50, &AlignmentChecker::Heuristic).await;
        assert_eq!(report.checked_count, 0);
        assert_eq!(report.overall_score, 0.0);
        assert_eq!(report.aligned_percentage, 0.0);
    }

    #[tokio::test]
    async fn test_scoring_failures_count_as_attempted_but_not_in_mean() {
        // A judge endpoint on an unroutable local port fails every call.
        let checker = AlignmentChecker::Model(LlmChecker::new(
            ProviderClient::with_base_url("http://127.0.0.1:9/v1/chat/completions"),
            DEFAULT_JUDGE_MODEL,
            "test-key",
        ));
        let pairs = aligned_pairs(4);
        let report = check_batch(&pairs, "en", "cs", 50, &checker).await;
        assert_eq!(report.checked_count, 4);
        assert_eq!(report.failed_count, 4);
        assert_eq!(report.aligned_count, 0);
        assert_eq!(report.overall_score, 0.0);
        assert!(report.details.iter().all(|d| d.scoring_failed));
        assert!(report
            .details
            .iter()
            .all(|d| d.verdict.explanation[0].starts_with("Error:")));
    }
}
