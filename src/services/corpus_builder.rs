// Corpus Builder
// Drives segmentation and per-row reconciliation over every input row, then
// sampled alignment checking over the assembled pair list.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{
    AlignmentStats, BuildOptions, CorpusStatistics, RowRecord, SentencePair,
};
use crate::services::alignment::{check_batch, AlignmentChecker};
use crate::services::row_aligner::{reconcile, RowOutcome};
use crate::services::sentence_segmenter::{Segmenter, SegmenterConfig};

/// Pipeline-setup failures. These are the only errors that abort the whole
/// run; everything at row or pair granularity is contained and counted.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("input table contains no rows")]
    EmptyTable,
    #[error("required column not found: {0}")]
    MissingColumn(String),
}

/// One pipeline instance: a segmenter for the language pair plus the scorer
/// backend. All entities it produces are fresh per `build` call.
pub struct CorpusBuilder {
    segmenter: Segmenter,
    checker: AlignmentChecker,
    options: BuildOptions,
}

impl CorpusBuilder {
    pub fn new(options: BuildOptions, checker: AlignmentChecker) -> Self {
        Self::with_segmenter_config(options, &SegmenterConfig::default(), checker)
    }

    pub fn with_segmenter_config(
        options: BuildOptions,
        config: &SegmenterConfig,
        checker: AlignmentChecker,
    ) -> Self {
        let segmenter = Segmenter::for_pair(config, &options.source_lang, &options.target_lang);
        Self {
            segmenter,
            checker,
            options,
        }
    }

    /// Process every row into sentence pairs, then (optionally) run the
    /// sampled alignment check over the full assembled list. Sampling must
    /// happen once, after assembly, so the draw covers the whole corpus.
    pub async fn build(&self, rows: &[RowRecord]) -> (Vec<SentencePair>, CorpusStatistics) {
        let mut stats = CorpusStatistics {
            total_rows: rows.len(),
            ..Default::default()
        };
        let mut pairs: Vec<SentencePair> = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            // Input rows are 1-indexed for traceability, matching how users
            // see them in their spreadsheet tool.
            let row_number = index + 1;

            let source_text = row.source.trim();
            let target_text = row.target.trim();
            if source_text.is_empty() || target_text.is_empty() {
                debug!("[corpus] skipping empty row {}", row_number);
                stats.skipped_rows += 1;
                continue;
            }

            let source_spans = self.segmenter.segment(source_text);
            let target_spans = self.segmenter.segment(target_text);
            if source_spans.len() != target_spans.len() {
                warn!(
                    "[corpus] sentence count mismatch at row {}: source {}, target {}",
                    row_number,
                    source_spans.len(),
                    target_spans.len()
                );
                stats.mismatched_rows += 1;
            }

            match reconcile(source_spans, target_spans) {
                RowOutcome::Reconciled { source, target, .. } => {
                    for (source_sent, target_sent) in source.into_iter().zip(target) {
                        pairs.push(SentencePair {
                            source: source_sent,
                            target: target_sent,
                            origin_row: row_number,
                            alignment_score: None,
                            issues: String::new(),
                        });
                        stats.total_pairs += 1;
                    }
                    stats.processed_rows += 1;
                }
                RowOutcome::Skip(reason) => {
                    warn!("[corpus] skipping row {}: {}", row_number, reason);
                    stats.skipped_rows += 1;
                }
            }
        }

        if self.options.check_alignment && !pairs.is_empty() {
            info!(
                "[corpus] checking translation alignment for {} sentence pairs",
                pairs.len()
            );
            let report = check_batch(
                &pairs,
                &self.options.source_lang,
                &self.options.target_lang,
                self.options.sample_size,
                &self.checker,
            )
            .await;

            // Write each checked pair's verdict back exactly once; unchecked
            // pairs keep their unset score.
            for detail in &report.details {
                let pair = &mut pairs[detail.index];
                pair.alignment_score = Some(detail.verdict.alignment_score);
                pair.issues = detail.verdict.issues_text();
            }

            let poorly_aligned_count = report
                .details
                .iter()
                .filter(|d| !d.verdict.is_aligned)
                .count();
            stats.alignment = Some(AlignmentStats {
                checked_count: report.checked_count,
                failed_count: report.failed_count,
                mean_score: report.overall_score,
                aligned_percentage: report.aligned_percentage,
                poorly_aligned_count,
            });
        }

        info!(
            "[corpus] built {} sentence pairs from {} rows ({} processed, {} skipped)",
            stats.total_pairs, stats.total_rows, stats.processed_rows, stats.skipped_rows
        );

        (pairs, stats)
    }
}

/// The external entry point for the I/O layer: one call per input table,
/// default segmenter stems.
pub async fn build_sentence_corpus(
    rows: &[RowRecord],
    options: &BuildOptions,
    checker: AlignmentChecker,
) -> (Vec<SentencePair>, CorpusStatistics) {
    CorpusBuilder::new(options.clone(), checker).build(rows).await
}
