// Data Models
// Core entities produced by the sentence corpus pipeline

use serde::{Deserialize, Serialize};

/// One record of the input table: a paragraph-level source/target string pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRecord {
    pub source: String,
    pub target: String,
}

/// One sentence-level pair drawn from a single input row.
///
/// `alignment_score` and `issues` start unset and are populated exactly once
/// if and only if the pair is selected for sampled checking. On the wire
/// (spreadsheet writer collaborator) an unchecked score is the sentinel -1;
/// in-core it stays `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentencePair {
    pub source: String,
    pub target: String,
    /// 1-based index of the input row this pair came from.
    pub origin_row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment_score: Option<f64>,
    #[serde(default)]
    pub issues: String,
}

/// Scorer output for one sentence pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentVerdict {
    /// Weighted alignment confidence in [0, 1].
    pub alignment_score: f64,
    /// Trust in the score itself; the heuristic scorer always reports 0.6.
    pub confidence: f64,
    /// Human-readable reasons, in fixed signal order.
    pub explanation: Vec<String>,
    pub is_aligned: bool,
}

impl AlignmentVerdict {
    pub fn issues_text(&self) -> String {
        if self.is_aligned {
            String::new()
        } else {
            self.explanation.join("; ")
        }
    }
}

/// Per-pair verdict plus the metadata needed to write it back into the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairCheckDetail {
    /// Index into the assembled pair list, not the input row.
    pub index: usize,
    pub source: String,
    pub target: String,
    #[serde(flatten)]
    pub verdict: AlignmentVerdict,
    /// True when the scorer itself failed; the verdict then carries zero
    /// score/confidence and the failure reason as its explanation.
    #[serde(default)]
    pub scoring_failed: bool,
}

/// Aggregate outcome of a sampled batch check.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Mean alignment score over successfully scored pairs, 0 if none.
    pub overall_score: f64,
    pub aligned_percentage: f64,
    /// Attempted (non-skipped) sampled pairs, scoring failures included.
    pub checked_count: usize,
    pub aligned_count: usize,
    /// Sampled pairs whose scorer failed; excluded from `overall_score`.
    pub failed_count: usize,
    pub details: Vec<PairCheckDetail>,
}

/// Alignment slice of the corpus statistics, present only when checking ran.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentStats {
    pub checked_count: usize,
    pub failed_count: usize,
    pub mean_score: f64,
    pub aligned_percentage: f64,
    pub poorly_aligned_count: usize,
}

/// Corpus-level counters accumulated over one pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CorpusStatistics {
    pub total_rows: usize,
    pub processed_rows: usize,
    pub skipped_rows: usize,
    pub total_pairs: usize,
    /// Rows whose source/target sentence counts differed but were reconciled.
    pub mismatched_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<AlignmentStats>,
}

/// Options for one `build_sentence_corpus` invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    pub source_lang: String,
    pub target_lang: String,
    #[serde(default = "default_true")]
    pub check_alignment: bool,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            source_lang: "en".to_string(),
            target_lang: "cs".to_string(),
            check_alignment: true,
            sample_size: 50,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sample_size() -> usize {
    50
}
