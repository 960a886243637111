// Row Aligner
// Reconciles the per-column sentence counts of one input row into a
// best-effort list of pairable spans, or signals that the row must be skipped.

use serde::Serialize;
use std::fmt;

/// Maximum source/target sentence-count difference that is still reconciled
/// by truncation instead of skipping the row.
pub const MAX_COUNT_DRIFT: usize = 2;

/// Why a row contributed no sentence pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    EmptyRow,
    CountMismatch { source: usize, target: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyRow => write!(f, "empty source or target cell"),
            SkipReason::CountMismatch { source, target } => write!(
                f,
                "irreconcilable sentence count mismatch (source: {}, target: {})",
                source, target
            ),
        }
    }
}

/// Outcome of reconciling one row's segmented columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Reconciled {
        source: Vec<String>,
        target: Vec<String>,
        /// True when the counts differed and trailing spans were dropped.
        mismatched: bool,
    },
    Skip(SkipReason),
}

/// Reconcile two segmented columns.
///
/// Equal counts pass through untouched. Counts within `MAX_COUNT_DRIFT` of
/// each other are truncated to the shorter length, keeping leading spans only.
/// This assumes excess sentences trail rather than interleave; it is a crude
/// approximation, kept deliberately because changing it would shift every
/// downstream statistic.
pub fn reconcile(mut source: Vec<String>, mut target: Vec<String>) -> RowOutcome {
    if source.len() == target.len() {
        return RowOutcome::Reconciled {
            source,
            target,
            mismatched: false,
        };
    }

    let drift = source.len().abs_diff(target.len());
    if drift > MAX_COUNT_DRIFT {
        return RowOutcome::Skip(SkipReason::CountMismatch {
            source: source.len(),
            target: target.len(),
        });
    }

    let keep = source.len().min(target.len());
    source.truncate(keep);
    target.truncate(keep);
    RowOutcome::Reconciled {
        source,
        target,
        mismatched: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_equal_counts_are_identity() {
        let source = spans(&["A.", "B."]);
        let target = spans(&["X.", "Y."]);
        match reconcile(source.clone(), target.clone()) {
            RowOutcome::Reconciled {
                source: s,
                target: t,
                mismatched,
            } => {
                assert_eq!(s, source);
                assert_eq!(t, target);
                assert!(!mismatched);
            }
            RowOutcome::Skip(reason) => panic!("unexpected skip: {}", reason),
        }
    }

    #[test]
    fn test_small_drift_truncates_to_shorter() {
        let source = spans(&["A.", "B.", "C.", "D."]);
        let target = spans(&["X.", "Y."]);
        match reconcile(source, target) {
            RowOutcome::Reconciled {
                source: s,
                target: t,
                mismatched,
            } => {
                assert_eq!(s, spans(&["A.", "B."]));
                assert_eq!(t, spans(&["X.", "Y."]));
                assert!(mismatched);
            }
            RowOutcome::Skip(reason) => panic!("unexpected skip: {}", reason),
        }
    }

    #[test]
    fn test_drift_of_one_keeps_leading_spans() {
        let source = spans(&["A.", "B.", "C."]);
        let target = spans(&["X.", "Y.", "Z.", "W."]);
        match reconcile(source, target) {
            RowOutcome::Reconciled { source: s, target: t, .. } => {
                assert_eq!(s.len(), 3);
                assert_eq!(t, spans(&["X.", "Y.", "Z."]));
            }
            RowOutcome::Skip(reason) => panic!("unexpected skip: {}", reason),
        }
    }

    #[test]
    fn test_large_drift_skips_row() {
        let source = spans(&["A.", "B.", "C.", "D.", "E."]);
        let target = spans(&["X.", "Y."]);
        assert_eq!(
            reconcile(source, target),
            RowOutcome::Skip(SkipReason::CountMismatch { source: 5, target: 2 })
        );
    }

    #[test]
    fn test_empty_columns_of_equal_length_pass_through() {
        match reconcile(vec![], vec![]) {
            RowOutcome::Reconciled { source, target, mismatched } => {
                assert!(source.is_empty());
                assert!(target.is_empty());
                assert!(!mismatched);
            }
            RowOutcome::Skip(reason) => panic!("unexpected skip: {}", reason),
        }
    }
}
