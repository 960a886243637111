// Alignment Module
// Translation alignment scoring organized into specialized submodules:
// - heuristic: multi-signal surface scorer, pure and deterministic
// - llm_checker: model-backed scorer sharing the same output contract
// - batch: random sampling over the assembled pair list plus aggregation

pub mod batch;
pub mod heuristic;
pub mod llm_checker;

pub use batch::check_batch;
pub use heuristic::check_alignment;
pub use llm_checker::LlmChecker;

use crate::models::AlignmentVerdict;
use crate::services::providers::ProviderError;

/// Pairs scoring at or above this are considered reasonably aligned.
pub const ALIGNED_THRESHOLD: f64 = 0.7;

/// Scorer capability: the heuristic and the model-backed judge implement the
/// same contract and are interchangeable at every call site.
pub enum AlignmentChecker {
    Heuristic,
    Model(LlmChecker),
}

impl AlignmentChecker {
    /// Score one sentence pair. The heuristic variant cannot fail; the
    /// model-backed variant surfaces transport/parse failures to the batch
    /// layer, which records them without aborting.
    pub async fn score(
        &self,
        source_text: &str,
        target_text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<AlignmentVerdict, ProviderError> {
        match self {
            AlignmentChecker::Heuristic => Ok(heuristic::check_alignment(
                source_text,
                target_text,
                source_lang,
                target_lang,
            )),
            AlignmentChecker::Model(checker) => {
                checker.check(source_text, target_text, source_lang, target_lang).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_heuristic_variant_never_fails() {
        let checker = AlignmentChecker::Heuristic;
        let verdict = checker.score("A plain sentence.", "Prostá věta.", "en", "cs").await;
        assert!(verdict.is_ok());
    }
}
