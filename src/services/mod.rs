// Services module
// Business logic for corpus building: segmentation, row reconciliation,
// alignment scoring, provider access, and persistent configuration.

pub mod alignment;
pub mod config_store;
pub mod corpus_builder;
pub mod providers;
pub mod row_aligner;
pub mod sentence_segmenter;

pub use alignment::{check_alignment, check_batch, AlignmentChecker, LlmChecker};
pub use config_store::ConfigStore;
pub use corpus_builder::{build_sentence_corpus, CorpusBuilder, CorpusError};
pub use row_aligner::{reconcile, RowOutcome, SkipReason};
pub use sentence_segmenter::{Segmenter, SegmenterConfig};
