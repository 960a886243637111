// bitext-align
// Builds sentence-aligned bilingual corpora from two-column text tables and
// scores translation alignment on a sampled subset of the resulting pairs.

pub mod models;
pub mod services;

pub use models::{
    AlignmentStats, AlignmentVerdict, BatchReport, BuildOptions, CorpusStatistics,
    PairCheckDetail, RowRecord, SentencePair,
};
pub use services::{
    build_sentence_corpus, check_alignment, check_batch, AlignmentChecker, ConfigStore,
    CorpusBuilder, CorpusError, LlmChecker, Segmenter, SegmenterConfig,
};
