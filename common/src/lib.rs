//! Enumcron Common Library
//!
//! 巻号ラベル（enumcron）の正規化・スパン抽出・照合エンジン。
//! CLI から使うが、入出力には依存しない。

pub mod span;
pub mod vocabulary;
pub mod normalizer;
pub mod date;
pub mod extractor;
pub mod record;
pub mod matcher;
pub mod report;
pub mod error;

pub use span::{Category, DateSpan, Span};
pub use vocabulary::Vocabulary;
pub use normalizer::Normalizer;
pub use date::{DateMatch, DateSpanParser};
pub use extractor::{ExtractorOptions, SpanExtractor};
pub use record::{dedupe_raw, LabelRecord, LabelSet, SpanValue};
pub use matcher::{
    match_labels, match_labels_by_name, strategy_by_name, strategy_names, ExactMatch,
    MatchStrategy, SpanCoverage, STRATEGIES,
};
pub use report::{MatchPairing, MatchReport};
pub use error::{Error, Result};
