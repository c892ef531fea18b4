pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod matcher;
pub mod report;
pub mod timestamp;

// Re-export key types for convenience
pub use cli::Args;
pub use config::{ExtractConfig, TimeWindow};
pub use error::ExtractError;
pub use extractor::{ExtractionResult, LineVerdict, LogExtractor, MatchCounters, MatchRecord};
pub use matcher::MatchMode;
pub use report::{print_summary, write_report_file};
