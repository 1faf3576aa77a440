pub mod analytics;
pub mod analyzer;
pub mod board;
pub mod importer;

pub use analytics::AnalyticsReport;
pub use analyzer::{EmailClassification, ReviewAnalysis, ReviewAnalyzer, SuggestedAction};
pub use board::{build_board, BoardCard, BoardColumn};
pub use importer::{EmailImportOutcome, ImportError, ImportSummary, InboundEmail, ReviewImporter};
