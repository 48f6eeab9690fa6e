// Draft Recon - Core Library
// Reconciles per-team draft predictions against actual draft results

pub mod error;
pub mod values;         // Coercion, display formatting, score regime
pub mod teams;          // Team registry + aliases
pub mod table;          // Raw CSV tables
pub mod format;         // Export variant detection
pub mod blob;           // Single-cell rendered tables
pub mod normalize;      // Canonical prediction records
pub mod parser;         // Per-variant parsers
pub mod ground_truth;   // Actual draft results
pub mod matcher;        // Name matching
pub mod locator;        // Identifier → file path
pub mod config;
pub mod reconciliation;

// Re-export commonly used types
pub use error::{ReconcileError, TableError};
pub use values::{
    coerce_numeric, coerce_str, format_fixed_precision, format_scaled_currency,
    Aggregate, ScoreRegime, NOT_AVAILABLE, UNAVAILABLE,
};
pub use teams::{AliasKind, AliasScope, DataSource, EntityGroup, GroupAlias, TeamRegistry};
pub use table::{CellValue, RawTable};
pub use format::{detect_format, TableFormat};
pub use blob::parse_blob;
pub use normalize::{PredictionRecord, SchemaNormalizer};
pub use parser::{get_parser, load_predictions, parse_table, ExportParser, PredictionSet};
pub use ground_truth::{ActualOutcomeRecord, GroundTruth};
pub use matcher::{EntityMatcher, FuzzyPolicy, MatchKind, MatchResult};
pub use locator::{ArtifactLocator, DirectoryLocator};
pub use config::AppConfig;
pub use reconciliation::{Reconciliation, ReconciliationEngine, RoundPick, RoundSlot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
