// 🏗️ Parser Framework
// One parser per export variant, chosen once by format detection

use crate::blob::parse_blob;
use crate::error::TableError;
use crate::format::{detect_format, TableFormat};
use crate::normalize::{PredictionRecord, SchemaNormalizer};
use crate::table::RawTable;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Normalized predictions plus the variant they were read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSet {
    pub format: TableFormat,
    pub records: Vec<PredictionRecord>,
}

impl PredictionSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.entity_name.as_str())
    }
}

// ============================================================================
// PARSER TRAIT
// ============================================================================

/// ExportParser - turns a classified raw table into prediction records.
///
/// Adding a variant means adding a `TableFormat` case and an implementor;
/// existing parsers are untouched.
pub trait ExportParser: Send + Sync {
    fn parse(&self, table: RawTable) -> Result<Vec<PredictionRecord>, TableError>;

    /// The variant this parser handles
    fn format(&self) -> TableFormat;
}

/// Get the parser for a detected variant
pub fn get_parser(format: TableFormat) -> Box<dyn ExportParser> {
    match format {
        TableFormat::Standard => Box::new(StandardParser),
        TableFormat::TypeAnnotated => Box::new(TypeAnnotatedParser),
        TableFormat::EncodedBlob => Box::new(EncodedBlobParser),
    }
}

/// Detect, dispatch, normalize.
pub fn parse_table(table: RawTable) -> Result<PredictionSet, TableError> {
    let format = detect_format(&table)?;
    debug!(format = format.name(), rows = table.row_count(), "prediction table classified");

    let records = get_parser(format).parse(table)?;
    Ok(PredictionSet { format, records })
}

/// Read and normalize a prediction export from disk.
pub fn load_predictions(path: &Path) -> Result<PredictionSet, TableError> {
    let table = RawTable::from_path(path)?;
    parse_table(table)
}

// ============================================================================
// PARSERS
// ============================================================================

/// Plain table with a header row.
pub struct StandardParser;

impl ExportParser for StandardParser {
    fn parse(&self, table: RawTable) -> Result<Vec<PredictionRecord>, TableError> {
        SchemaNormalizer::normalize(&table)
    }

    fn format(&self) -> TableFormat {
        TableFormat::Standard
    }
}

/// Table whose first data row names column types ("Any", "Float64", ...).
pub struct TypeAnnotatedParser;

impl ExportParser for TypeAnnotatedParser {
    fn parse(&self, table: RawTable) -> Result<Vec<PredictionRecord>, TableError> {
        debug!("type-annotation row stripped");
        SchemaNormalizer::normalize(&table.without_first_row())
    }

    fn format(&self) -> TableFormat {
        TableFormat::TypeAnnotated
    }
}

/// Single cell holding a rendered table.
pub struct EncodedBlobParser;

impl ExportParser for EncodedBlobParser {
    fn parse(&self, table: RawTable) -> Result<Vec<PredictionRecord>, TableError> {
        let blob = table.cell(0, 0).map(|c| c.render()).unwrap_or_default();
        parse_blob(&blob)
    }

    fn format(&self) -> TableFormat {
        TableFormat::EncodedBlob
    }
}

// ============================================================================
// TESTS
// ============================================================================
