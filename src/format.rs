// 🔎 Format Detection - classify a loaded table into a known export variant
//
// Dispatched once at load time; downstream code never sniffs formats again.

use crate::error::TableError;
use crate::table::RawTable;
use serde::{Deserialize, Serialize};

/// Type names a foreign dataframe runtime writes as a spurious first row.
pub const TYPE_TAGS: &[&str] = &[
    "Any", "String", "Float64", "Int64", "Float32", "Int32", "Bool", "Missing",
];

/// A single cell at or below this many characters is not treated as a blob.
pub const MIN_BLOB_LEN: usize = 8;

/// Known prediction-export variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableFormat {
    /// Two or more columns, first row is data.
    Standard,
    /// Two or more columns, first row is a type-annotation row to discard.
    TypeAnnotated,
    /// One row, one column: the whole table rendered into a single string.
    EncodedBlob,
}

impl TableFormat {
    pub fn name(&self) -> &str {
        match self {
            TableFormat::Standard => "standard",
            TableFormat::TypeAnnotated => "type-annotated",
            TableFormat::EncodedBlob => "encoded blob",
        }
    }
}

/// Classify a raw table.
///
/// Order matters: the blob shape is checked before the column-count floor,
/// since a blob has exactly one column.
pub fn detect_format(table: &RawTable) -> Result<TableFormat, TableError> {
    let rows = table.row_count();
    let columns = table.column_count();

    let unsupported = |reason: &str| TableError::UnsupportedTableShape {
        rows,
        columns,
        reason: reason.to_string(),
    };

    if columns == 0 {
        return Err(unsupported("no columns"));
    }

    if rows == 1 && columns == 1 {
        let blob_len = table
            .cell(0, 0)
            .map(|c| c.render().trim().chars().count())
            .unwrap_or(0);

        return if blob_len > MIN_BLOB_LEN {
            Ok(TableFormat::EncodedBlob)
        } else {
            Err(unsupported("single cell too short to be an encoded blob"))
        };
    }

    if columns < 2 {
        return Err(unsupported("single column that is not an encoded blob"));
    }

    if is_type_annotation_row(table) {
        return Ok(TableFormat::TypeAnnotated);
    }

    Ok(TableFormat::Standard)
}

fn is_type_annotation_row(table: &RawTable) -> bool {
    table
        .cell(0, 0)
        .map(|c| TYPE_TAGS.contains(&c.render().trim()))
        .unwrap_or(false)
}
