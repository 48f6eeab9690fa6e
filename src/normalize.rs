// 📐 Schema Normalizer - tabular exports → canonical prediction records
//
// Source files are not guaranteed to carry correct headers. By export
// convention the first two columns are "name" then "value", so when the
// canonical headers are missing the first two columns are renamed
// positionally. Any further columns ride along untouched.

use crate::error::TableError;
use crate::table::{CellValue, RawTable};
use crate::values::coerce_numeric;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Canonical entity-name column.
pub const NAME_COLUMN: &str = "Name";

/// Canonical score column.
pub const SCORE_COLUMN: &str = "Optimization_Value";

/// Recognised alternate spellings of the score column.
pub const SCORE_SYNONYMS: &[&str] = &["Bonus"];

// ============================================================================
// PREDICTION RECORD
// ============================================================================

/// One modeled entity and its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Trimmed, never empty.
    pub entity_name: String,

    /// Parsed as found; the proportion/magnitude regime is not reinterpreted.
    pub score: Option<f64>,

    /// Columns beyond name and score, keyed by header.
    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, CellValue>,
}

impl PredictionRecord {
    pub fn new(entity_name: &str, score: Option<f64>) -> Self {
        PredictionRecord {
            entity_name: entity_name.trim().to_string(),
            score,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, column: &str, value: CellValue) -> Self {
        self.extra.insert(column.to_string(), value);
        self
    }
}

// ============================================================================
// SCHEMA NORMALIZER
// ============================================================================

pub struct SchemaNormalizer;

impl SchemaNormalizer {
    /// Normalize a tabular export (type-annotation row already removed).
    pub fn normalize(table: &RawTable) -> Result<Vec<PredictionRecord>, TableError> {
        let columns = table.column_count();
        if columns < 2 {
            return Err(TableError::UnsupportedTableShape {
                rows: table.row_count(),
                columns,
                reason: "normalization needs a name and a value column".to_string(),
            });
        }

        let headers = Self::canonical_headers(table, columns);

        let name_idx = position(&headers, NAME_COLUMN).unwrap_or(0);
        let value_idx = position(&headers, SCORE_COLUMN)
            .or_else(|| SCORE_SYNONYMS.iter().find_map(|s| position(&headers, s)))
            .unwrap_or(1);

        let mut records = Vec::with_capacity(table.row_count());
        for (row_idx, row) in table.rows.iter().enumerate() {
            let cell = |idx: usize| row.get(idx).cloned().unwrap_or(CellValue::Empty);

            let name = cell(name_idx).render();
            let name = name.trim();
            if name.is_empty() {
                debug!(row = row_idx, "prediction row without a name dropped");
                continue;
            }

            let mut record = PredictionRecord::new(name, coerce_numeric(&cell(value_idx)));
            for (idx, header) in headers.iter().enumerate() {
                if idx != name_idx && idx != value_idx {
                    record.extra.insert(header.clone(), cell(idx));
                }
            }
            records.push(record);
        }

        Ok(records)
    }

    /// Headers padded to the table width, with the positional fallback
    /// applied when the name column or every value column is absent.
    fn canonical_headers(table: &RawTable, columns: usize) -> Vec<String> {
        let mut headers: Vec<String> = (0..columns)
            .map(|i| {
                table
                    .headers
                    .get(i)
                    .map(|h| h.trim().to_string())
                    .filter(|h| !h.is_empty())
                    .unwrap_or_else(|| format!("column_{}", i + 1))
            })
            .collect();

        let has_name = position(&headers, NAME_COLUMN).is_some();
        let has_value = position(&headers, SCORE_COLUMN).is_some()
            || SCORE_SYNONYMS.iter().any(|s| position(&headers, s).is_some());

        if !has_name || !has_value {
            headers[0] = NAME_COLUMN.to_string();
            headers[1] = SCORE_COLUMN.to_string();
        }

        headers
    }

    /// Render records back into canonical tabular form.
    pub fn to_table(records: &[PredictionRecord]) -> RawTable {
        let extra_columns: Vec<String> = records
            .iter()
            .flat_map(|r| r.extra.keys().cloned())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut headers = vec![NAME_COLUMN.to_string(), SCORE_COLUMN.to_string()];
        headers.extend(extra_columns.iter().cloned());

        let rows = records
            .iter()
            .map(|r| {
                let mut row = vec![
                    CellValue::Text(r.entity_name.clone()),
                    r.score.map(CellValue::Number).unwrap_or(CellValue::Empty),
                ];
                row.extend(
                    extra_columns
                        .iter()
                        .map(|c| r.extra.get(c).cloned().unwrap_or(CellValue::Empty)),
                );
                row
            })
            .collect();

        RawTable::new(headers, rows)
    }
}

fn position(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}
