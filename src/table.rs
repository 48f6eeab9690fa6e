// 📄 Raw tables - direct parse of an input source before classification
//
// Owned transiently during loading; discarded once normalized.

use crate::error::TableError;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

// ============================================================================
// CELL VALUE
// ============================================================================

/// One raw cell, typed just enough to tell numbers from text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Classify a raw CSV field.
    ///
    /// "NaN"/"inf" parse as floats in Rust but stay text here, so that
    /// coercion can treat them as sentinels rather than numbers.
    pub fn from_field(field: &str) -> Self {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(field.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// String form of the cell ("" for empty).
    pub fn render(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(field: &str) -> Self {
        CellValue::from_field(field)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

// ============================================================================
// RAW TABLE
// ============================================================================

/// Header row plus data rows, exactly as read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        RawTable { headers, rows }
    }

    /// Build a table from string literals (handy for fixtures).
    pub fn from_strings(headers: &[&str], rows: &[&[&str]]) -> Self {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|f| CellValue::from_field(f)).collect())
                .collect(),
        }
    }

    /// Read a CSV stream whose first record is the header row.
    ///
    /// Rows are allowed to be ragged; exports are not guaranteed to be
    /// rectangular.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(CellValue::from_field).collect());
        }

        Ok(RawTable { headers, rows })
    }

    pub fn from_csv_str(data: &str) -> Result<Self, TableError> {
        Self::from_reader(data.as_bytes())
    }

    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest of the header row and every data row.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.len())
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Same table without its first data row.
    pub fn without_first_row(mut self) -> Self {
        if !self.rows.is_empty() {
            self.rows.remove(0);
        }
        self
    }
}
