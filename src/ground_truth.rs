// 🎯 Ground Truth - observed outcomes, each pinned to one resolved group
//
// Loaded once at startup and never mutated; reconciliation only reads it.

use crate::error::TableError;
use crate::table::{CellValue, RawTable};
use crate::teams::TeamRegistry;
use crate::values::{coerce_flag, coerce_numeric};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;
use tracing::{debug, info, warn};

// Accepted header spellings, first match wins
const NAME_HEADERS: &[&str] = &["Name", "Player"];
const GROUP_HEADERS: &[&str] = &["Team", "Team_Abbrev", "Club"];
const MAJOR_HEADERS: &[&str] = &["Round"];
const MINOR_HEADERS: &[&str] = &["Pick", "Overall"];
const AMOUNT_HEADERS: &[&str] = &["Bonus", "Signing_Bonus"];
const CATEGORY_HEADERS: &[&str] = &["Position", "Pos"];
const CONFIRMED_HEADERS: &[&str] = &["Signed"];
const SCHOOL_HEADERS: &[&str] = &["School"];

// ============================================================================
// OUTCOME RECORD
// ============================================================================

/// One observed result (a drafted player).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualOutcomeRecord {
    /// Position in the source file; drives deterministic iteration order.
    pub row_index: usize,

    pub entity_name: String,

    /// Canonical code, resolved through the registry.
    pub group_code: String,

    /// Group label exactly as it appeared in the file.
    pub group_label: String,

    /// Round label; may be non-numeric ("CB1", "PPI").
    pub sequence_major: String,

    /// Overall pick number; always the ordering key.
    pub sequence_minor: Option<f64>,

    pub amount: Option<f64>,

    /// Position.
    pub category: String,

    pub confirmed: bool,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
}

impl ActualOutcomeRecord {
    /// Pick number for display ("12", or "?" when not numeric).
    pub fn pick_label(&self) -> String {
        match self.sequence_minor {
            Some(p) if p.fract() == 0.0 => format!("{}", p as i64),
            Some(p) => p.to_string(),
            None => "?".to_string(),
        }
    }

    /// Order by pick, unknown picks last, ties by file order.
    pub fn cmp_by_sequence(&self, other: &Self) -> Ordering {
        match (self.sequence_minor, other.sequence_minor) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then(self.row_index.cmp(&other.row_index))
    }
}

// ============================================================================
// GROUND TRUTH SNAPSHOT
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroundTruth {
    records: Vec<ActualOutcomeRecord>,

    /// Rows whose group label could not be resolved.
    unresolved: usize,
}

struct Columns {
    name: usize,
    group: usize,
    major: usize,
    minor: usize,
    amount: Option<usize>,
    category: Option<usize>,
    confirmed: Option<usize>,
    school: Option<usize>,
}

impl Columns {
    fn locate(table: &RawTable) -> Result<Self, TableError> {
        let find = |names: &[&str]| names.iter().find_map(|n| table.column_index(n));
        let require = |names: &[&str]| {
            find(names).ok_or_else(|| TableError::MissingColumn(names[0].to_string()))
        };

        Ok(Columns {
            name: require(NAME_HEADERS)?,
            group: require(GROUP_HEADERS)?,
            major: require(MAJOR_HEADERS)?,
            minor: require(MINOR_HEADERS)?,
            amount: find(AMOUNT_HEADERS),
            category: find(CATEGORY_HEADERS),
            confirmed: find(CONFIRMED_HEADERS),
            school: find(SCHOOL_HEADERS),
        })
    }
}

impl GroundTruth {
    pub fn new(records: Vec<ActualOutcomeRecord>) -> Self {
        GroundTruth {
            records,
            unresolved: 0,
        }
    }

    /// Build the snapshot, resolving every row's group label.
    ///
    /// Rows with an empty name are dropped; rows whose group cannot be
    /// resolved are excluded from every group and counted.
    pub fn from_table(table: &RawTable, registry: &TeamRegistry) -> Result<Self, TableError> {
        let cols = Columns::locate(table)?;
        let mut records = Vec::with_capacity(table.row_count());
        let mut unresolved = 0;

        for (row_index, row) in table.rows.iter().enumerate() {
            let cell = |idx: usize| row.get(idx).cloned().unwrap_or(CellValue::Empty);
            let text = |idx: Option<usize>| idx.map(|i| cell(i).render().trim().to_string());

            let entity_name = cell(cols.name).render().trim().to_string();
            if entity_name.is_empty() {
                debug!(row = row_index, "ground truth row without a name dropped");
                continue;
            }

            let group_label = cell(cols.group).render().trim().to_string();
            let group_code = match registry.resolve_ground_truth_label(&group_label) {
                Some(code) => code.to_string(),
                None => {
                    warn!(row = row_index, label = %group_label, "unresolved group label, row excluded");
                    unresolved += 1;
                    continue;
                }
            };

            records.push(ActualOutcomeRecord {
                row_index,
                entity_name,
                group_code,
                group_label,
                sequence_major: cell(cols.major).render().trim().to_string(),
                sequence_minor: coerce_numeric(&cell(cols.minor)),
                amount: cols.amount.and_then(|i| coerce_numeric(&cell(i))),
                category: text(cols.category).unwrap_or_default(),
                confirmed: cols.confirmed.map(|i| coerce_flag(&cell(i))).unwrap_or(false),
                school: text(cols.school).filter(|s| !s.is_empty()),
            });
        }

        info!(records = records.len(), unresolved, "ground truth loaded");
        Ok(GroundTruth {
            records,
            unresolved,
        })
    }

    pub fn from_path(path: &Path, registry: &TeamRegistry) -> Result<Self, TableError> {
        let table = RawTable::from_path(path)?;
        Self::from_table(&table, registry)
    }

    /// All records in file order.
    pub fn records(&self) -> &[ActualOutcomeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn unresolved(&self) -> usize {
        self.unresolved
    }

    /// Records of one canonical group, in file order.
    pub fn for_group(&self, code: &str) -> Vec<ActualOutcomeRecord> {
        self.records
            .iter()
            .filter(|r| r.group_code == code)
            .cloned()
            .collect()
    }
}
