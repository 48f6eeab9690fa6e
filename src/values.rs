// 💲 Value Coercion - heterogeneous scalars → numbers, numbers → display strings
//
// `None` is the "unavailable" value throughout. Zero and unavailable render
// the same way but aggregate differently: zero counts, unavailable does not.

use crate::table::CellValue;
use serde::{Deserialize, Serialize};

/// Display sentinel for a missing or zero currency amount.
pub const NOT_AVAILABLE: &str = "NA";

/// Display sentinel for a missing score.
pub const UNAVAILABLE: &str = "N/A";

/// Textual spellings of "no value" seen in exports.
const MISSING_SENTINELS: &[&str] = &["nan", "na", "n/a", "null", "none", "missing", "-"];

// ============================================================================
// COERCION
// ============================================================================

/// Coerce a raw cell into a number. Never fails; returns `None` instead.
pub fn coerce_numeric(raw: &CellValue) -> Option<f64> {
    match raw {
        CellValue::Empty => None,
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Number(_) => None,
        CellValue::Text(s) => coerce_str(s),
    }
}

/// Coerce a string, stripping a currency symbol and thousands separators.
///
/// "$1,250,000" → 1250000.0, "NaN" → None, "" → None, "abc" → None
pub fn coerce_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_lowercase();
    if MISSING_SENTINELS.contains(&lower.as_str()) {
        return None;
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Coerce a confirmation flag ("Y", "Yes", "true", "1").
pub fn coerce_flag(raw: &CellValue) -> bool {
    match raw {
        CellValue::Empty => false,
        CellValue::Number(n) => *n != 0.0,
        CellValue::Text(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "y" | "yes" | "true" | "t" | "1"
        ),
    }
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Render a currency amount at human scale.
///
/// - unavailable or zero → "NA"
/// - |v| ≥ 1,000,000 → "$1.25M"
/// - |v| ≥ 1,000 → "$850K"
/// - otherwise → "$999" (grouped, no decimals)
pub fn format_scaled_currency(value: Option<f64>) -> String {
    let amount = match value {
        Some(v) if v != 0.0 && v.is_finite() => v,
        _ => return NOT_AVAILABLE.to_string(),
    };

    let sign = if amount < 0.0 { "-" } else { "" };
    let magnitude = amount.abs();

    if magnitude >= 1_000_000.0 {
        format!("{}${:.2}M", sign, magnitude / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{}${:.0}K", sign, magnitude / 1_000.0)
    } else {
        format!("{}${}", sign, group_thousands(magnitude.round() as u64))
    }
}

/// Render a bounded proportion with six decimal digits.
pub fn format_fixed_precision(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.6}", v),
        _ => UNAVAILABLE.to_string(),
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ============================================================================
// SCORE REGIME
// ============================================================================

/// How a prediction score maps to money. Supplied by configuration; never
/// inferred from the score's own magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreRegime {
    /// Score is a proportion of a reference amount.
    Proportion { scale: f64 },
    /// Score is already an amount.
    RawMagnitude,
}

impl ScoreRegime {
    /// Reference amount draft-model scores are scaled against.
    pub const DEFAULT_SCALE: f64 = 9_250_000.0;

    pub fn project(&self, score: Option<f64>) -> Option<f64> {
        let score = score?;
        match self {
            ScoreRegime::Proportion { scale } => Some(score * scale),
            ScoreRegime::RawMagnitude => Some(score),
        }
    }
}

impl Default for ScoreRegime {
    fn default() -> Self {
        ScoreRegime::Proportion {
            scale: Self::DEFAULT_SCALE,
        }
    }
}

// ============================================================================
// AGGREGATES
// ============================================================================

/// Count/sum/mean over the available values of a column.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aggregate {
    /// Values that took part (zeros included).
    pub count: usize,
    /// Values skipped as unavailable.
    pub unavailable: usize,
    pub sum: f64,
    pub mean: Option<f64>,
}

impl Aggregate {
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut agg = Aggregate::default();
        for value in values {
            match value {
                Some(v) => {
                    agg.count += 1;
                    agg.sum += v;
                }
                None => agg.unavailable += 1,
            }
        }

        if agg.count > 0 {
            agg.mean = Some(agg.sum / agg.count as f64);
        }
        agg
    }
}
