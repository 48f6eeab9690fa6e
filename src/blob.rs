// 🧵 Blob Parser - rows out of a single-cell pretty-printed table
//
// The export sometimes arrives as one cell holding a rendered table:
//
//   1 │ Brody Brecht    0.309059
//   2 │ Kavares Tears   0.143914
//
// There is no reliable row terminator, only the repeating `ordinal │`
// prefix. The blob is cut into one segment per prefix first, so a bad
// value can only ever spoil its own row.

use crate::error::TableError;
use crate::normalize::PredictionRecord;
use crate::values::coerce_str;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Column separator used by the pretty-printer (U+2502).
pub const SEPARATOR: char = '│';

static ROW_START: OnceLock<Regex> = OnceLock::new();
static ROW_BODY: OnceLock<Regex> = OnceLock::new();

/// `ordinal │`, the start of every data row.
fn row_start() -> &'static Regex {
    ROW_START.get_or_init(|| Regex::new(r"(\d+)\s*│").expect("blob row prefix is valid"))
}

/// `name  value` on the first line of a segment; the value is the last token.
fn row_body() -> &'static Regex {
    ROW_BODY.get_or_init(|| Regex::new(r"^(.+?)\s+(\S+)\s*$").expect("blob row body is valid"))
}

/// Split a blob into `(ordinal, body)` segments, one per row prefix.
fn segments(blob: &str) -> Vec<(&str, &str)> {
    let starts: Vec<regex::Captures> = row_start().captures_iter(blob).collect();

    starts
        .iter()
        .enumerate()
        .filter_map(|(i, caps)| {
            let ordinal = caps.get(1)?.as_str();
            let begin = caps.get(0)?.end();
            let end = match starts.get(i + 1).and_then(|next| next.get(0)) {
                Some(next) => next.start(),
                None => blob.len(),
            };
            Some((ordinal, &blob[begin..end]))
        })
        .collect()
}

/// Extract `(name, score)` rows in blob order.
///
/// A row whose value fails to coerce is dropped on its own; zero surviving
/// rows is `EmptyParseResult`, distinct from an unreadable file.
pub fn parse_blob(blob: &str) -> Result<Vec<PredictionRecord>, TableError> {
    let mut records = Vec::new();

    for (ordinal, segment) in segments(blob) {
        let line = segment.lines().next().unwrap_or("").trim();

        let Some(caps) = row_body().captures(line) else {
            debug!(ordinal, line, "blob row without a name and value dropped");
            continue;
        };
        let name = caps[1].trim();
        let raw_value = &caps[2];

        match coerce_str(raw_value) {
            Some(score) => records.push(PredictionRecord::new(name, Some(score))),
            None => debug!(ordinal, name, raw_value, "blob row with unparsable value dropped"),
        }
    }

    if records.is_empty() {
        return Err(TableError::EmptyParseResult);
    }

    Ok(records)
}
