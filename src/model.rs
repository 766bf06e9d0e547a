//! Analysis data model.
//!
//! Wire shapes mirror what the analysis service exchanges on `/api/analyze`:
//! a request naming the uploaded file and parsing mode, and a response with
//! per-column leading-digit statistics plus a summary of how the file was
//! parsed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Expected percentage of each leading digit (1..=9) under Benford's law.
///
/// This series is fixed; charts render it next to the observed series and
/// never modify it.
pub const BENFORD_EXPECTED: [f64; 9] = [30.1, 17.6, 12.5, 9.7, 7.9, 6.7, 5.8, 5.1, 4.6];

/// p-value at or above which a column is treated as Benford-compliant.
pub const COMPLIANCE_THRESHOLD: f64 = 0.95;

/// Text shown for the non-selectable placeholder entry in the column list.
pub const PLACEHOLDER_LABEL: &str = "Select column";

/// Body of the analyze request: which uploaded file to analyze and the
/// parsing mode to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub filename: String,
    pub ext: String,
}

/// Leading-digit statistics for one analyzed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    /// Percentage of values led by each digit 1..=9, in digit order.
    pub lead_digit_freq: [f64; 9],
    /// Goodness of fit against Benford's distribution, in [0, 1].
    pub benford_p_value: f64,
}

impl ColumnStats {
    /// Whether the column satisfies Benford's law at the 0.95 threshold.
    pub fn is_compliant(&self) -> bool {
        self.benford_p_value >= COMPLIANCE_THRESHOLD
    }
}

/// Server-side parse statistics for the analyzed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub filename: String,
    pub ext: String,
    pub hash: String,
    pub header_size: usize,
    pub parsed_lines: usize,
    pub omitted_lines: usize,
    pub parsed_words: usize,
}

/// Result of one analyze call.
///
/// A fresh report replaces the previous one wholesale; there is no merging
/// of results across analyses, and a failed analyze leaves the previous
/// report untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Per-column statistics, keyed by column name. A `BTreeMap` so the
    /// derived column list has a deterministic order regardless of how the
    /// server serialized its JSON object.
    pub stats: BTreeMap<String, ColumnStats>,
    /// How the server parsed the file.
    pub summary: FileSummary,
}

impl AnalysisReport {
    /// Column names in deterministic (sorted) order.
    pub fn columns(&self) -> Vec<String> {
        self.stats.keys().cloned().collect()
    }

    pub fn column_stats(&self, column: &str) -> Option<&ColumnStats> {
        self.stats.get(column)
    }
}

/// One entry in the column list. `Placeholder` stands for "no column chosen
/// yet" and is never a valid chart selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnEntry {
    Placeholder,
    Column(String),
}

impl fmt::Display for ColumnEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnEntry::Placeholder => f.write_str(PLACEHOLDER_LABEL),
            ColumnEntry::Column(name) => f.write_str(name),
        }
    }
}

/// Call contract for the chart rendering observed vs. expected leading-digit
/// percentages.
///
/// Implementations replace the observed series (index i holds the value for
/// leading digit i+1) and redraw; the expected series is [`BENFORD_EXPECTED`]
/// and stays untouched.
pub trait LeadDigitChart {
    fn set_observed(&mut self, series: [f64; 9]);
}
