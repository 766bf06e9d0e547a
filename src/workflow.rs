//! Client-side workflow state for the upload -> analyze -> visualize sequence.
//!
//! `Workbench` owns every piece of state that more than one action touches:
//! the server file listing and its selection, the staged local file, the
//! loaded analysis modes, the latest report, and the column list. Each
//! transition is a single method, so the GUI's update loop and the CLI
//! drive identical logic.
//!
//! Listing refreshes are not de-duplicated: with two in flight, whichever
//! response resolves last wins, even if it is the older one. Known
//! limitation. The selection is tracked by file name, never by position,
//! so a stale listing can clear it but cannot point it at the wrong file.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::{AnalysisReport, AnalyzeRequest, ColumnEntry};

/// Local precondition failures. These never reach the network; the caller
/// turns one into exactly one user notice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Select file first")]
    NoFileSelected,
    #[error("Analysis modes are not loaded yet")]
    NoMode,
    #[error("Choose a file to upload first")]
    NothingStaged,
}

// ============================================================================
// File registry
// ============================================================================

/// The server's file listing and the current selection.
#[derive(Debug, Clone, Default)]
pub struct FileRegistry {
    files: Vec<String>,
    selected: Option<String>,
}

impl FileRegistry {
    /// Replace the listing with a fresh one from the server.
    ///
    /// If `select` names a file present in the new listing it becomes the
    /// selection; otherwise the selection is cleared. Callers that want a
    /// manual refresh to keep the current selection pass it back in here.
    pub fn apply_listing(&mut self, files: Vec<String>, select: Option<&str>) {
        self.files = files;
        self.selected = select
            .filter(|name| self.files.iter().any(|f| f == name))
            .map(str::to_string);
    }

    /// Select a file by name. Returns false (and changes nothing) when the
    /// name is not in the listing.
    pub fn select(&mut self, name: &str) -> bool {
        if self.files.iter().any(|f| f == name) {
            self.selected = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }
}

// ============================================================================
// Upload staging
// ============================================================================

/// Local file staged for upload. Staging has no network effect; the upload
/// itself is issued by the caller with [`Workbench::upload_request`].
#[derive(Debug, Clone, Default)]
pub struct UploadStage {
    staged: Option<PathBuf>,
}

impl UploadStage {
    pub fn set_file(&mut self, path: PathBuf) {
        self.staged = Some(path);
    }

    pub fn path(&self) -> Option<&Path> {
        self.staged.as_deref()
    }

    /// Base name of the staged file, as the server will list it.
    pub fn file_name(&self) -> Option<String> {
        self.staged
            .as_deref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(str::to_string)
    }
}

// ============================================================================
// Column selection
// ============================================================================

/// Column list state: the placeholder entry plus the columns of the current
/// report. The placeholder is always present, always first, and choosing it
/// never drives the chart.
#[derive(Debug, Clone)]
pub struct ColumnSelect {
    entries: Vec<ColumnEntry>,
    chosen: Option<String>,
}

impl Default for ColumnSelect {
    fn default() -> Self {
        let mut select = Self {
            entries: Vec::new(),
            chosen: None,
        };
        select.reset();
        select
    }
}

impl ColumnSelect {
    /// Collapse to the placeholder-only list with nothing chosen.
    pub fn reset(&mut self) {
        self.entries = vec![ColumnEntry::Placeholder];
        self.chosen = None;
    }

    /// Rebuild the list for a fresh set of columns, discarding any previous
    /// choice. The result is `[Placeholder, columns...]`.
    pub fn populate(&mut self, columns: &[String]) {
        self.reset();
        self.entries
            .extend(columns.iter().cloned().map(ColumnEntry::Column));
    }

    /// Record a choice. The placeholder is a no-op yielding `None`; a real
    /// column is recorded and returned so the caller can chart it.
    pub fn choose(&mut self, entry: &ColumnEntry) -> Option<&str> {
        match entry {
            ColumnEntry::Placeholder => None,
            ColumnEntry::Column(name) => {
                self.chosen = Some(name.clone());
                self.chosen.as_deref()
            }
        }
    }

    pub fn entries(&self) -> &[ColumnEntry] {
        &self.entries
    }

    pub fn chosen(&self) -> Option<&str> {
        self.chosen.as_deref()
    }
}

// ============================================================================
// Workbench
// ============================================================================

/// All workflow state, composed. One instance per running client.
#[derive(Debug, Clone, Default)]
pub struct Workbench {
    pub registry: FileRegistry,
    pub upload: UploadStage,
    pub columns: ColumnSelect,
    extensions: Vec<String>,
    selected_ext: Option<String>,
    report: Option<AnalysisReport>,
}

impl Workbench {
    /// A fresh file listing arrived from the server.
    pub fn apply_file_listing(&mut self, files: Vec<String>, select: Option<&str>) {
        self.registry.apply_listing(files, select);
    }

    /// The supported analysis modes arrived; default to the first one.
    ///
    /// Until this succeeds at least once, [`Workbench::analyze_request`]
    /// fails validation; an analyze with no mode is meaningless.
    pub fn apply_extensions(&mut self, extensions: Vec<String>) {
        self.selected_ext = extensions.first().cloned();
        self.extensions = extensions;
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn selected_extension(&self) -> Option<&str> {
        self.selected_ext.as_deref()
    }

    /// Pick one of the loaded analysis modes. Unknown names are ignored.
    pub fn select_extension(&mut self, ext: String) {
        if self.extensions.iter().any(|e| *e == ext) {
            self.selected_ext = Some(ext);
        }
    }

    /// Path to submit for upload, or why the upload cannot start.
    pub fn upload_request(&self) -> Result<PathBuf, ValidationError> {
        self.upload
            .path()
            .map(Path::to_path_buf)
            .ok_or(ValidationError::NothingStaged)
    }

    /// Build the analyze request, or report why it cannot be issued.
    ///
    /// Checked before any network traffic: with no selected file or no
    /// loaded modes this fails right here and nothing is sent.
    pub fn analyze_request(&self) -> Result<AnalyzeRequest, ValidationError> {
        let filename = self
            .registry
            .selected()
            .ok_or(ValidationError::NoFileSelected)?
            .to_string();
        let ext = self
            .selected_ext
            .clone()
            .ok_or(ValidationError::NoMode)?;
        Ok(AnalyzeRequest { filename, ext })
    }

    /// A successful analysis replaces the previous report wholesale and
    /// rebuilds the column list, clearing any earlier column choice.
    ///
    /// Failed analyses must not call this; the previous report stays.
    pub fn apply_report(&mut self, report: AnalysisReport) {
        self.columns.populate(&report.columns());
        self.report = Some(report);
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    /// Record a column choice and hand back the series to chart, if the
    /// entry is a real column of the current report.
    pub fn choose_column(&mut self, entry: &ColumnEntry) -> Option<[f64; 9]> {
        let name = self.columns.choose(entry)?.to_string();
        let stats = self.report.as_ref()?.column_stats(&name)?;
        Some(stats.lead_digit_freq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnStats, FileSummary, BENFORD_EXPECTED};
    use std::collections::BTreeMap;

    fn report_with(columns: &[(&str, f64)]) -> AnalysisReport {
        let stats: BTreeMap<String, ColumnStats> = columns
            .iter()
            .map(|(name, p)| {
                (
                    name.to_string(),
                    ColumnStats {
                        lead_digit_freq: BENFORD_EXPECTED,
                        benford_p_value: *p,
                    },
                )
            })
            .collect();
        AnalysisReport {
            stats,
            summary: FileSummary {
                filename: "data.csv".to_string(),
                ext: ".csv".to_string(),
                hash: "cafe.csv".to_string(),
                header_size: columns.len(),
                parsed_lines: 10,
                omitted_lines: 0,
                parsed_words: 10 * columns.len(),
            },
        }
    }

    #[test]
    fn refresh_selects_by_name_when_present() {
        let mut registry = FileRegistry::default();
        registry.apply_listing(
            vec!["a.csv".to_string(), "data.csv".to_string()],
            Some("data.csv"),
        );
        assert_eq!(registry.selected(), Some("data.csv"));
    }

    #[test]
    fn refresh_clears_selection_when_hint_is_absent() {
        let mut registry = FileRegistry::default();
        registry.apply_listing(vec!["a.csv".to_string()], Some("a.csv"));
        registry.apply_listing(vec!["b.csv".to_string()], Some("a.csv"));
        assert_eq!(registry.selected(), None);

        registry.apply_listing(vec!["b.csv".to_string()], None);
        assert_eq!(registry.selected(), None);
    }

    #[test]
    fn select_rejects_unknown_names() {
        let mut registry = FileRegistry::default();
        registry.apply_listing(vec!["a.csv".to_string()], None);
        assert!(!registry.select("missing.csv"));
        assert_eq!(registry.selected(), None);
        assert!(registry.select("a.csv"));
        assert_eq!(registry.selected(), Some("a.csv"));
    }

    #[test]
    fn populate_keeps_exactly_one_placeholder_first() {
        let mut columns = ColumnSelect::default();
        columns.populate(&["a".to_string(), "b".to_string()]);
        assert_eq!(columns.entries().len(), 3);
        assert_eq!(columns.entries()[0], ColumnEntry::Placeholder);
        let placeholders = columns
            .entries()
            .iter()
            .filter(|e| **e == ColumnEntry::Placeholder)
            .count();
        assert_eq!(placeholders, 1);
    }

    #[test]
    fn choosing_the_placeholder_is_a_no_op() {
        let mut columns = ColumnSelect::default();
        columns.populate(&["a".to_string()]);
        assert!(columns.choose(&ColumnEntry::Column("a".to_string())).is_some());
        assert_eq!(columns.chosen(), Some("a"));

        assert!(columns.choose(&ColumnEntry::Placeholder).is_none());
        assert_eq!(columns.chosen(), Some("a"));
    }

    #[test]
    fn analyze_needs_a_selected_file() {
        let mut bench = Workbench::default();
        bench.apply_extensions(vec![".csv".to_string()]);
        assert_eq!(
            bench.analyze_request(),
            Err(ValidationError::NoFileSelected)
        );
        assert_eq!(
            ValidationError::NoFileSelected.to_string(),
            "Select file first"
        );
    }

    #[test]
    fn analyze_needs_loaded_modes() {
        let mut bench = Workbench::default();
        bench.apply_file_listing(vec!["data.csv".to_string()], Some("data.csv"));
        assert_eq!(bench.analyze_request(), Err(ValidationError::NoMode));
    }

    #[test]
    fn analyze_request_carries_selection_and_mode() {
        let mut bench = Workbench::default();
        bench.apply_extensions(vec![".csv".to_string(), ".tsv".to_string()]);
        assert_eq!(bench.selected_extension(), Some(".csv"));
        bench.select_extension(".tsv".to_string());
        bench.select_extension(".xlsx".to_string()); // not offered, ignored
        bench.apply_file_listing(vec!["data.csv".to_string()], Some("data.csv"));

        let request = bench.analyze_request().unwrap();
        assert_eq!(request.filename, "data.csv");
        assert_eq!(request.ext, ".tsv");
    }

    #[test]
    fn report_rebuilds_columns_and_clears_choice() {
        let mut bench = Workbench::default();
        bench.apply_report(report_with(&[("a", 0.99), ("b", 0.10)]));
        bench.choose_column(&ColumnEntry::Column("a".to_string()));
        assert_eq!(bench.columns.chosen(), Some("a"));

        bench.apply_report(report_with(&[("c", 0.50)]));
        assert_eq!(bench.columns.chosen(), None);
        assert_eq!(
            bench.columns.entries(),
            &[
                ColumnEntry::Placeholder,
                ColumnEntry::Column("c".to_string()),
            ]
        );
    }

    #[test]
    fn choose_column_yields_the_series() {
        let mut bench = Workbench::default();
        bench.apply_report(report_with(&[("a", 0.99)]));
        let series = bench
            .choose_column(&ColumnEntry::Column("a".to_string()))
            .unwrap();
        assert_eq!(series, BENFORD_EXPECTED);
        assert!(bench
            .choose_column(&ColumnEntry::Placeholder)
            .is_none());
    }
}
