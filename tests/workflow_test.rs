//! Integration tests for the upload -> analyze -> visualize workflow.
//!
//! Exercises the same library paths both binaries drive, against a canned
//! analyze response under `tests/fixtures/`.

use benford_workbench::client::ApiError;
use benford_workbench::model::{AnalysisReport, ColumnEntry};
use benford_workbench::workflow::{ValidationError, Workbench};

fn fixture_report() -> AnalysisReport {
    let json = include_str!("fixtures/analyze_response.json");
    serde_json::from_str(json).expect("fixture must match the wire format")
}

/// A workbench that is ready to analyze except for the file selection.
fn bench_with_modes() -> Workbench {
    let mut bench = Workbench::default();
    bench.apply_extensions(vec![".csv".to_string(), ".tsv".to_string()]);
    bench
}

#[test]
fn analyze_with_no_selection_fails_before_the_network() {
    let bench = bench_with_modes();
    let err = bench.analyze_request().unwrap_err();
    assert_eq!(err, ValidationError::NoFileSelected);
    assert_eq!(err.to_string(), "Select file first");
}

#[test]
fn upload_refresh_selects_the_new_file() {
    let mut bench = bench_with_modes();

    // Listing before the upload: nothing selected.
    bench.apply_file_listing(vec!["old.csv".to_string()], None);
    assert_eq!(bench.registry.selected(), None);

    // The post-upload refresh re-asserts the uploaded name.
    bench.apply_file_listing(
        vec!["old.csv".to_string(), "data.csv".to_string()],
        Some("data.csv"),
    );
    assert_eq!(bench.registry.selected(), Some("data.csv"));

    let request = bench.analyze_request().unwrap();
    assert_eq!(request.filename, "data.csv");
    assert_eq!(request.ext, ".csv");
}

#[test]
fn report_populates_the_column_list_placeholder_first() {
    let mut bench = bench_with_modes();
    bench.apply_report(fixture_report());

    assert_eq!(
        bench.columns.entries(),
        &[
            ColumnEntry::Placeholder,
            ColumnEntry::Column("a".to_string()),
            ColumnEntry::Column("b".to_string()),
        ]
    );
    assert_eq!(bench.columns.chosen(), None);
}

#[test]
fn column_choice_yields_the_series_in_digit_order() {
    let mut bench = bench_with_modes();
    bench.apply_report(fixture_report());

    let series = bench
        .choose_column(&ColumnEntry::Column("a".to_string()))
        .expect("column a is in the report");
    assert_eq!(series.len(), 9);
    assert_eq!(series[0], 40.0); // leading digit 1
    assert_eq!(series[1], 15.0); // leading digit 2
    assert_eq!(series[8], 2.0); // leading digit 9

    let report = bench.report().unwrap();
    assert!(!report.column_stats("a").unwrap().is_compliant());
    assert!(report.column_stats("b").unwrap().is_compliant());
}

#[test]
fn placeholder_choice_never_touches_the_chart() {
    let mut bench = bench_with_modes();
    bench.apply_report(fixture_report());
    bench.choose_column(&ColumnEntry::Column("b".to_string()));

    assert!(bench.choose_column(&ColumnEntry::Placeholder).is_none());
    assert_eq!(bench.columns.chosen(), Some("b"));
}

#[test]
fn a_new_report_replaces_the_old_one_wholesale() {
    let mut bench = bench_with_modes();
    bench.apply_report(fixture_report());
    bench.choose_column(&ColumnEntry::Column("a".to_string()));

    let mut second = fixture_report();
    second.stats.remove("a");
    bench.apply_report(second);

    // No merging: column "a" is gone, and the choice was cleared.
    assert!(bench.report().unwrap().column_stats("a").is_none());
    assert_eq!(bench.columns.chosen(), None);
    assert_eq!(
        bench.columns.entries(),
        &[
            ColumnEntry::Placeholder,
            ColumnEntry::Column("b".to_string()),
        ]
    );
    assert!(bench
        .choose_column(&ColumnEntry::Column("a".to_string()))
        .is_none());
}

#[test]
fn server_error_message_reaches_the_notice_text() {
    let err = ApiError::Server("unsupported file".to_string());
    assert_eq!(
        format!("Could not analyze file: {}", err),
        "Could not analyze file: unsupported file"
    );
}

#[test]
fn staged_file_name_is_the_base_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.csv");
    std::fs::write(&path, "a,b\n1,2\n").unwrap();

    let mut bench = Workbench::default();
    assert_eq!(bench.upload_request(), Err(ValidationError::NothingStaged));

    bench.upload.set_file(path.clone());
    assert_eq!(bench.upload.file_name().as_deref(), Some("ledger.csv"));
    assert_eq!(bench.upload_request().unwrap(), path);
}
