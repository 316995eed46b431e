use std::path::PathBuf;

use pl_stats::dataset::{LoadWarning, RawTable, load_csv, load_table, normalize};
use pl_stats::summary::stat_layout;
use pl_stats::{FilterSpec, LoadError, Numeric, Position, filter};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn required_only() -> RawTable {
    RawTable::new([
        "Player",
        "Team",
        "Position",
        "Goals",
        "Assists",
        "Appearances",
        "Minutes",
    ])
}

#[test]
fn fixture_loads_with_recovered_warnings() {
    let report = load_csv(&fixture_path("premier_league_stats.csv")).expect("fixture should load");
    assert_eq!(report.table.len(), 9);
    assert_eq!(
        report.warnings,
        vec![
            LoadWarning::ValueCoercion {
                row: 5,
                column: "Save_Percentage",
                raw: "abc".to_string(),
            },
            LoadWarning::RowSkipped {
                row: 9,
                column: "Goals",
                raw: Some("x".to_string()),
            },
        ]
    );

    let rows = report.table.rows();
    let salah = &rows[0].record;
    assert_eq!(salah.position, Position::Forward);
    assert_eq!(salah.nationality, "EGY");
    assert_eq!(salah.minutes, 3371);
    assert_eq!(salah.age, Some(32));
    assert_eq!(salah.clean_sheets, None);
    assert_eq!(salah.expected_goals, Some(25.2));

    let ederson = &rows[5].record;
    assert_eq!(ederson.player, "Ederson");
    assert_eq!(ederson.save_percentage, None);
    assert_eq!(ederson.goals_against, Some(33));

    let reserve = &rows[7].record;
    assert_eq!(reserve.nationality, "Unknown");
    assert_eq!(reserve.clean_sheets, Some(0));

    let youngster = &rows[8].record;
    assert_eq!(youngster.position, Position::Other("AM".to_string()));
    assert!(rows.iter().all(|r| r.record.player != "Broken Row"));
}

#[test]
fn missing_required_columns_fail_the_load() {
    let mut raw = RawTable::new(["Player", "Team", "Assists", "Appearances"]);
    raw.push_row(["X", "A", "1", "2"]);
    let err = normalize(&raw).expect_err("schema should be rejected");
    assert_eq!(err.missing, vec!["Goals".to_string(), "Minutes".to_string()]);
    assert_eq!(err.to_string(), "missing required column(s): Goals, Minutes");
}

#[test]
fn missing_file_reports_io_error() {
    let err = load_csv(&fixture_path("does_not_exist.csv")).expect_err("file is missing");
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn absent_optional_columns_stay_absent() {
    let mut raw = required_only();
    raw.push_row(["X", "A", "DF", "0", "0", "10", "900"]);
    let report = load_table(&raw).expect("required columns present");
    let row = &report.table.rows()[0];
    assert_eq!(row.record.clean_sheets, None);
    assert_eq!(row.record.goals_against, None);
    assert_eq!(row.record.expected_goals, None);
    assert_eq!(row.record.nationality, "Unknown");
    assert_eq!(row.metrics.clean_sheet_pct, Numeric::NotApplicable);
    assert!(report.warnings.is_empty());
}

#[test]
fn missing_position_column_means_unknown() {
    let mut raw = RawTable::new(["Player", "Team", "Goals", "Assists", "Appearances", "Minutes"]);
    raw.push_row(["X", "A", "1", "0", "1", "90"]);
    let report = load_table(&raw).expect("position is optional");
    assert_eq!(report.table.rows()[0].record.position, Position::Unknown);
}

#[test]
fn single_row_scenario_normalizes_and_derives() {
    let mut raw = required_only();
    raw.push_row(["X", "A", "FW,MF", "10", "5", "20", "900"]);
    let report = load_table(&raw).expect("valid table");
    let row = &report.table.rows()[0];
    assert_eq!(row.record.position, Position::Forward);
    assert_eq!(row.record.position.label(), "FW");
    assert_eq!(row.metrics.goals_per_90, Numeric::Value(1.0));
    assert_eq!(row.metrics.assists_per_90, Numeric::Value(0.5));
    assert_eq!(row.metrics.minutes_per_goal, Numeric::Value(90.0));
}

#[test]
fn long_role_codes_join_their_standard_role() {
    let mut raw = required_only();
    raw.push_row(["Keeper", "A", "GKP", "0", "0", "10", "900"]);
    raw.push_row(["Striker", "A", "FWD", "8", "1", "10", "900"]);
    raw.push_row(["Playmaker", "A", "AM", "2", "6", "10", "900"]);
    let table = load_table(&raw).expect("valid table").table;

    assert_eq!(table.rows()[0].record.position, Position::Goalkeeper);
    assert_eq!(table.rows()[1].record.position, Position::Forward);
    assert_eq!(table.rows()[2].record.position, Position::Other("AM".into()));

    let keepers = filter(&table, &FilterSpec::new().position_label("GK")).into_view();
    assert_eq!(keepers.len(), 1);
    assert_eq!(keepers.rows()[0].player(), "Keeper");
    assert_eq!(
        stat_layout(table.rows()[0].position()),
        stat_layout(&Position::Goalkeeper)
    );
}

#[test]
fn negative_or_null_counts_skip_the_row() {
    let mut raw = required_only();
    raw.push_row(["X", "A", "FW", "-1", "0", "1", "90"]);
    raw.push_row(["Y", "A", "FW", "1", "0", "1", ""]);
    raw.push_row(["", "A", "FW", "1", "0", "1", "90"]);
    raw.push_row(["Z", "A", "FW", "1", "0", "1", "90"]);
    let report = load_table(&raw).expect("schema is fine");
    assert_eq!(report.table.len(), 1);
    assert_eq!(report.table.rows()[0].record.player, "Z");
    assert_eq!(
        report.warnings,
        vec![
            LoadWarning::RowSkipped {
                row: 0,
                column: "Goals",
                raw: Some("-1".to_string()),
            },
            LoadWarning::RowSkipped {
                row: 1,
                column: "Minutes",
                raw: None,
            },
            LoadWarning::RowSkipped {
                row: 2,
                column: "Player",
                raw: None,
            },
        ]
    );
}

#[test]
fn fbref_headers_are_accepted() {
    let report = load_csv(&fixture_path("fbref_export.csv")).expect("aliases should resolve");
    assert_eq!(report.table.len(), 3);

    let saka = &report.table.rows()[0].record;
    assert_eq!(saka.team, "Arsenal");
    assert_eq!(saka.position, Position::Forward);
    assert_eq!(saka.nationality, "ENG");
    assert_eq!(saka.appearances, 25);
    assert_eq!(saka.minutes, 1994);
    assert_eq!(saka.goals, 6);
    assert_eq!(saka.assists, 10);
    assert_eq!(saka.age, Some(23));
    assert_eq!(saka.year_born, Some(2001));
    assert_eq!(saka.progressive_carries, Some(97));

    // Short trailing cell reads as absent, not zero.
    let rice = &report.table.rows()[2].record;
    assert_eq!(rice.progressive_receptions, None);
    assert!(report.warnings.is_empty());
}

#[test]
fn canonical_header_wins_over_alias() {
    let mut raw = RawTable::new(["Player", "Squad", "Team", "Goals", "Assists", "Appearances", "Minutes"]);
    raw.push_row(["X", "Old Club", "New Club", "0", "0", "1", "10"]);
    let report = load_table(&raw).expect("valid table");
    assert_eq!(report.table.rows()[0].record.team, "New Club");
}

#[test]
fn null_markers_read_as_absent() {
    let mut raw = RawTable::new([
        "Player",
        "Team",
        "Nationality",
        "Goals",
        "Assists",
        "Appearances",
        "Minutes",
        "xG",
    ]);
    raw.push_row(["X", "A", "NaN", "0", "0", "1", "10", "N/A"]);
    let report = load_table(&raw).expect("valid table");
    let row = &report.table.rows()[0].record;
    assert_eq!(row.nationality, "Unknown");
    assert_eq!(row.expected_goals, None);
    assert!(report.warnings.is_empty());
}
