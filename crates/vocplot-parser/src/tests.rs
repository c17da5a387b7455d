use std::fs;
use std::path::PathBuf;

use crate::errors::ParserError;
use crate::schema::{
    COMPOUND_NAME, OBSERVATION_COLUMNS, RAW_DATE, SITE_NAME, VALUE, WIND_DIRECTION, WIND_SPEED,
};
use crate::{parse_observations, read_observation_file};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn fixture(name: &str) -> String {
    let full_path = fixture_path(name);
    fs::read_to_string(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

#[test]
fn parses_export_with_wind_columns() {
    let parsed = parse_observations(&fixture("two_sites.csv")).expect("fixture parse failed");

    assert_eq!(parsed.row_count(), 5);
    assert!(parsed.has_wind());
    assert_eq!(parsed.ignored_headers, vec!["Unit".to_string()]);
    assert_eq!(parsed.unreadable_wind_cells, 0);

    let names = parsed.df.get_column_names();
    for expected in OBSERVATION_COLUMNS {
        assert!(
            names.iter().any(|name| name.as_str() == expected),
            "missing column {expected}"
        );
    }

    let sites = parsed.df.column(SITE_NAME).unwrap().str().unwrap();
    assert_eq!(sites.get(0), Some("Harbor East"));
    assert_eq!(sites.get(3), Some("Refinery Gate"));

    let compounds = parsed.df.column(COMPOUND_NAME).unwrap().str().unwrap();
    assert_eq!(compounds.get(1), Some("Toluene"));

    let dates = parsed.df.column(RAW_DATE).unwrap().str().unwrap();
    assert_eq!(dates.get(4), Some("20230230"));
}

#[test]
fn blank_values_parse_as_null() {
    let parsed = parse_observations(&fixture("two_sites.csv")).unwrap();

    let values = parsed.df.column(VALUE).unwrap().f64().unwrap();
    assert_eq!(values.get(0), Some(1.5));
    assert_eq!(values.get(2), None);
    assert_eq!(values.get(3), Some(18.0));

    let wind = parsed.df.column(WIND_SPEED).unwrap().f64().unwrap();
    assert_eq!(wind.get(3), None);
}

#[test]
fn accepts_underscore_header_aliases() {
    let content = "Site_ID,Site_Name,Parameter_Code,Compound_Name,Date,Time,Value\n\
                   1,North,45201,Benzene,20230101,08:00,0.7\n";
    let parsed = parse_observations(content).expect("aliases should resolve");

    assert_eq!(parsed.row_count(), 1);
    assert!(!parsed.has_wind());
    assert!(parsed.df.column(WIND_SPEED).is_err());
}

#[test]
fn missing_required_columns_are_listed() {
    let content = "Site ID,Site name,Compound_Name,Date,Value\n1,North,Benzene,20230101,0.7\n";
    let err = parse_observations(content).unwrap_err();

    match err {
        ParserError::MissingColumns { missing } => {
            assert_eq!(missing, vec!["Parameter Cd", "Time"]);
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

#[test]
fn non_numeric_value_reports_line() {
    let content = "Site ID,Site name,Parameter Cd,Compound_Name,Date,Time,Value\n\
                   1,North,45201,Benzene,20230101,08:00,0.7\n\
                   1,North,45201,Benzene,20230101,09:00,high\n";
    let err = parse_observations(content).unwrap_err();

    match err {
        ParserError::DataRow { line_index, message } => {
            assert_eq!(line_index, 3);
            assert!(message.contains("Value"));
        }
        other => panic!("expected DataRow, got {other:?}"),
    }
}

#[test]
fn non_numeric_wind_is_read_as_null() {
    let content = "Site ID,Site name,Parameter Cd,Compound_Name,Date,Time,Value,Wind Speed,Wind Direction\n\
                   1,North,45201,Benzene,20230101,08:00,0.7,3.2,NNE\n\
                   1,North,45201,Benzene,20230101,09:00,0.9,calm,270\n";
    let parsed = parse_observations(content).expect("wind text must not abort parsing");

    assert_eq!(parsed.row_count(), 2);
    assert_eq!(parsed.unreadable_wind_cells, 2);

    let speed = parsed.df.column(WIND_SPEED).unwrap().f64().unwrap();
    assert_eq!(speed.get(0), Some(3.2));
    assert_eq!(speed.get(1), None);

    let direction = parsed.df.column(WIND_DIRECTION).unwrap().f64().unwrap();
    assert_eq!(direction.get(0), None);
    assert_eq!(direction.get(1), Some(270.0));

    let values = parsed.df.column(VALUE).unwrap().f64().unwrap();
    assert_eq!(values.get(1), Some(0.9));
}

#[test]
fn duplicate_header_is_rejected() {
    let content = "Site ID,Site name,Site_Name,Parameter Cd,Compound_Name,Date,Time,Value\n";
    let err = parse_observations(content).unwrap_err();
    assert!(matches!(err, ParserError::DuplicateColumn { column: "Site name" }));
}

#[test]
fn header_only_file_yields_empty_frame() {
    let content = "Site ID,Site name,Parameter Cd,Compound_Name,Date,Time,Value\n";
    let parsed = parse_observations(content).unwrap();
    assert_eq!(parsed.row_count(), 0);
}

#[test]
fn missing_file_is_io_error() {
    let err = read_observation_file(&fixture_path("does_not_exist.csv")).unwrap_err();
    assert!(matches!(err, ParserError::Io { .. }));
}

#[test]
fn reads_fixture_from_disk() {
    let parsed = read_observation_file(&fixture_path("two_sites.csv")).unwrap();
    assert_eq!(parsed.row_count(), 5);
}
