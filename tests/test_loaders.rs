// Loading CSV and JSON files into a client-mode table

use fleet_table::data::datatable_loaders::{load_rows, LoadedRows};
use fleet_table::{DataValue, TableController, TableMode, TableOptions, TableRow};
use std::io::Write;
use tempfile::Builder;

fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn controller(loaded: LoadedRows) -> TableController<fleet_table::DataRow> {
    let options = TableOptions::default().with_columns(loaded.columns);
    TableController::with_rows(loaded.rows, options)
}

#[test]
fn test_csv_file_drives_a_client_table() {
    let file = write_temp(
        ".csv",
        "driver,score,lastTrip\nAnna,91,2024-03-01\nBob,,2024-02-11\nHannah,78,2024-03-09\n",
    );
    let loaded = load_rows(file.path()).unwrap();
    assert_eq!(loaded.len(), 3);
    let keys: Vec<&str> = loaded.columns.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["driver", "score", "lastTrip"]);

    let mut table = controller(loaded);
    assert_eq!(table.mode(), TableMode::Client);

    table.set_sort("score");
    let drivers: Vec<String> = table
        .rows()
        .iter()
        .map(|r| r.value("driver").unwrap().to_string())
        .collect();
    // Empty score loads as null and sorts last
    assert_eq!(drivers, vec!["Hannah", "Anna", "Bob"]);

    table.set_sort("lastTrip");
    table.set_sort("lastTrip");
    let first = table.rows()[0].value("driver");
    assert_eq!(first, Some(DataValue::String("Hannah".to_string())));
}

#[test]
fn test_json_envelope_file() {
    let file = write_temp(
        ".json",
        r#"{"rows": [
            {"vehicle": "VAN-001", "active": true},
            {"vehicle": "TRK-002", "active": false, "odometer": 120400}
        ]}"#,
    );
    let loaded = load_rows(file.path()).unwrap();
    let keys: Vec<&str> = loaded.columns.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["active", "vehicle", "odometer"]);

    let mut table = controller(loaded);
    table.set_column_search("vehicle", "trk");
    table.flush_column_search();
    assert_eq!(table.total_filtered_records(), 1);
    assert_eq!(
        table.rows()[0].value("odometer"),
        Some(DataValue::Integer(120400))
    );
}

#[test]
fn test_unknown_extension_is_rejected() {
    let file = write_temp(".xml", "<rows/>");
    let err = load_rows(file.path()).unwrap_err();
    assert!(err.to_string().starts_with("Unsupported file type"));
}

#[test]
fn test_missing_file_reports_path() {
    let err = load_rows("/nonexistent/fleet/drivers.csv").unwrap_err();
    assert!(format!("{:#}", err).contains("drivers.csv"));
}
