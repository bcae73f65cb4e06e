use govgraph::chart::ChartKind;
use govgraph::error::LoadError;
use govgraph::inference::{AlignmentPolicy, infer_series};
use govgraph::loader::{
    FileFormat, load_rows, rows_from_bytes, rows_from_csv, rows_from_excel, rows_from_json,
};
use govgraph::record::FieldValue;
use rust_xlsxwriter::{Workbook, Worksheet};
use serde_json::json;
use std::fs;

/// A workbook whose first sheet has a header row, a blank header column and gaps
fn literacy_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let mut sheet = Worksheet::new();

    sheet.write_string(0, 0, "state").unwrap();
    sheet.write_string(0, 1, "rate").unwrap();
    // column 2 has no header
    sheet.write_string(0, 3, "coastal").unwrap();

    sheet.write_string(1, 0, "Kerala").unwrap();
    sheet.write_number(1, 1, 93.91).unwrap();
    sheet.write_string(1, 2, "ignored").unwrap();
    sheet.write_boolean(1, 3, true).unwrap();

    // rate left empty
    sheet.write_string(2, 0, "Punjab").unwrap();
    sheet.write_boolean(2, 3, false).unwrap();

    sheet.write_string(3, 0, "Goa").unwrap();
    sheet.write_number(3, 1, 88.7).unwrap();

    workbook.push_worksheet(sheet);

    let mut second = Worksheet::new();
    second.write_string(0, 0, "other sheet").unwrap();
    workbook.push_worksheet(second);

    workbook.save_to_buffer().unwrap()
}

#[test]
fn detects_format_from_extension() {
    assert_eq!(FileFormat::from_name("rates.csv").unwrap(), FileFormat::Csv);
    assert_eq!(FileFormat::from_name("RATES.XLSX").unwrap(), FileFormat::Excel);
    assert_eq!(FileFormat::from_name("old.xls").unwrap(), FileFormat::Excel);
    assert!(matches!(
        FileFormat::from_name("notes.txt"),
        Err(LoadError::UnsupportedExtension(ext)) if ext == "txt"
    ));
    assert!(matches!(
        FileFormat::from_name("README"),
        Err(LoadError::MissingExtension)
    ));
}

#[test]
fn csv_header_names_fields() {
    let data = b" district , production\nLudhiana,1820.5\n\nAmritsar,1432\n";
    let rows = rows_from_csv(data).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0].keys().collect::<Vec<_>>(),
        vec!["district", "production"]
    );
    assert_eq!(rows[1].get("district"), Some(&FieldValue::from("Amritsar")));
    assert_eq!(rows[1].get("production"), Some(&FieldValue::from("1432")));
}

#[test]
fn csv_short_records_keep_available_fields() {
    let rows = rows_from_csv(b"state,rate,year\nGoa,88.7\n").unwrap();
    assert_eq!(rows[0].len(), 2);
    assert!(rows[0].get("year").is_none());
}

#[test]
fn uploaded_csv_feeds_inference() {
    let rows = rows_from_bytes("literacy.csv", b"state,rate\nKerala,93.91\nPunjab,76.68\n").unwrap();
    let preview = infer_series(&rows, ChartKind::Bar, AlignmentPolicy::Positional).unwrap();
    assert_eq!(preview.series.labels, vec!["Kerala", "Punjab"]);
    assert_eq!(preview.series.datasets[0].data, vec![93.91, 76.68]);
}

#[test]
fn unsupported_upload_is_rejected() {
    assert!(matches!(
        rows_from_bytes("data.json", b"[]"),
        Err(LoadError::UnsupportedExtension(_))
    ));
}

#[test]
fn load_rows_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("budget.csv");
    fs::write(&path, "year,amount\n2023-24,89155\n2024-25,90659\n").unwrap();

    let rows = load_rows(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("year"), Some(&FieldValue::from("2023-24")));

    assert!(matches!(
        load_rows(dir.path().join("missing.csv")),
        Err(LoadError::Io(_))
    ));
}

#[test]
fn json_payload_shapes() {
    let array = json!([{ "state": "Kerala", "rate": 93.91 }, "skipped"]);
    let rows = rows_from_json(&array);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("rate"), Some(&FieldValue::Number(93.91)));

    let records = json!({ "total": 2, "records": [{ "a": 1 }, { "a": 2 }] });
    assert_eq!(rows_from_json(&records).len(), 2);

    let data = json!({ "data": [{ "a": null }] });
    assert_eq!(rows_from_json(&data)[0].get("a"), Some(&FieldValue::Null));

    let single = json!({ "state": "Goa", "rate": 88.7 });
    assert_eq!(rows_from_json(&single).len(), 1);

    assert!(rows_from_json(&json!("text")).is_empty());
}

#[test]
fn json_keeps_key_order() {
    let payload: serde_json::Value =
        serde_json::from_str(r#"[{"zone":"North","value":4,"alpha":"x"}]"#).unwrap();
    let rows = rows_from_json(&payload);
    assert_eq!(rows[0].keys().collect::<Vec<_>>(), vec!["zone", "value", "alpha"]);
}

#[test]
fn excel_first_sheet_becomes_rows() {
    let rows = rows_from_excel(&literacy_workbook()).unwrap();
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].keys().collect::<Vec<_>>(), vec!["state", "rate", "coastal"]);
    assert_eq!(rows[0].get("state"), Some(&FieldValue::from("Kerala")));
    assert_eq!(rows[0].get("rate"), Some(&FieldValue::Number(93.91)));
    assert_eq!(rows[0].get("coastal"), Some(&FieldValue::Bool(true)));

    // empty cells are left out of the row
    assert!(rows[1].get("rate").is_none());
    assert_eq!(rows[1].get("coastal"), Some(&FieldValue::Bool(false)));
    assert_eq!(rows[2].len(), 2);
}

#[test]
fn uploaded_workbook_feeds_inference() {
    let rows = rows_from_bytes("literacy.xlsx", &literacy_workbook()).unwrap();
    let preview = infer_series(&rows, ChartKind::Bar, AlignmentPolicy::RowKeyed).unwrap();
    assert_eq!(preview.columns.label_field, "state");
    assert_eq!(preview.columns.value_field, "rate");
    // a missing value reads as zero
    assert_eq!(preview.series.labels, vec!["Kerala", "Punjab", "Goa"]);
    assert_eq!(preview.series.datasets[0].data, vec![93.91, 0.0, 88.7]);
}

#[test]
fn corrupt_workbook_is_an_error() {
    assert!(rows_from_excel(b"PK\x03\x04 not really a zip").is_err());
}
