use crate::error::LoadError;
use crate::record::{FieldValue, Row};
use serde_json::Value;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Tabular formats accepted for upload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Excel,
}

impl FileFormat {
    /// Detects the format from a file name's extension
    ///
    /// # Errors
    /// * `UnsupportedExtension` for anything but `csv`, `xlsx` and `xls`
    /// * `MissingExtension` if the name has no extension
    pub fn from_name(name: impl AsRef<Path>) -> Result<Self, LoadError> {
        let extension = name
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(FileFormat::Csv),
            Some("xlsx") | Some("xls") => Ok(FileFormat::Excel),
            Some(ext) => Err(LoadError::UnsupportedExtension(ext.to_string())),
            None => Err(LoadError::MissingExtension),
        }
    }
}

/// Reads rows from CSV data with a header line
///
/// The header names the fields. Every cell is kept as text, the way the
/// upload form sees it; numeric detection happens during inference. Blank
/// lines are skipped and short records only get the fields they have.
///
/// # Examples
/// ```
/// use govgraph::loader::rows_from_csv;
///
/// let rows = rows_from_csv(b"state,rate\nKerala,93.91\n".as_slice()).unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].keys().collect::<Vec<_>>(), vec!["state", "rate"]);
/// ```
pub fn rows_from_csv(data: &[u8]) -> Result<Vec<Row>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.to_string(), FieldValue::from(value)))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Reads rows from the first worksheet of an Excel workbook
///
/// The first sheet row is the header. Empty cells are left out of a row,
/// numbers stay numbers and booleans stay booleans.
pub fn rows_from_excel(data: &[u8]) -> Result<Vec<Row>, LoadError> {
    use calamine::{Data, Reader, open_workbook_auto_from_rs};

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data.to_vec()))?;

    // Get the first worksheet
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(LoadError::NoSheets)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(header) => header.iter().map(|cell| cell.to_string()).collect(),
        None => return Ok(Vec::new()),
    };

    let mut rows = Vec::new();
    for sheet_row in sheet_rows {
        let mut row = Row::new();
        for (name, cell) in headers.iter().zip(sheet_row.iter()) {
            if name.is_empty() {
                continue;
            }
            let value = match cell {
                Data::Empty => continue,
                Data::Int(i) => FieldValue::Number(*i as f64),
                Data::Float(f) => FieldValue::Number(*f),
                Data::Bool(b) => FieldValue::Bool(*b),
                Data::String(s) => FieldValue::Text(s.clone()),
                other => FieldValue::Text(other.to_string()),
            };
            row.insert(name.clone(), value);
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Reads rows from an uploaded buffer, picking the parser from `file_name`
pub fn rows_from_bytes(file_name: &str, data: &[u8]) -> Result<Vec<Row>, LoadError> {
    match FileFormat::from_name(file_name)? {
        FileFormat::Csv => rows_from_csv(data),
        FileFormat::Excel => rows_from_excel(data),
    }
}

/// Detects file type and loads rows from disk
///
/// # Examples
/// ```no_run
/// use govgraph::loader::load_rows;
///
/// match load_rows("literacy.csv") {
///     Ok(rows) => println!("Loaded {} rows", rows.len()),
///     Err(e) => eprintln!("Error loading file: {}", e),
/// }
/// ```
pub fn load_rows(filepath: impl AsRef<Path>) -> Result<Vec<Row>, LoadError> {
    let path = filepath.as_ref();
    let format = FileFormat::from_name(path)?;
    let data = fs::read(path)?;
    match format {
        FileFormat::Csv => rows_from_csv(&data),
        FileFormat::Excel => rows_from_excel(&data),
    }
}

/// Extracts rows from a JSON API response
///
/// A top-level array is used as-is; otherwise a `records` or `data` array is
/// looked up, and failing that the object itself becomes the single row.
/// Elements that are not objects are skipped.
pub fn rows_from_json(payload: &Value) -> Vec<Row> {
    let items: Vec<&Value> = match payload {
        Value::Array(items) => items.iter().collect(),
        Value::Object(object) => match (object.get("records"), object.get("data")) {
            (Some(Value::Array(items)), _) | (_, Some(Value::Array(items))) => {
                items.iter().collect()
            }
            _ => vec![payload],
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(Value::as_object)
        .map(Row::from_json_object)
        .collect()
}
