//! Turns loosely typed rows into a chart-ready series
//!
//! The heuristic looks only at the first row to decide which field names the
//! categories (the label field) and which one holds the measurements (the
//! value field), then reads those two fields from every row.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::chart::{ChartKind, ChartSeries, Colors, Dataset};
use crate::error::{ConfigError, InferenceError};
use crate::record::Row;

/// Per-category colors for pie and doughnut charts
pub const CATEGORY_PALETTE: [&str; 8] = [
    "rgba(59, 130, 246, 0.8)",
    "rgba(16, 185, 129, 0.8)",
    "rgba(245, 158, 11, 0.8)",
    "rgba(239, 68, 68, 0.8)",
    "rgba(139, 92, 246, 0.8)",
    "rgba(236, 72, 153, 0.8)",
    "rgba(34, 197, 94, 0.8)",
    "rgba(156, 163, 175, 0.8)",
];

pub const SERIES_COLOR: &str = "rgba(59, 130, 246, 0.8)";
pub const SERIES_BORDER: &str = "rgba(59, 130, 246, 1)";
pub const LINE_TENSION: f64 = 0.4;

/// How label and value sequences are paired once filtered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignmentPolicy {
    /// Filter labels and values independently, then truncate both to the
    /// shorter length. A gap in one column shifts the pairing of every
    /// later row.
    #[default]
    Positional,
    /// Drop a row when either its label or its value is unusable, keeping
    /// every emitted pair from the same row.
    RowKeyed,
}

impl FromStr for AlignmentPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "positional" => Ok(AlignmentPolicy::Positional),
            "row-keyed" | "row_keyed" => Ok(AlignmentPolicy::RowKeyed),
            other => Err(ConfigError::InvalidValue {
                key: "GOVGRAPH_ALIGNMENT",
                value: other.to_string(),
            }),
        }
    }
}

/// The pair of fields chosen from the first row
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnChoice {
    pub label_field: String,
    pub value_field: String,
}

/// Result of a successful inference
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Preview {
    #[serde(flatten)]
    pub columns: ColumnChoice,
    #[serde(rename = "data")]
    pub series: ChartSeries,
}

/// Picks the label and value fields from the first row's key order
///
/// Returns `None` for an empty row set or a first row without fields.
pub fn choose_columns(rows: &[Row]) -> Option<ColumnChoice> {
    let first = rows.first()?;
    let keys: Vec<&str> = first.keys().collect();
    let head = *keys.first()?;

    let label_field = first
        .iter()
        .find(|(_, v)| v.is_categorical_text())
        .map(|(k, _)| k)
        .unwrap_or(head);

    let value_field = first
        .iter()
        .find(|(_, v)| v.parse_number().is_some())
        .map(|(k, _)| k)
        .or_else(|| keys.get(1).copied())
        .unwrap_or(head);

    Some(ColumnChoice {
        label_field: label_field.to_string(),
        value_field: value_field.to_string(),
    })
}

/// Infers a single-dataset series from `rows`, styled for `kind`
///
/// # Errors
/// * `InferenceError::NoData` if there are no rows or the first row is empty
///
/// # Examples
/// ```
/// use govgraph::chart::ChartKind;
/// use govgraph::inference::{infer_series, AlignmentPolicy};
/// use govgraph::record::Row;
///
/// let rows = vec![
///     Row::new().with("state", "Kerala").with("rate", 93.91),
///     Row::new().with("state", "Punjab").with("rate", 76.68),
/// ];
/// let preview = infer_series(&rows, ChartKind::Bar, AlignmentPolicy::Positional).unwrap();
/// assert_eq!(preview.series.labels, vec!["Kerala", "Punjab"]);
/// assert_eq!(preview.series.datasets[0].data, vec![93.91, 76.68]);
/// ```
pub fn infer_series(
    rows: &[Row],
    kind: ChartKind,
    policy: AlignmentPolicy,
) -> Result<Preview, InferenceError> {
    let columns = choose_columns(rows).ok_or(InferenceError::NoData)?;

    let label_at = |row: &Row| {
        row.get(&columns.label_field)
            .map(|v| v.to_label())
            .unwrap_or_default()
    };
    let value_at = |row: &Row| {
        row.get(&columns.value_field)
            .map(|v| v.to_number())
            .unwrap_or(0.0)
    };

    let (labels, values) = match policy {
        AlignmentPolicy::Positional => {
            let mut labels: Vec<String> = rows
                .iter()
                .map(label_at)
                .filter(|l| !l.is_empty())
                .collect();
            let mut values: Vec<f64> = rows
                .iter()
                .map(value_at)
                .filter(|v| v.is_finite())
                .collect();
            let len = labels.len().min(values.len());
            labels.truncate(len);
            values.truncate(len);
            (labels, values)
        }
        AlignmentPolicy::RowKeyed => rows
            .iter()
            .map(|row| (label_at(row), value_at(row)))
            .filter(|(l, v)| !l.is_empty() && v.is_finite())
            .unzip(),
    };

    let dataset_label = if columns.value_field.is_empty() {
        "Value".to_string()
    } else {
        columns.value_field.clone()
    };

    log::debug!(
        "inferred {} points from {} rows (label={}, value={})",
        labels.len(),
        rows.len(),
        columns.label_field,
        columns.value_field
    );

    Ok(Preview {
        columns,
        series: ChartSeries {
            labels,
            datasets: vec![style_dataset(Dataset::new(dataset_label, values), kind)],
        },
    })
}

/// Applies the fixed styling for a chart kind
pub fn style_dataset(mut dataset: Dataset, kind: ChartKind) -> Dataset {
    dataset.background_color = Some(if kind.is_radial() {
        Colors::from(&CATEGORY_PALETTE[..])
    } else {
        Colors::from(SERIES_COLOR)
    });
    dataset.border_color = Some(Colors::from(SERIES_BORDER));
    dataset.border_width = Some(1.0);
    if kind == ChartKind::Line {
        dataset.fill = Some(false);
        dataset.tension = Some(LINE_TENSION);
    }
    dataset
}
