use chrono::Utc;
use govgraph::backup::{backup_from_bytes, backup_to_bytes, load_backup, save_backup};
use govgraph::chart::{ChartDefinition, ChartKind, ChartSeries, Dataset, Sector};
use govgraph::error::{BackupError, ValidationError};
use govgraph::providers::canned_charts;
use std::io::Write;

fn charts() -> Vec<ChartDefinition> {
    canned_charts(Sector::Agriculture, Utc::now())
}

#[test]
fn backup_preserves_charts() {
    let original = charts();
    let buffer = backup_to_bytes(&original).unwrap();
    // gzip magic
    assert_eq!(&buffer[..2], &[0x1f, 0x8b]);
    assert_eq!(backup_from_bytes(&buffer).unwrap(), original);
}

#[test]
fn backup_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("charts.json.gz");

    let original = charts();
    save_backup(&original, &path).unwrap();
    assert_eq!(load_backup(&path).unwrap(), original);

    assert!(matches!(
        load_backup(dir.path().join("missing.json.gz")),
        Err(BackupError::Io(_))
    ));
}

#[test]
fn invalid_chart_fails_import() {
    let broken = ChartDefinition {
        id: "custom-1".to_string(),
        title: "Broken".to_string(),
        description: String::new(),
        source: String::new(),
        sector: Sector::Budget,
        kind: ChartKind::Line,
        series: ChartSeries {
            labels: vec!["a".to_string(), "b".to_string()],
            datasets: vec![Dataset::new("v", vec![1.0])],
        },
        last_updated: Utc::now(),
    };
    let buffer = backup_to_bytes(&[broken]).unwrap();

    match backup_from_bytes(&buffer) {
        Err(BackupError::InvalidChart { id, source }) => {
            assert_eq!(id, "custom-1");
            assert!(matches!(source, ValidationError::MisalignedSeries { .. }));
        }
        other => panic!("expected invalid chart, got {:?}", other),
    }
}

#[test]
fn garbage_is_not_a_backup() {
    assert!(backup_from_bytes(b"plain text").is_err());

    let mut encoder =
        flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(br#"{"not":"a list"}"#).unwrap();
    let buffer = encoder.finish().unwrap();
    assert!(matches!(
        backup_from_bytes(&buffer),
        Err(BackupError::Decode(_))
    ));
}
