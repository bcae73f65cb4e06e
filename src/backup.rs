use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::chart::ChartDefinition;
use crate::error::BackupError;

/// Writes `charts` as gzip-compressed JSON into `writer`
pub fn write_backup<W: Write>(charts: &[ChartDefinition], writer: W) -> Result<(), BackupError> {
    let mut encoder = GzEncoder::new(writer, Compression::default());
    serde_json::to_writer(&mut encoder, charts)?;
    encoder.finish()?;
    Ok(())
}

/// Reads a backup written by [`write_backup`]
///
/// Every chart is validated; the first invalid one fails the whole import.
pub fn read_backup<R: Read>(reader: R) -> Result<Vec<ChartDefinition>, BackupError> {
    let decoder = GzDecoder::new(reader);
    let charts: Vec<ChartDefinition> = serde_json::from_reader(BufReader::new(decoder))?;

    for chart in &charts {
        chart
            .validate()
            .map_err(|source| BackupError::InvalidChart {
                id: chart.id.clone(),
                source,
            })?;
    }

    Ok(charts)
}

/// Serializes `charts` into an in-memory backup
pub fn backup_to_bytes(charts: &[ChartDefinition]) -> Result<Vec<u8>, BackupError> {
    let mut buffer = Vec::new();
    write_backup(charts, &mut buffer)?;
    Ok(buffer)
}

pub fn backup_from_bytes(buffer: &[u8]) -> Result<Vec<ChartDefinition>, BackupError> {
    read_backup(buffer)
}

pub fn save_backup(charts: &[ChartDefinition], filename: impl AsRef<Path>) -> Result<(), BackupError> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);
    write_backup(charts, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn load_backup(filename: impl AsRef<Path>) -> Result<Vec<ChartDefinition>, BackupError> {
    let file = File::open(filename)?;
    read_backup(BufReader::new(file))
}
