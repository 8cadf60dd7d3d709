//! Local snapshot files.
//!
//! A snapshot is the same CSV shape the remote source returns (header row
//! plus data rows), saved to disk so that later loads can skip the network
//! entirely.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crime_dash_incident_models::{IncidentColumn, IncidentTable};

use crate::SourceError;
use crate::parsing::{decode_csv, encode_csv};

/// Reads a snapshot, requiring every column in `required`.
///
/// # Errors
///
/// * [`SourceError::Io`] if the file cannot be opened.
/// * [`SourceError::SchemaMismatch`] if a required column is absent.
/// * [`SourceError::Csv`] if the file is not valid CSV.
pub fn read_snapshot(path: &Path, required: &[IncidentColumn]) -> Result<IncidentTable, SourceError> {
    let file = File::open(path)?;
    let table = decode_csv(file, required, &path.display().to_string())?;
    log::info!("Read {} rows from snapshot {}", table.len(), path.display());
    Ok(table)
}

/// Writes `table` as a snapshot.
///
/// The file is written next to its final location and renamed into place,
/// so readers never observe a half-written snapshot.
///
/// # Errors
///
/// Returns [`SourceError`] if the directory cannot be created or the file
/// cannot be written.
pub fn write_snapshot(path: &Path, table: &IncidentTable) -> Result<(), SourceError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("csv.partial");
    {
        let writer = BufWriter::new(File::create(&tmp_path)?);
        encode_csv(writer, table)?;
    }
    std::fs::rename(&tmp_path, path)?;

    log::info!("Wrote {} rows to snapshot {}", table.len(), path.display());
    Ok(())
}
