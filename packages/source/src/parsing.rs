//! CSV decoding shared by network pages and local snapshots.
//!
//! Both the portal's CSV responses and snapshot files carry a header row
//! followed by data rows. Headers are matched against [`IncidentColumn`]
//! names; unknown headers are ignored.

use std::io::Read;
use std::str::FromStr as _;

use crime_dash_incident_models::{IncidentColumn, IncidentRecord, IncidentTable};

use crate::SourceError;

/// Decodes a CSV stream into an [`IncidentTable`].
///
/// The table's schema is the set of recognized headers, in header order.
/// Cells are coerced best-effort (see [`IncidentRecord::set_cell`]).
///
/// # Errors
///
/// * [`SourceError::SchemaMismatch`] if any of `required` is not a header.
/// * [`SourceError::Csv`] if the stream is not valid CSV.
pub fn decode_csv<R: Read>(
    reader: R,
    required: &[IncidentColumn],
    origin: &str,
) -> Result<IncidentTable, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let header_columns: Vec<Option<IncidentColumn>> = reader
        .headers()?
        .iter()
        .map(|h| IncidentColumn::from_str(h.trim()).ok())
        .collect();

    let mut table = IncidentTable::new(header_columns.iter().flatten().copied().collect());

    let missing = table.missing_columns(required);
    if !missing.is_empty() {
        return Err(SourceError::SchemaMismatch {
            origin: origin.to_string(),
            missing,
        });
    }

    for result in reader.records() {
        let row = result?;
        let mut record = IncidentRecord::default();
        for (column, cell) in header_columns.iter().zip(row.iter()) {
            if let Some(column) = column {
                record.set_cell(*column, cell);
            }
        }
        table.rows.push(record);
    }

    log::debug!("Decoded {} rows from {origin}", table.len());

    Ok(table)
}

/// Encodes a table as CSV using the table's own column order.
///
/// # Errors
///
/// Returns [`SourceError`] if writing to `writer` fails.
pub fn encode_csv<W: std::io::Write>(writer: W, table: &IncidentTable) -> Result<(), SourceError> {
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(table.columns.iter().map(AsRef::<str>::as_ref))?;
    for record in table {
        writer.write_record(table.columns.iter().map(|c| record.cell(*c)))?;
    }
    writer.flush()?;

    Ok(())
}
