//! Spreadsheet ingestion: workbook bytes in, validated catalog out.
//!
//! Only the first sheet is consulted. Row 0 is data, not a header - callers
//! are responsible for telling users to supply headerless files. Rows with a
//! blank code or description are dropped without any per-row reporting;
//! ingestion is all-or-nothing at the catalog level.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use tracing::{debug, info, warn};

use super::{Catalog, PartRecord};
use crate::config::IngestConfig;
use crate::error::{Result, ScoutError};

/// Decode spreadsheet bytes into a validated catalog.
///
/// Fails with [`ScoutError::CorruptFile`] when the bytes are not a workbook
/// at all, and with [`ScoutError::EmptyCatalog`] when the workbook has no
/// sheet, the sheet cannot be decoded, or zero rows survive filtering.
pub fn ingest_workbook(bytes: &[u8]) -> Result<Catalog> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| ScoutError::CorruptFile {
            message: e.to_string(),
        })?;

    let range = workbook
        .worksheet_range_at(IngestConfig::SHEET_INDEX)
        .ok_or(ScoutError::EmptyCatalog)?
        .map_err(|e| {
            warn!("First sheet failed to decode: {}", e);
            ScoutError::EmptyCatalog
        })?;

    debug!("Decoded first sheet with {} rows", range.height());
    let catalog = collect_records(range.rows())?;
    info!("Catalog ingested: {} parts", catalog.len());
    Ok(catalog)
}

/// Read a workbook file and ingest it, off the async executor.
///
/// The decode runs on the blocking pool; workbook parsing is CPU-bound and
/// must not stall other session activity.
pub async fn ingest_file(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ScoutError::io_with_path(e, path))?;

    tokio::task::spawn_blocking(move || ingest_workbook(&bytes))
        .await
        .map_err(|e| ScoutError::CorruptFile {
            message: format!("Workbook decode task failed: {e}"),
        })?
}

/// Filter raw rows into records: column A is the code, column B the
/// description, both coerced to trimmed text. Accepted rows keep their
/// source order.
fn collect_records<'a, I>(rows: I) -> Result<Catalog>
where
    I: IntoIterator<Item = &'a [Data]>,
{
    let mut records = Vec::new();
    for row in rows {
        let code = cell_text(row.get(IngestConfig::CODE_COLUMN));
        let description = cell_text(row.get(IngestConfig::DESCRIPTION_COLUMN));
        match PartRecord::from_cells(&code, &description) {
            Some(record) => records.push(record),
            // Invalid rows are dropped silently; only a fully empty result
            // is an error.
            None => continue,
        }
    }

    if records.is_empty() {
        return Err(ScoutError::EmptyCatalog);
    }
    Ok(Catalog::from_records(records))
}

/// Coerce a cell to text. Numeric cells render the way a user would type
/// them (integral floats without a trailing `.0`).
fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
