//! Writing rendered reports to disk.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use decor_core::DomainError;
use decor_inventory::{InventoryRecord, SortMode, report};

use crate::lifecycle::LifecycleResult;
use crate::store::StoreError;

/// Render the report for `records` and save it as `<dir>/inventory_report_YYYYMMDD.txt`.
///
/// An existing report for the same day is overwritten. Returns the written path.
pub fn export_report(
    dir: &Path,
    records: &[InventoryRecord],
    mode: SortMode,
    date: NaiveDate,
) -> LifecycleResult<PathBuf> {
    if records.is_empty() {
        return Err(DomainError::not_found("No items to generate report for!").into());
    }

    std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
    let path = dir.join(report::report_file_name(date));

    let mut file = std::fs::File::create(&path).map_err(|e| StoreError::io(&path, e))?;
    writeln!(file, "{}", report::render_report(records, mode)).map_err(|e| StoreError::io(&path, e))?;
    file.sync_all().map_err(|e| StoreError::io(&path, e))?;

    info!(path = %path.display(), mode = ?mode, rows = records.len(), "report saved");
    Ok(path)
}
