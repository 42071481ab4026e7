//! Flat-file CSV store.
//!
//! One record per line, five unquoted columns, no header:
//!
//! ```text
//! name,quantity,itemNumber,itemType,creationDate
//! Gold Vase,5,150,Vases,2024-06-15
//! ```
//!
//! Lines with any other column count are skipped. A five-column line whose quantity,
//! item number, type or date does not parse fails the whole read with
//! [`StoreError::Corrupt`]. Names are written verbatim, so a name containing a comma
//! produces a line that later reads back as six columns and is skipped.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tracing::debug;

use decor_core::ItemNumber;
use decor_inventory::{InventoryRecord, ItemType};

use super::{RecordStore, StoreError};

/// Columns per stored record.
pub const COLUMNS: usize = 5;

/// Date format of the `creationDate` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct CsvRecordStore {
    path: PathBuf,
}

impl CsvRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(&self) -> Result<(), StoreError> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))
            }
            _ => Ok(()),
        }
    }

    fn write_with(&self, file: File, records: &[InventoryRecord]) -> Result<(), StoreError> {
        let file = write_records(file, records).map_err(|e| StoreError::io(&self.path, e))?;
        file.sync_all().map_err(|e| StoreError::io(&self.path, e))
    }
}

impl RecordStore for CsvRecordStore {
    fn load(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        read_records(file, &self.path)
    }

    fn rewrite(&self, records: &[InventoryRecord]) -> Result<(), StoreError> {
        self.ensure_parent()?;
        let file = File::create(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        self.write_with(file, records)
    }

    fn append(&self, record: &InventoryRecord) -> Result<(), StoreError> {
        self.ensure_parent()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;
        self.write_with(file, std::slice::from_ref(record))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn line_terminator() -> Terminator {
    if cfg!(windows) {
        Terminator::CRLF
    } else {
        Terminator::Any(b'\n')
    }
}

/// Encode `records` one per line and hand the writer back once flushed.
pub fn write_records<W: Write>(out: W, records: &[InventoryRecord]) -> io::Result<W> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quote_style(QuoteStyle::Never)
        .terminator(line_terminator())
        .from_writer(out);

    for record in records {
        writer.write_record(encode(record))?;
    }
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error())
}

/// Decode every well-shaped line of `input`. `path` only labels errors.
pub fn read_records<R: Read>(input: R, path: &Path) -> Result<Vec<InventoryRecord>, StoreError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(input);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| map_csv_error(path, e))?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let columns = significant_columns(&row);
        if columns != COLUMNS {
            debug!(path = %path.display(), line, columns, "skipping malformed line");
            continue;
        }
        let record = decode(&row).map_err(|reason| StoreError::Corrupt {
            path: path.to_path_buf(),
            line,
            reason,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Column count with trailing empty fields dropped, so `a,b,c,d,e,` still has five.
fn significant_columns(row: &StringRecord) -> usize {
    row.as_byte_record().iter().rposition(|field| !field.is_empty()).map_or(0, |last| last + 1)
}

/// Strict `YYYY-MM-DD`; chrono alone would also take unpadded months and days.
fn parse_date(text: &str) -> Result<NaiveDate, String> {
    let bytes = text.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(format!("invalid creation date '{text}': expected YYYY-MM-DD"));
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| format!("invalid creation date '{text}': {e}"))
}

fn map_csv_error(path: &Path, err: csv::Error) -> StoreError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => StoreError::io(path, source),
        _ => StoreError::Corrupt {
            path: path.to_path_buf(),
            line,
            reason,
        },
    }
}

fn encode(record: &InventoryRecord) -> [String; COLUMNS] {
    [
        record.name().to_string(),
        record.quantity().to_string(),
        record.item_number().to_string(),
        record.item_type().as_str().to_string(),
        record.creation_date().format(DATE_FORMAT).to_string(),
    ]
}

fn decode(row: &StringRecord) -> Result<InventoryRecord, String> {
    let name = &row[0];
    let quantity = row[1]
        .parse::<i64>()
        .map_err(|e| format!("invalid quantity '{}': {e}", &row[1]))?;
    let item_number = row[2]
        .parse::<u32>()
        .map(ItemNumber::new)
        .map_err(|e| format!("invalid item number '{}': {e}", &row[2]))?;
    let item_type = ItemType::ALL
        .into_iter()
        .find(|t| t.as_str() == &row[3])
        .ok_or_else(|| format!("unknown item type '{}'", &row[3]))?;
    let creation_date = parse_date(&row[4])?;

    Ok(InventoryRecord::new(
        name,
        quantity,
        item_number,
        item_type,
        creation_date,
    ))
}
