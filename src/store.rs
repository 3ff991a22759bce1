//! CSV tables, one directory per board.
//!
//! Listing dumps are rewritten on every run; the content table only ever grows.
//! Files start with a UTF-8 byte-order mark so spreadsheet tools pick the right
//! encoding; readers accept files with or without it.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing::warn;

use crate::records::{ContentRecord, ListingRecord, CONTENT_COLUMNS, LISTING_COLUMNS};

const BOM: &[u8] = b"\xEF\xBB\xBF";

pub struct Store {
    dir: PathBuf,
    board: String,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>, board: &str) -> Self {
        Self {
            dir: dir.into(),
            board: board.to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn raw_path(&self) -> PathBuf {
        self.dir.join(format!("{}_raw.csv", self.board))
    }

    pub fn filtered_path(&self, threshold: i64) -> PathBuf {
        self.dir.join(format!("{}_above_{}_rec.csv", self.board, threshold))
    }

    pub fn content_path(&self) -> PathBuf {
        self.dir.join(format!("{}_content.csv", self.board))
    }

    /// Row counts of the three tables; `None` when a table does not exist yet.
    pub fn stats(&self, threshold: i64) -> Result<TableStats> {
        Ok(TableStats {
            raw: count_rows(&self.raw_path())?,
            filtered: count_rows(&self.filtered_path(threshold))?,
            content: count_rows(&self.content_path())?,
        })
    }
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct TableStats {
    pub raw: Option<usize>,
    pub filtered: Option<usize>,
    pub content: Option<usize>,
}

// ── Writing ──

/// Replace `path` with a header plus one row per listing.
pub fn write_listings(path: &Path, listings: &[ListingRecord]) -> Result<()> {
    ensure_parent(path)?;
    let mut file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(BOM)?;

    let mut w = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    w.write_record(LISTING_COLUMNS)?;
    for l in listings {
        w.write_record(l.to_row())?;
    }
    w.flush()?;
    Ok(())
}

/// Append one row, writing the header first if the file is new or empty.
pub fn append_row<I, T>(path: &Path, header: &[&str], row: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    ensure_parent(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let is_new = file.metadata()?.len() == 0;
    if is_new {
        file.write_all(BOM)?;
    }

    let mut w = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    if is_new {
        w.write_record(header)?;
    }
    w.write_record(row)?;
    w.flush()?;
    Ok(())
}

pub fn append_content(path: &Path, record: &ContentRecord) -> Result<()> {
    append_row(path, &CONTENT_COLUMNS, record.to_row())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

// ── Reading ──

fn open_reader(path: &Path) -> Result<csv::Reader<Cursor<Vec<u8>>>> {
    let mut bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if bytes.starts_with(BOM) {
        bytes.drain(..BOM.len());
    }
    // Rows cut short by an interrupted append still parse.
    Ok(csv::ReaderBuilder::new().flexible(true).from_reader(Cursor::new(bytes)))
}

pub fn read_listings(path: &Path) -> Result<Vec<ListingRecord>> {
    let mut rdr = open_reader(path)?;
    let rows = rdr
        .deserialize()
        .collect::<Result<Vec<ListingRecord>, _>>()
        .with_context(|| format!("Malformed listing table {}", path.display()))?;
    Ok(rows)
}

/// Every non-empty `link` value in a table. A missing file is an empty set.
/// Rows that are short or unreadable are skipped with a warning; the rest
/// still count.
pub fn read_links(path: &Path) -> Result<HashSet<String>> {
    if !path.exists() {
        return Ok(HashSet::new());
    }
    let mut rdr = open_reader(path)?;
    let idx = rdr
        .headers()?
        .iter()
        .position(|h| h == "link")
        .ok_or_else(|| anyhow!("No link column in {}", path.display()))?;

    let mut links = HashSet::new();
    for (n, record) in rdr.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping row {} of {}: {}", n + 1, path.display(), e);
                continue;
            }
        };
        match record.get(idx) {
            Some(link) if !link.is_empty() => {
                links.insert(link.to_string());
            }
            Some(_) => {}
            None => warn!("Row {} of {} has no link field", n + 1, path.display()),
        }
    }
    Ok(links)
}

/// Data rows in a table, short rows included. `None` when the file is missing.
pub fn count_rows(path: &Path) -> Result<Option<usize>> {
    if !path.exists() {
        return Ok(None);
    }
    let mut rdr = open_reader(path)?;
    let n = rdr.records().filter(Result::is_ok).count();
    Ok(Some(n))
}
