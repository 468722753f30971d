//! RecordStore: in-memory record table mirrored to a flat text file
//!
//! - Load: one `Record` per line, blank lines ignored
//! - Save: full rewrite in sequence order, never append
//! - Mutations persist once per call, and only when something changed

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::config::{MalformedLinePolicy, StoreConfig};
use crate::error::{ParseError, Result, ResultExt, StoreError};
use crate::record::Record;

/// Selects records. `None` in a query position means "every record".
pub type Predicate<'a> = &'a dyn Fn(&Record) -> bool;

/// Summary of the store contents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    pub records: usize,
    pub total_balance: f64,
    pub cities: usize,
    pub path: PathBuf,
}

impl StoreStats {
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl fmt::Display for StoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records in {} cities, total balance {:.2} ({})",
            self.records,
            self.cities,
            self.total_balance,
            self.path.display()
        )
    }
}

/// Ordered record table backed by a comma-separated file
#[derive(Debug)]
pub struct RecordStore {
    config: StoreConfig,
    records: Vec<Record>,
}

impl RecordStore {
    /// Opens the store at `path` with default settings, loading any existing file.
    ///
    /// A missing file is not an error: the store starts empty and the file is
    /// created on the first mutation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(StoreConfig::new().with_path(path.as_ref()))
    }

    /// Opens the store described by `config`, loading any existing file.
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        let mut store = Self {
            config,
            records: Vec::new(),
        };
        let loaded = store.load()?;
        tracing::info!(
            path = %store.config.path.display(),
            records = loaded,
            "Record store opened"
        );
        Ok(store)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Replaces the in-memory table with the backing file contents.
    ///
    /// Returns the number of records loaded. Under [`MalformedLinePolicy::Abort`]
    /// a bad line fails the call and the current table is left as it was.
    pub fn load(&mut self) -> Result<usize> {
        let path = &self.config.path;
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No backing file, starting empty");
                self.records.clear();
                return Ok(0);
            }
            Err(e) => {
                return Err(StoreError::from(e).context(format!("Opening '{}'", path.display())))
            }
        };

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (idx, raw) in BufReader::new(file).split(b'\n').enumerate() {
            let raw = raw.with_context(|| format!("Reading '{}'", path.display()))?;
            let line_no = idx + 1;
            let parsed = match String::from_utf8(raw) {
                Ok(line) => {
                    let line = line.strip_suffix('\r').unwrap_or(line.as_str());
                    if line.trim().is_empty() {
                        continue;
                    }
                    Record::parse_line(line_no, line)
                }
                Err(_) => Err(ParseError::InvalidUtf8 { line: line_no }),
            };

            match parsed {
                Ok(record) => records.push(record),
                Err(e) => match self.config.on_malformed {
                    MalformedLinePolicy::Abort => {
                        return Err(StoreError::from(e)
                            .context(format!("Loading '{}'", path.display())));
                    }
                    MalformedLinePolicy::Skip => {
                        tracing::warn!(path = %path.display(), error = %e, "Skipping malformed line");
                        skipped += 1;
                    }
                },
            }
        }

        tracing::debug!(
            path = %path.display(),
            records = records.len(),
            skipped,
            "Loaded backing file"
        );
        self.records = records;
        Ok(self.records.len())
    }

    /// Rewrites the backing file from the in-memory table.
    pub fn save(&self) -> Result<()> {
        let path = &self.config.path;
        if self.config.create_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Creating directory '{}'", parent.display()))?;
            }
        }

        let file = File::create(path).with_context(|| format!("Creating '{}'", path.display()))?;
        let mut writer = BufWriter::new(file);
        for record in &self.records {
            if record.has_delimiter() {
                tracing::warn!(
                    name = %record.name,
                    city = %record.city,
                    "Record contains the field delimiter and will not reload cleanly"
                );
            }
            writeln!(writer, "{}", record.to_line())
                .with_context(|| format!("Writing '{}'", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("Flushing '{}'", path.display()))?;

        tracing::debug!(path = %path.display(), records = self.records.len(), "Saved backing file");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Appends a record and persists.
    pub fn insert(&mut self, record: Record) -> Result<()> {
        self.records.push(record);
        self.save()
    }

    /// Appends every record and persists once. Returns how many were added.
    pub fn insert_many(&mut self, records: impl IntoIterator<Item = Record>) -> Result<usize> {
        let before = self.records.len();
        self.records.extend(records);
        let added = self.records.len() - before;
        if added > 0 {
            self.save()?;
        }
        Ok(added)
    }

    /// Applies `transform` to every record matching `predicate`.
    ///
    /// Persists once if anything matched; otherwise the file is not touched.
    /// Returns the number of records modified.
    pub fn update<P, T>(&mut self, predicate: P, mut transform: T) -> Result<usize>
    where
        P: Fn(&Record) -> bool,
        T: FnMut(&mut Record),
    {
        let mut modified = 0usize;
        for record in self.records.iter_mut() {
            if predicate(record) {
                transform(record);
                modified += 1;
            }
        }

        tracing::debug!(modified, "Update applied");
        if modified > 0 {
            self.save()?;
        }
        Ok(modified)
    }

    /// Removes every record matching `predicate`.
    ///
    /// Persists once if anything was removed. Returns the number removed.
    pub fn delete<P>(&mut self, predicate: P) -> Result<usize>
    where
        P: Fn(&Record) -> bool,
    {
        let before = self.records.len();
        self.records.retain(|r| !predicate(r));
        let removed = before - self.records.len();

        tracing::debug!(removed, "Delete applied");
        if removed > 0 {
            self.save()?;
        }
        Ok(removed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Records matching `predicate` (all of them for `None`), in store order.
    pub fn find(&self, predicate: Option<Predicate<'_>>) -> Vec<Record> {
        self.find_map(predicate, Record::clone)
    }

    /// Like [`find`](Self::find), mapping each match through `transform`.
    pub fn find_map<R, T>(&self, predicate: Option<Predicate<'_>>, transform: T) -> Vec<R>
    where
        T: FnMut(&Record) -> R,
    {
        let matches: Vec<R> = self
            .records
            .iter()
            .filter(|r| predicate.map_or(true, |p| p(r)))
            .map(transform)
            .collect();
        tracing::debug!(matched = matches.len(), total = self.records.len(), "Find");
        matches
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            records: self.records.len(),
            total_balance: self.records.iter().map(|r| r.balance).sum(),
            cities: self
                .records
                .iter()
                .map(|r| r.city.as_str())
                .collect::<BTreeSet<_>>()
                .len(),
            path: self.config.path.clone(),
        }
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
