//! Persistent storage layer
//!
//! The store keeps every record in memory and mirrors the table to a plain
//! text file, one comma-separated record per line:
//!
//! ```text
//! ┌──────────────────────────────┐        save()        ┌──────────────────────┐
//! │         RecordStore          │ ───────────────────▶ │  Ana,45,Madrid,1500.0│
//! │  Vec<Record> (insert order)  │ ◀─────────────────── │  Luis,28,Valencia,...│
//! └──────────────────────────────┘     load() on open   └──────────────────────┘
//! ```
//!
//! There is no locking: two processes writing the same file can corrupt it.
//!
//! # Example
//!
//! ```no_run
//! use flatstore_core::{Record, RecordStore};
//!
//! # fn example() -> flatstore_core::Result<()> {
//! let mut store = RecordStore::open("clients.txt")?;
//! store.insert(Record::new("Ana", 45, "Madrid", 1500.0))?;
//! store.update(|r| r.city == "Madrid", |r| r.balance += 200.0)?;
//! let rich = store.find(Some(&|r: &Record| r.balance > 1000.0));
//! # Ok(())
//! # }
//! ```

pub mod record_store;

pub use record_store::{Predicate, RecordStore, StoreStats};
