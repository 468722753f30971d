//! flatstore core - a filtered record store over a flat text file
//!
//! Records are kept in memory in insertion order and mirrored to a
//! comma-separated file after every change. Queries, updates and deletes are
//! driven by caller-supplied closures.
//!
//! # Quick Start
//!
//! ```
//! use flatstore_core::{Record, RecordStore};
//!
//! # fn main() -> flatstore_core::Result<()> {
//! let dir = tempfile::tempdir()?;
//! let mut store = RecordStore::open(dir.path().join("BD.txt"))?;
//!
//! store.insert(Record::new("Ana", 45, "Madrid", 1500.0))?;
//! store.insert(Record::new("Luis", 28, "Valencia", 700.0))?;
//!
//! let rich = store.find(Some(&|r: &Record| r.balance > 1000.0));
//! assert_eq!(rich.len(), 1);
//!
//! store.update(|r| r.city == "Madrid", |r| r.balance += 200.0)?;
//! store.delete(|r| r.name == "Luis")?;
//!
//! let all = store.find(None);
//! assert_eq!(all, vec![Record::new("Ana", 45, "Madrid", 1700.0)]);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - `record`: the row type and its line codec
//! - `storage`: [`RecordStore`], the file-backed table
//! - `config`: [`StoreConfig`] and the malformed-line policy
//! - `error`: [`StoreError`] and the crate [`Result`]

#![deny(unsafe_code)]
#![warn(rust_2018_idioms, missing_debug_implementations, clippy::all)]

pub mod config;
pub mod error;
pub mod record;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::{MalformedLinePolicy, StoreConfig};
pub use error::{ParseError, Result, ResultExt, StoreError};
pub use record::Record;
pub use storage::{Predicate, RecordStore, StoreStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
