//! `bs-output` — simulation output writers for the bussim corridor simulator.
//!
//! Three backends are provided behind Cargo features:
//!
//! | Feature   | Backend     | Files created                                                        |
//! |-----------|-------------|----------------------------------------------------------------------|
//! | *(none)*  | CSV         | `bus_snapshots.csv`, `tick_summaries.csv`, `stop_visits.csv`         |
//! | `sqlite`  | SQLite      | `output.db`                                                          |
//! | `parquet` | Parquet     | `bus_snapshots.parquet`, `tick_summaries.parquet`, `stop_visits.parquet` |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`ModelOutputObserver`], which implements `bs_sim::ModelObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bs_output::{CsvWriter, ModelOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = ModelOutputObserver::new(writer);
//! model.run(&mut obs);
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::ModelOutputObserver;
pub use row::{BusSnapshotRow, StopVisitRow, TickSummaryRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetWriter;
