//! The `OutputWriter` trait implemented by all backend writers.

use crate::{BusSnapshotRow, OutputResult, StopVisitRow, TickSummaryRow};

/// Trait implemented by CSV, SQLite, and Parquet writers.
///
/// The observer driving a writer cannot return errors, so it stores the
/// first one for [`ModelOutputObserver::take_error`].
///
/// [`ModelOutputObserver::take_error`]: crate::ModelOutputObserver::take_error
pub trait OutputWriter {
    /// Write a batch of bus snapshots (one row per bus).
    fn write_snapshots(&mut self, rows: &[BusSnapshotRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Write the stop visit history, usually once at the end of a run.
    fn write_stop_visits(&mut self, rows: &[StopVisitRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
