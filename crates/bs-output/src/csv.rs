//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `bus_snapshots.csv`
//! - `tick_summaries.csv`
//! - `stop_visits.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{BusSnapshotRow, OutputResult, StopVisitRow, TickSummaryRow};

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    summaries: Writer<File>,
    visits:    Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut snapshots = Writer::from_path(dir.join("bus_snapshots.csv"))?;
        snapshots.write_record(["bus_id", "tick", "time_secs", "status", "position", "velocity", "occupancy"])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record([
            "tick", "time_secs", "traffic_speed",
            "inactive", "moving", "dwelling", "finished",
            "boardings", "alightings", "stop_visits",
        ])?;

        let mut visits = Writer::from_path(dir.join("stop_visits.csv"))?;
        visits.write_record(["stop_id", "visit", "time_secs", "headway_secs"])?;

        Ok(Self {
            snapshots,
            summaries,
            visits,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[BusSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.bus_id.to_string(),
                row.tick.to_string(),
                row.time_secs.to_string(),
                row.status.to_string(),
                row.position.to_string(),
                row.velocity.to_string(),
                row.occupancy.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.time_secs.to_string(),
            row.traffic_speed.to_string(),
            row.inactive.to_string(),
            row.moving.to_string(),
            row.dwelling.to_string(),
            row.finished.to_string(),
            row.boardings.to_string(),
            row.alightings.to_string(),
            row.stop_visits.to_string(),
        ])?;
        Ok(())
    }

    fn write_stop_visits(&mut self, rows: &[StopVisitRow]) -> OutputResult<()> {
        for row in rows {
            // Empty field for the first visit's missing headway.
            self.visits.write_record(&[
                row.stop_id.to_string(),
                row.visit.to_string(),
                row.time_secs.to_string(),
                row.headway_secs.map(|h| h.to_string()).unwrap_or_default(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        self.visits.flush()?;
        Ok(())
    }
}
