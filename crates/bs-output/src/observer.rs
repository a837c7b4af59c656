//! `ModelOutputObserver<W>` — bridges `ModelObserver` to an `OutputWriter`.

use bs_agent::Corridor;
use bs_sim::{ModelObserver, Snapshot, TickSummary};

use crate::row::{BusSnapshotRow, StopVisitRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`ModelObserver`] that writes bus snapshots, tick summaries and the
/// final stop visit history to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `ModelObserver`
/// methods have no return value.  After `model.run()` returns, check for
/// errors with [`take_error`][Self::take_error].
pub struct ModelOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> ModelOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `model.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

/// One row per bus, in id order.
pub fn snapshot_rows(snapshot: &Snapshot<'_>) -> Vec<BusSnapshotRow> {
    snapshot
        .buses
        .iter()
        .map(|bus| BusSnapshotRow {
            bus_id:    bus.id.0,
            tick:      snapshot.tick.0,
            time_secs: snapshot.time_secs,
            status:    bus.status.code(),
            position:  bus.position,
            velocity:  bus.velocity,
            occupancy: bus.occupancy,
        })
        .collect()
}

/// Every recorded visit, grouped by stop in corridor order.
pub fn stop_visit_rows(corridor: &Corridor) -> Vec<StopVisitRow> {
    corridor
        .stops()
        .iter()
        .flat_map(|stop| {
            stop.arrival_times.iter().enumerate().map(move |(i, &time)| StopVisitRow {
                stop_id:      stop.id.0,
                visit:        i as u32,
                time_secs:    time,
                headway_secs: i.checked_sub(1).and_then(|prev| stop.headways.get(prev).copied()),
            })
        })
        .collect()
}

impl<W: OutputWriter> ModelObserver for ModelOutputObserver<W> {
    fn on_tick_end(&mut self, summary: &TickSummary) {
        let row = TickSummaryRow {
            tick:          summary.tick.0,
            time_secs:     summary.time_secs,
            traffic_speed: summary.traffic_speed,
            inactive:      summary.inactive as u32,
            moving:        summary.moving as u32,
            dwelling:      summary.dwelling as u32,
            finished:      summary.finished as u32,
            boardings:     summary.boardings,
            alightings:    summary.alightings,
            stop_visits:   summary.stop_visits as u32,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, snapshot: &Snapshot<'_>) {
        let rows = snapshot_rows(snapshot);
        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, final_state: &Snapshot<'_>) {
        let rows = stop_visit_rows(final_state.corridor);
        if !rows.is_empty() {
            let result = self.writer.write_stop_visits(&rows);
            self.store_err(result);
        }
        let result = self.writer.finish();
        self.store_err(result);
    }
}
