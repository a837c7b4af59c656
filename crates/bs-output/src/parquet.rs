//! Parquet output backend (feature `parquet`).
//!
//! Creates three files in the configured output directory:
//! - `bus_snapshots.parquet`
//! - `tick_summaries.parquet`
//! - `stop_visits.parquet`

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Builder, UInt32Builder, UInt64Builder, UInt8Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{BusSnapshotRow, OutputResult, StopVisitRow, TickSummaryRow};

fn snapshot_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("bus_id",    DataType::UInt32,  false),
        Field::new("tick",      DataType::UInt64,  false),
        Field::new("time_secs", DataType::Float64, false),
        Field::new("status",    DataType::UInt8,   false),
        Field::new("position",  DataType::Float64, false),
        Field::new("velocity",  DataType::Float64, false),
        Field::new("occupancy", DataType::UInt32,  false),
    ]))
}

fn summary_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tick",          DataType::UInt64,  false),
        Field::new("time_secs",     DataType::Float64, false),
        Field::new("traffic_speed", DataType::Float64, false),
        Field::new("inactive",      DataType::UInt32,  false),
        Field::new("moving",        DataType::UInt32,  false),
        Field::new("dwelling",      DataType::UInt32,  false),
        Field::new("finished",      DataType::UInt32,  false),
        Field::new("boardings",     DataType::UInt64,  false),
        Field::new("alightings",    DataType::UInt64,  false),
        Field::new("stop_visits",   DataType::UInt32,  false),
    ]))
}

fn visit_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("stop_id",      DataType::UInt32,  false),
        Field::new("visit",        DataType::UInt32,  false),
        Field::new("time_secs",    DataType::Float64, false),
        Field::new("headway_secs", DataType::Float64, true),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

fn open(dir: &Path, name: &str, schema: &Arc<Schema>) -> OutputResult<ArrowWriter<File>> {
    let file = File::create(dir.join(name))?;
    Ok(ArrowWriter::try_new(file, Arc::clone(schema), Some(snappy_props()))?)
}

/// Writes simulation output to three Parquet files.
///
/// `finish()` **must** be called to write the Parquet file footers; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    snapshots:    Option<ArrowWriter<File>>,
    summaries:    Option<ArrowWriter<File>>,
    visits:       Option<ArrowWriter<File>>,
    snap_schema:  Arc<Schema>,
    summ_schema:  Arc<Schema>,
    visit_schema: Arc<Schema>,
}

impl ParquetWriter {
    /// Create the Parquet files in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let snap_schema = snapshot_schema();
        let summ_schema = summary_schema();
        let visit_schema = visit_schema();

        Ok(Self {
            snapshots: Some(open(dir, "bus_snapshots.parquet", &snap_schema)?),
            summaries: Some(open(dir, "tick_summaries.parquet", &summ_schema)?),
            visits:    Some(open(dir, "stop_visits.parquet", &visit_schema)?),
            snap_schema,
            summ_schema,
            visit_schema,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_snapshots(&mut self, rows: &[BusSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.snapshots.as_mut() else {
            return Ok(());
        };

        let mut bus_ids    = UInt32Builder::new();
        let mut ticks      = UInt64Builder::new();
        let mut times      = Float64Builder::new();
        let mut statuses   = UInt8Builder::new();
        let mut positions  = Float64Builder::new();
        let mut velocities = Float64Builder::new();
        let mut occupancy  = UInt32Builder::new();

        for row in rows {
            bus_ids.append_value(row.bus_id);
            ticks.append_value(row.tick);
            times.append_value(row.time_secs);
            statuses.append_value(row.status);
            positions.append_value(row.position);
            velocities.append_value(row.velocity);
            occupancy.append_value(row.occupancy);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.snap_schema),
            vec![
                Arc::new(bus_ids.finish()),
                Arc::new(ticks.finish()),
                Arc::new(times.finish()),
                Arc::new(statuses.finish()),
                Arc::new(positions.finish()),
                Arc::new(velocities.finish()),
                Arc::new(occupancy.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        let Some(writer) = self.summaries.as_mut() else {
            return Ok(());
        };

        let mut ticks       = UInt64Builder::new();
        let mut times       = Float64Builder::new();
        let mut speeds      = Float64Builder::new();
        let mut inactive    = UInt32Builder::new();
        let mut moving      = UInt32Builder::new();
        let mut dwelling    = UInt32Builder::new();
        let mut finished    = UInt32Builder::new();
        let mut boardings   = UInt64Builder::new();
        let mut alightings  = UInt64Builder::new();
        let mut stop_visits = UInt32Builder::new();

        ticks.append_value(row.tick);
        times.append_value(row.time_secs);
        speeds.append_value(row.traffic_speed);
        inactive.append_value(row.inactive);
        moving.append_value(row.moving);
        dwelling.append_value(row.dwelling);
        finished.append_value(row.finished);
        boardings.append_value(row.boardings);
        alightings.append_value(row.alightings);
        stop_visits.append_value(row.stop_visits);

        let batch = RecordBatch::try_new(
            Arc::clone(&self.summ_schema),
            vec![
                Arc::new(ticks.finish()),
                Arc::new(times.finish()),
                Arc::new(speeds.finish()),
                Arc::new(inactive.finish()),
                Arc::new(moving.finish()),
                Arc::new(dwelling.finish()),
                Arc::new(finished.finish()),
                Arc::new(boardings.finish()),
                Arc::new(alightings.finish()),
                Arc::new(stop_visits.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_stop_visits(&mut self, rows: &[StopVisitRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.visits.as_mut() else {
            return Ok(());
        };

        let mut stop_ids = UInt32Builder::new();
        let mut visits   = UInt32Builder::new();
        let mut times    = Float64Builder::new();
        let mut headways = Float64Builder::new();

        for row in rows {
            stop_ids.append_value(row.stop_id);
            visits.append_value(row.visit);
            times.append_value(row.time_secs);
            headways.append_option(row.headway_secs);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.visit_schema),
            vec![
                Arc::new(stop_ids.finish()),
                Arc::new(visits.finish()),
                Arc::new(times.finish()),
                Arc::new(headways.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        for w in [self.snapshots.take(), self.summaries.take(), self.visits.take()]
            .into_iter()
            .flatten()
        {
            w.close()?;
        }
        Ok(())
    }
}
