//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `bus_snapshots`, `tick_summaries` and `stop_visits`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{BusSnapshotRow, OutputResult, StopVisitRow, TickSummaryRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS bus_snapshots (
                 bus_id    INTEGER NOT NULL,
                 tick      INTEGER NOT NULL,
                 time_secs REAL    NOT NULL,
                 status    INTEGER NOT NULL,
                 position  REAL    NOT NULL,
                 velocity  REAL    NOT NULL,
                 occupancy INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick          INTEGER PRIMARY KEY,
                 time_secs     REAL    NOT NULL,
                 traffic_speed REAL    NOT NULL,
                 inactive      INTEGER NOT NULL,
                 moving        INTEGER NOT NULL,
                 dwelling      INTEGER NOT NULL,
                 finished      INTEGER NOT NULL,
                 boardings     INTEGER NOT NULL,
                 alightings    INTEGER NOT NULL,
                 stop_visits   INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS stop_visits (
                 stop_id      INTEGER NOT NULL,
                 visit        INTEGER NOT NULL,
                 time_secs    REAL    NOT NULL,
                 headway_secs REAL,
                 PRIMARY KEY (stop_id, visit)
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_snapshots(&mut self, rows: &[BusSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO bus_snapshots \
                 (bus_id, tick, time_secs, status, position, velocity, occupancy) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.bus_id,
                    row.tick,
                    row.time_secs,
                    row.status,
                    row.position,
                    row.velocity,
                    row.occupancy,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries \
             (tick, time_secs, traffic_speed, inactive, moving, dwelling, finished, \
              boardings, alightings, stop_visits) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                row.tick,
                row.time_secs,
                row.traffic_speed,
                row.inactive,
                row.moving,
                row.dwelling,
                row.finished,
                row.boardings,
                row.alightings,
                row.stop_visits,
            ],
        )?;
        Ok(())
    }

    fn write_stop_visits(&mut self, rows: &[StopVisitRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO stop_visits (stop_id, visit, time_secs, headway_secs) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.stop_id,
                    row.visit,
                    row.time_secs,
                    row.headway_secs,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
