//! SQLite output backend (feature `sqlite`).
//!
//! Creates `output.db` in the output directory with two tables:
//! `vehicle_states` and `tick_summaries`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{OutputResult, TickSummaryRow, VehicleStateRow};

pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS vehicle_states (
                 tick       INTEGER NOT NULL,
                 time       REAL    NOT NULL,
                 vehicle_id INTEGER NOT NULL,
                 callsign   TEXT    NOT NULL,
                 kind       TEXT    NOT NULL,
                 lat        REAL    NOT NULL,
                 lon        REAL    NOT NULL,
                 alt        REAL    NOT NULL,
                 vn         REAL    NOT NULL,
                 ve         REAL    NOT NULL,
                 vd         REAL    NOT NULL,
                 mission    TEXT    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick        INTEGER PRIMARY KEY,
                 time        REAL    NOT NULL,
                 dt          REAL    NOT NULL,
                 running     INTEGER NOT NULL,
                 complete    INTEGER NOT NULL,
                 transmitted INTEGER NOT NULL,
                 delivered   INTEGER NOT NULL,
                 lost        INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_states(&mut self, rows: &[VehicleStateRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO vehicle_states \
                 (tick, time, vehicle_id, callsign, kind, lat, lon, alt, vn, ve, vd, mission) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick,
                    row.time,
                    row.vehicle_id,
                    row.callsign,
                    row.kind,
                    row.position.lat,
                    row.position.lon,
                    row.position.alt,
                    row.velocity.north,
                    row.velocity.east,
                    row.velocity.down,
                    row.mission,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries \
             (tick, time, dt, running, complete, transmitted, delivered, lost) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                row.tick,
                row.time,
                row.dt,
                row.running,
                row.complete,
                row.transmitted,
                row.delivered,
                row.lost,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
