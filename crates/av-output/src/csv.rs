//! CSV output backend.
//!
//! Creates two files in the output directory:
//! - `vehicle_states.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{OutputResult, TickSummaryRow, VehicleStateRow};

pub const STATE_HEADER: [&str; 12] = [
    "tick", "time", "vehicle_id", "callsign", "kind", "lat", "lon", "alt", "vn", "ve", "vd", "mission",
];

pub const SUMMARY_HEADER: [&str; 8] =
    ["tick", "time", "dt", "running", "complete", "transmitted", "delivered", "lost"];

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    states:    Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open both files and write their header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut states = Writer::from_path(dir.join("vehicle_states.csv"))?;
        states.write_record(STATE_HEADER)?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(SUMMARY_HEADER)?;

        Ok(Self { states, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_states(&mut self, rows: &[VehicleStateRow]) -> OutputResult<()> {
        for row in rows {
            self.states.write_record(&[
                row.tick.to_string(),
                row.time.to_string(),
                row.vehicle_id.to_string(),
                row.callsign.clone(),
                row.kind.to_owned(),
                row.position.lat.to_string(),
                row.position.lon.to_string(),
                row.position.alt.to_string(),
                row.velocity.north.to_string(),
                row.velocity.east.to_string(),
                row.velocity.down.to_string(),
                row.mission.to_owned(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.time.to_string(),
            row.dt.to_string(),
            row.running.to_string(),
            row.complete.to_string(),
            row.transmitted.to_string(),
            row.delivered.to_string(),
            row.lost.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.states.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
