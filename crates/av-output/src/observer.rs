//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use av_core::SimClock;
use av_sim::{SimObserver, TickStats, VehicleSnapshot};
use log::{info, warn};

use crate::row::{TickSummaryRow, VehicleStateRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes vehicle states and tick summaries to any
/// [`OutputWriter`] backend.
///
/// Observer hooks cannot fail, so writer errors are stored and the run
/// carries on.  Check with [`take_error`][Self::take_error] once the run
/// returns.
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    rows:       u64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, rows: 0, last_error: None }
    }

    /// The first write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!("output write failed: {e}");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, clock: &SimClock, stats: &TickStats) {
        let result = self.writer.write_tick_summary(&TickSummaryRow::from_stats(clock, stats));
        self.store_err(result);
    }

    fn on_snapshot(&mut self, clock: &SimClock, vehicles: &[VehicleSnapshot]) {
        if vehicles.is_empty() {
            return;
        }
        let rows: Vec<VehicleStateRow> =
            vehicles.iter().map(|v| VehicleStateRow::from_snapshot(clock, v)).collect();
        self.rows += rows.len() as u64;
        let result = self.writer.write_states(&rows);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, clock: &SimClock) {
        let result = self.writer.finish();
        self.store_err(result);
        info!("output closed at {clock}: {} vehicle state rows", self.rows);
    }
}
