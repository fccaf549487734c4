//! `av-output` — per-tick output writers for the airspace V2V simulator.
//!
//! Two backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                                |
//! |-----------|---------|----------------------------------------------|
//! | *(none)*  | CSV     | `vehicle_states.csv`, `tick_summaries.csv`   |
//! | `sqlite`  | SQLite  | `output.db`                                  |
//!
//! Both implement [`OutputWriter`] and are driven by [`SimOutputObserver`],
//! which implements `av_sim::SimObserver`.  Per-agent JSON flight logs are
//! written separately by `Environment::write_logs`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use av_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! env.run(&mut obs)?;
//! if let Some(e) = obs.take_error() { log::error!("output error: {e}"); }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{TickSummaryRow, VehicleStateRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
