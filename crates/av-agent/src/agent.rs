//! The `Agent` trait: the capability set the environment controller drives.

use std::path::{Path, PathBuf};

use av_comms::{Datagram, IntruderReport, MergeLog};
use av_core::{LocalFrame, Lla, Ned, Uncertainty, Wind, Xyz};
use log::{debug, info};

use crate::{load_merge_fixes, write_flight_log, AgentCore, AgentResult};

/// A cooperative agent.
///
/// # Required methods
///
/// [`core`][Self::core], [`core_mut`][Self::core_mut] and
/// [`run`][Self::run].  Every other hook has a default that operates on the
/// embedded [`AgentCore`].
///
/// # Call order within one tick
///
/// The controller calls, in order: [`input_wind`][Self::input_wind],
/// [`check_mission_complete`][Self::check_mission_complete],
/// [`start_mission`][Self::start_mission] (once, when the start delay has
/// passed), [`run`][Self::run] (only while the mission is not complete), and
/// later in the tick [`input_v2v_data`][Self::input_v2v_data].
pub trait Agent {
    fn core(&self) -> &AgentCore;

    fn core_mut(&mut self) -> &mut AgentCore;

    fn input_wind(&mut self, wind: Wind) {
        self.core_mut().wind = wind;
    }

    /// Report whether the mission is complete.  Implementations that detect
    /// their own completion should call [`AgentCore::complete_mission`]
    /// before returning.
    fn check_mission_complete(&mut self) -> bool {
        self.core().is_complete()
    }

    fn start_mission(&mut self, time: f64) {
        self.core_mut().start_mission(time);
    }

    /// Advance the agent by one tick ending at `time`.
    ///
    /// Returns `Ok(true)` when the agent did work this tick.  An `Err` is
    /// fatal to the whole run.
    fn run(&mut self, time: f64, dt: f64) -> AgentResult<bool>;

    /// Stop the agent.  Safe to call any number of times.
    fn terminate(&mut self) {
        let core = self.core_mut();
        if core.shut_down() {
            info!("{}: terminated", core.callsign);
        }
    }

    /// Dispatch this tick's received datagrams.
    ///
    /// Intruder reports go to [`input_traffic`][Self::input_traffic].  Merge
    /// logs go to [`input_merge_log`][Self::input_merge_log] only when they
    /// concern the intersection of this agent's own arrival record; all
    /// others are ignored.
    fn input_v2v_data(&mut self, time: f64, data: Vec<Datagram>) {
        for datagram in data {
            match datagram {
                Datagram::Intruder(IntruderReport { callsign, pos, vel }) => {
                    self.input_traffic(time, &callsign, pos, vel);
                }
                Datagram::Merger(log) => {
                    let relevant = self
                        .core()
                        .arrival
                        .as_ref()
                        .is_some_and(|a| a.intersection_id == log.intersection_id);
                    if relevant {
                        self.input_merge_log(log);
                    }
                }
            }
        }
    }

    fn input_traffic(&mut self, time: f64, callsign: &str, position: Lla, velocity: Ned) {
        self.core_mut().record_traffic(time, callsign, position, velocity);
    }

    fn input_merge_log(&mut self, log: MergeLog) {
        let core = self.core_mut();
        debug!("{}: merge log for {} ({} nodes)", core.callsign, log.intersection_id, log.total_nodes);
        core.merge_log = Some(log);
    }

    /// Load merge fixes from `path`.
    fn input_merge_fixes(&mut self, path: &Path) -> AgentResult<()> {
        let fixes = load_merge_fixes(path)?;
        let core = self.core_mut();
        info!("{}: {} merge fixes from {}", core.callsign, fixes.len(), path.display());
        core.merge_fixes = fixes;
        Ok(())
    }

    /// Project `p` into the local frame anchored at `origin`.
    fn to_local(&self, origin: Lla, p: Lla) -> Xyz {
        LocalFrame::new(origin).to_local(p)
    }

    /// Position report noise.  Agents without a noise model ignore it.
    fn set_pos_uncertainty(&mut self, _uncertainty: Uncertainty) -> AgentResult<()> {
        Ok(())
    }

    /// Velocity report noise.  Agents without a noise model ignore it.
    fn set_vel_uncertainty(&mut self, _uncertainty: Uncertainty) -> AgentResult<()> {
        Ok(())
    }

    /// Write `simlog-<callsign>.json` into `dir`.
    fn write_log(&self, dir: &Path) -> AgentResult<PathBuf> {
        write_flight_log(self.core(), dir)
    }
}
