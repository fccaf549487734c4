//! The `Environment` struct and its step loop.

use std::path::{Path, PathBuf};
use std::time::Instant;

use av_agent::Agent;
use av_comms::{receiver_from_name, transmitter_from_name, ChannelHandle, Receiver, Transmitter};
use av_core::{ClockMode, Lla, SimClock, SimConfig, Uncertainty, VehicleId, Wind, WindProfile};
use av_traffic::{TrafficGenerator, TrafficSpec};
use log::info;
use serde::{Deserialize, Serialize};

use crate::exchange::exchange;
use crate::normalize::normalize_logs;
use crate::{SimError, SimObserver, SimResult, TickStats, VehicleKind, VehicleSnapshot};

// ── Registration parameters ───────────────────────────────────────────────────

/// Per-agent registration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSpec {
    /// Elapsed simulation time before the mission is started, seconds.
    pub start_delay: f64,
    /// Elapsed simulation time after which a running mission is ended,
    /// seconds.
    pub time_limit:  f64,
    /// Endpoint kind names: `ADS-B`, `GroundTruth` or `none`.
    pub transmitter: String,
    pub receiver:    String,
}

impl Default for AgentSpec {
    fn default() -> Self {
        Self {
            start_delay: 0.0,
            time_limit:  1000.0,
            transmitter: "GroundTruth".to_owned(),
            receiver:    "GroundTruth".to_owned(),
        }
    }
}

// ── Environment ───────────────────────────────────────────────────────────────

/// The simulation controller.
///
/// Owns the clock, the single shared channel, the wind profile, the traffic
/// generator and the agent registry.  Per-agent data is kept in parallel
/// vectors indexed by registration order.
///
/// Create via [`EnvironmentBuilder`][crate::EnvironmentBuilder].
pub struct Environment {
    pub config: SimConfig,
    pub clock:  SimClock,

    channel:        ChannelHandle,
    wind_profile:   WindProfile,
    /// Wind resolved on the latest tick.
    wind:           Wind,
    home:           Option<Lla>,
    merge_fix_file: Option<PathBuf>,

    agents:       Vec<Box<dyn Agent>>,
    specs:        Vec<AgentSpec>,
    transmitters: Vec<Box<dyn Transmitter>>,
    receivers:    Vec<Box<dyn Receiver>>,
    traffic:      TrafficGenerator,

    /// Host instant matching `clock.t0`, wall-clock mode only.
    wall_start:   Option<Instant>,
    prepared:     bool,
    normalized:   bool,
}

impl Environment {
    pub(crate) fn new(
        config:         SimConfig,
        channel:        ChannelHandle,
        wind_profile:   WindProfile,
        home:           Option<Lla>,
        merge_fix_file: Option<PathBuf>,
    ) -> Self {
        Self {
            clock: config.make_clock(),
            wind: wind_profile.at(0),
            traffic: TrafficGenerator::new(config.seed),
            config,
            channel,
            wind_profile,
            home,
            merge_fix_file,
            agents: Vec::new(),
            specs: Vec::new(),
            transmitters: Vec::new(),
            receivers: Vec::new(),
            wall_start: None,
            prepared: false,
            normalized: false,
        }
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Register a cooperative agent and bind a transmitter/receiver pair to
    /// the shared channel.
    ///
    /// The first agent's home becomes the run's global home unless one was
    /// already set.
    pub fn add_agent(&mut self, agent: Box<dyn Agent>, spec: AgentSpec) -> SimResult<VehicleId> {
        if !(spec.start_delay >= 0.0) {
            return Err(SimError::Config(format!("start_delay must be non-negative, got {}", spec.start_delay)));
        }
        if !(spec.time_limit >= 0.0) {
            return Err(SimError::Config(format!("time_limit must be non-negative, got {}", spec.time_limit)));
        }
        let id = agent.core().id;
        self.ensure_unused(id)?;

        let transmitter = transmitter_from_name(&spec.transmitter, id, &self.channel)?;
        let receiver = receiver_from_name(&spec.receiver, id, &self.channel)?;
        let core = agent.core();
        info!(
            "{} ({id}): transmitter {}, receiver {}, start delay {}s, time limit {}s",
            core.callsign,
            transmitter.kind(),
            receiver.kind(),
            spec.start_delay,
            spec.time_limit
        );
        if self.home.is_none() {
            self.home = Some(core.home);
        }

        self.agents.push(agent);
        self.specs.push(spec);
        self.transmitters.push(transmitter);
        self.receivers.push(receiver);
        Ok(id)
    }

    /// Create a traffic vehicle placed relative to `home`.
    pub fn add_traffic(&mut self, spec: &TrafficSpec, home: Lla) -> SimResult<VehicleId> {
        if self.agents.iter().any(|a| a.core().id == spec.id) {
            return Err(SimError::DuplicateId(spec.id));
        }
        Ok(self.traffic.create_traffic(spec, home, &self.channel)?.id)
    }

    fn ensure_unused(&self, id: VehicleId) -> SimResult<()> {
        let taken = self.agents.iter().any(|a| a.core().id == id)
            || self.traffic.vehicles().iter().any(|v| v.id == id);
        if taken { Err(SimError::DuplicateId(id)) } else { Ok(()) }
    }

    /// Position report noise for every traffic vehicle and agent.
    pub fn set_pos_uncertainty(&mut self, uncertainty: Uncertainty) -> SimResult<()> {
        self.traffic.set_pos_uncertainty(uncertainty)?;
        for agent in &mut self.agents {
            agent.set_pos_uncertainty(uncertainty)?;
        }
        Ok(())
    }

    /// Velocity report noise for every traffic vehicle and agent.
    pub fn set_vel_uncertainty(&mut self, uncertainty: Uncertainty) -> SimResult<()> {
        self.traffic.set_vel_uncertainty(uncertainty)?;
        for agent in &mut self.agents {
            agent.set_vel_uncertainty(uncertainty)?;
        }
        Ok(())
    }

    /// File handed to every agent's `input_merge_fixes` when the run starts.
    pub fn input_merge_fixes(&mut self, path: impl Into<PathBuf>) {
        self.merge_fix_file = Some(path.into());
    }

    pub fn set_home(&mut self, home: Lla) {
        self.home = Some(home);
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// The run's global home, once known.
    pub fn home(&self) -> Option<Lla> {
        self.home
    }

    /// Wind resolved on the latest tick.
    pub fn wind(&self) -> Wind {
        self.wind
    }

    pub fn channel(&self) -> &ChannelHandle {
        &self.channel
    }

    pub fn agents(&self) -> &[Box<dyn Agent>] {
        &self.agents
    }

    pub fn agent(&self, index: usize) -> Option<&dyn Agent> {
        self.agents.get(index).map(|a| a.as_ref())
    }

    pub fn transmitters(&self) -> &[Box<dyn Transmitter>] {
        &self.transmitters
    }

    pub fn receivers(&self) -> &[Box<dyn Receiver>] {
        &self.receivers
    }

    pub fn traffic(&self) -> &TrafficGenerator {
        &self.traffic
    }

    /// `true` when at least one agent is registered and every agent reports
    /// its mission complete.
    pub fn is_complete(&self) -> bool {
        !self.agents.is_empty() && self.agents.iter().all(|a| a.core().is_complete())
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Step until every agent's mission is complete, then normalize logs.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        self.prepare()?;
        info!("run started: {} agents, {} traffic", self.agents.len(), self.traffic.len());
        while !self.is_complete() {
            self.step(observer)?;
        }
        self.finish(observer);
        info!("run complete at {}", self.clock);
        Ok(())
    }

    /// Step at most `n` ticks, stopping early once every mission is
    /// complete.  Normalizes logs when the run completes.
    ///
    /// Returns `true` when the run is complete.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<bool> {
        self.prepare()?;
        for _ in 0..n {
            if self.is_complete() {
                break;
            }
            self.step(observer)?;
        }
        if self.is_complete() {
            self.finish(observer);
        }
        Ok(self.is_complete())
    }

    /// Write every agent's JSON flight log into `dir`.
    pub fn write_logs(&self, dir: &Path) -> SimResult<Vec<PathBuf>> {
        self.agents
            .iter()
            .map(|a| a.write_log(dir).map_err(SimError::from))
            .collect()
    }

    fn prepare(&mut self) -> SimResult<()> {
        if self.prepared {
            return Ok(());
        }
        if self.agents.is_empty() {
            return Err(SimError::NoAgents);
        }
        let (propagation, reception) = self.channel.model_names();
        info!("channel: propagation {propagation}, reception {reception}");
        if let Some(path) = &self.merge_fix_file {
            for agent in &mut self.agents {
                agent.input_merge_fixes(path)?;
            }
        }
        if self.clock.mode == ClockMode::WallClock {
            self.wall_start = Some(Instant::now());
        }
        self.prepared = true;
        Ok(())
    }

    fn finish<O: SimObserver>(&mut self, observer: &mut O) {
        if self.normalized {
            return;
        }
        let home = self.home.unwrap_or_default();
        normalize_logs(&mut self.agents, home);
        self.normalized = true;
        observer.on_sim_end(&self.clock);
    }

    /// Advance the clock by one tick and return the tick's effective width.
    fn advance_clock(&mut self) -> f64 {
        match (self.clock.mode, self.wall_start) {
            (ClockMode::WallClock, Some(start)) => loop {
                let now = self.clock.t0 + start.elapsed().as_secs_f64();
                if let Some(dt) = self.clock.advance_to(now) {
                    break dt;
                }
                std::hint::spin_loop();
            },
            _ => self.clock.advance(),
        }
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        // ── 1. Clock ──────────────────────────────────────────────────────
        let dt = self.advance_clock();
        observer.on_tick_start(&self.clock);
        let time = self.clock.current_time;
        let elapsed = self.clock.elapsed();

        // ── 2. Traffic, with the wind held from the previous tick ─────────
        self.traffic.step(dt, self.wind);

        // ── 3. Wind ───────────────────────────────────────────────────────
        self.wind = self.wind_profile.at(self.clock.count);

        // ── 4. Agents, in registration order ──────────────────────────────
        for (agent, spec) in self.agents.iter_mut().zip(&self.specs) {
            agent.input_wind(self.wind);
            if agent.check_mission_complete() {
                agent.terminate();
            }
            if !agent.core().is_started() && elapsed >= spec.start_delay {
                agent.start_mission(time);
            }
            if !agent.core().is_complete() {
                agent.run(time, dt).map_err(|source| SimError::AgentFault {
                    callsign: agent.core().callsign.clone(),
                    time,
                    source,
                })?;
            }
            let core = agent.core();
            if core.is_started() && !core.is_complete() && elapsed >= spec.time_limit {
                info!("{}: time limit reached at {time:.2}s", core.callsign);
                agent.core_mut().force_complete();
                agent.terminate();
            }
        }

        // ── 5. Global time limit ──────────────────────────────────────────
        if let Some(limit) = self.config.time_limit {
            if elapsed >= limit {
                info!("global time limit reached at {time:.2}s");
                for agent in &mut self.agents {
                    agent.core_mut().force_complete();
                    agent.terminate();
                }
            }
        }

        // ── 6. V2V exchange ───────────────────────────────────────────────
        let channel = exchange(
            time,
            &mut self.agents,
            &mut self.transmitters,
            &mut self.receivers,
            &mut self.traffic,
            &self.channel,
        );

        let complete = self.agents.iter().filter(|a| a.core().is_complete()).count();
        let running = self
            .agents
            .iter()
            .filter(|a| a.core().is_started() && !a.core().is_complete())
            .count();
        observer.on_tick_end(&self.clock, &TickStats { dt, running, complete, channel });

        let interval = self.config.output_interval_ticks;
        if interval > 0 && self.clock.count.is_multiple_of(interval) {
            observer.on_snapshot(&self.clock, &self.snapshot());
        }
        Ok(())
    }

    /// Reported state of every agent, then every traffic vehicle.
    pub fn snapshot(&self) -> Vec<VehicleSnapshot> {
        let agents = self.agents.iter().map(|a| {
            let core = a.core();
            VehicleSnapshot {
                id:       core.id,
                callsign: core.callsign.clone(),
                kind:     VehicleKind::Agent,
                position: core.position,
                velocity: core.velocity,
                mission:  Some(core.mission()),
            }
        });
        let traffic = self.traffic.vehicles().iter().map(|v| VehicleSnapshot {
            id:       v.id,
            callsign: v.callsign.clone(),
            kind:     VehicleKind::Traffic,
            position: v.position(),
            velocity: v.velocity(),
            mission:  None,
        });
        agents.chain(traffic).collect()
    }
}
