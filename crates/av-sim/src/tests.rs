//! Unit tests for av-sim.

use std::cell::RefCell;
use std::rc::Rc;

use av_agent::{Agent, AgentCore, AgentError, AgentResult};
use av_comms::{ArrivalRecord, MergeLog, NodeRole};
use av_core::{IntersectionId, Lla, Ned, SimClock, SimConfig, VehicleId, Wind};

use crate::{AgentSpec, Environment, EnvironmentBuilder, SimObserver, TickStats, VehicleSnapshot};

// ── Test doubles ──────────────────────────────────────────────────────────────

/// What a `ProbeAgent` saw, shared with the test body.
#[derive(Default)]
struct Probe {
    runs:         usize,
    winds:        Vec<Wind>,
    heard:        Vec<String>,
    merge_logs:   Vec<MergeLog>,
    terminations: usize,
}

struct ProbeAgent {
    core:         AgentCore,
    probe:        Rc<RefCell<Probe>>,
    finish_after: Option<usize>,
    fail_at:      Option<usize>,
    done:         bool,
}

impl ProbeAgent {
    fn new(id: u32) -> (Self, Rc<RefCell<Probe>>) {
        let probe = Rc::new(RefCell::new(Probe::default()));
        let home = Lla::new(37.0 + id as f64 * 0.001, -76.0, 100.0);
        let agent = Self {
            core: AgentCore::new(VehicleId(id), format!("P{id}"), home),
            probe: probe.clone(),
            finish_after: None,
            fail_at: None,
            done: false,
        };
        (agent, probe)
    }

    fn finishing_after(mut self, runs: usize) -> Self {
        self.finish_after = Some(runs);
        self
    }

    fn failing_at(mut self, run: usize) -> Self {
        self.fail_at = Some(run);
        self
    }

    fn with_arrival(mut self, intersection: u32, time: f64) -> Self {
        self.core.arrival = Some(ArrivalRecord {
            vehicle_id:      self.core.id,
            intersection_id: IntersectionId(intersection),
            requested_time:  time,
            role:            NodeRole::Neutral,
        });
        self
    }

    fn with_app(mut self, app: &str) -> Self {
        self.core.apps.insert(app.to_owned());
        self
    }
}

impl Agent for ProbeAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    fn input_wind(&mut self, wind: Wind) {
        self.probe.borrow_mut().winds.push(wind);
        self.core.wind = wind;
    }

    fn check_mission_complete(&mut self) -> bool {
        if self.done {
            self.core.complete_mission();
        }
        self.core.is_complete()
    }

    fn run(&mut self, time: f64, _dt: f64) -> AgentResult<bool> {
        let runs = {
            let mut p = self.probe.borrow_mut();
            p.runs += 1;
            p.runs
        };
        if self.fail_at == Some(runs) {
            return Err(AgentError::Fault { callsign: self.core.callsign.clone(), reason: "boom".into() });
        }
        if self.finish_after == Some(runs) {
            self.done = true;
        }
        self.core.record_ownship(time);
        Ok(true)
    }

    fn terminate(&mut self) {
        self.probe.borrow_mut().terminations += 1;
        self.core.shut_down();
    }

    fn input_traffic(&mut self, time: f64, callsign: &str, position: Lla, velocity: Ned) {
        self.probe.borrow_mut().heard.push(callsign.to_owned());
        self.core.record_traffic(time, callsign, position, velocity);
    }

    fn input_merge_log(&mut self, log: MergeLog) {
        self.probe.borrow_mut().merge_logs.push(log.clone());
        self.core.merge_log = Some(log);
    }
}

/// Records the size of every batch of received datagrams.
struct Listener {
    core:    AgentCore,
    batches: Rc<RefCell<Vec<usize>>>,
}

impl Agent for Listener {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    fn run(&mut self, _time: f64, _dt: f64) -> AgentResult<bool> {
        Ok(true)
    }

    fn input_v2v_data(&mut self, _time: f64, data: Vec<av_comms::Datagram>) {
        self.batches.borrow_mut().push(data.len());
    }
}

/// Records clocks and stats for every tick.
#[derive(Default)]
struct Recorder {
    ticks:     Vec<(u64, f64)>,
    stats:     Vec<TickStats>,
    snapshots: Vec<Vec<VehicleSnapshot>>,
    ended:     usize,
}

impl SimObserver for Recorder {
    fn on_tick_end(&mut self, clock: &SimClock, stats: &TickStats) {
        self.ticks.push((clock.count, clock.current_time));
        self.stats.push(*stats);
    }

    fn on_snapshot(&mut self, _clock: &SimClock, vehicles: &[VehicleSnapshot]) {
        self.snapshots.push(vehicles.to_vec());
    }

    fn on_sim_end(&mut self, _clock: &SimClock) {
        self.ended += 1;
    }
}

fn env_with_limit(limit: f64) -> Environment {
    EnvironmentBuilder::new(SimConfig { time_limit: Some(limit), ..SimConfig::default() })
        .build()
        .unwrap()
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod configuration {
    use super::*;
    use crate::SimError;
    use av_comms::ChannelConfig;

    #[test]
    fn unknown_channel_models_fail_at_build() {
        let cfg = ChannelConfig { propagation: "Telepathy".into(), ..ChannelConfig::default() };
        let err = EnvironmentBuilder::new(SimConfig::default()).channel(cfg).build().err().unwrap();
        assert!(matches!(err, SimError::Comms(_)));

        let cfg = ChannelConfig { reception: "Hopeful".into(), ..ChannelConfig::default() };
        assert!(EnvironmentBuilder::new(SimConfig::default()).channel(cfg).build().is_err());
    }

    #[test]
    fn zero_dt_rejected() {
        let cfg = SimConfig { dt: 0.0, ..SimConfig::default() };
        let err = EnvironmentBuilder::new(cfg).build().err().unwrap();
        assert!(matches!(err, SimError::Core(_)));
    }

    #[test]
    fn unknown_endpoint_kind_rejected() {
        let mut env = env_with_limit(1.0);
        let (a, _) = ProbeAgent::new(0);
        let spec = AgentSpec { transmitter: "Smoke Signals".into(), ..AgentSpec::default() };
        assert!(matches!(env.add_agent(Box::new(a), spec), Err(SimError::Comms(_))));
        assert!(env.agents().is_empty());

        let (b, _) = ProbeAgent::new(1);
        let spec = AgentSpec { receiver: "Tin Can".into(), ..AgentSpec::default() };
        assert!(env.add_agent(Box::new(b), spec).is_err());
    }

    #[test]
    fn negative_start_delay_rejected() {
        let mut env = env_with_limit(1.0);
        let (a, _) = ProbeAgent::new(0);
        let spec = AgentSpec { start_delay: -1.0, ..AgentSpec::default() };
        assert!(matches!(env.add_agent(Box::new(a), spec), Err(SimError::Config(_))));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut env = env_with_limit(1.0);
        env.add_agent(Box::new(ProbeAgent::new(0).0), AgentSpec::default()).unwrap();
        let err = env.add_agent(Box::new(ProbeAgent::new(0).0), AgentSpec::default()).unwrap_err();
        assert!(matches!(err, SimError::DuplicateId(VehicleId(0))));
    }

    #[test]
    fn run_without_agents_is_error() {
        let mut env = env_with_limit(1.0);
        assert!(matches!(env.run(&mut crate::NoopObserver), Err(SimError::NoAgents)));
    }

    #[test]
    fn endpoints_share_the_environment_channel() {
        let mut env = env_with_limit(1.0);
        env.add_agent(Box::new(ProbeAgent::new(0).0), AgentSpec::default()).unwrap();
        env.add_agent(Box::new(ProbeAgent::new(1).0), AgentSpec::default()).unwrap();
        for tx in env.transmitters() {
            assert!(tx.channel().unwrap().same_channel(env.channel()));
        }
        for rx in env.receivers() {
            assert!(rx.channel().unwrap().same_channel(env.channel()));
        }
    }

    #[test]
    fn first_agent_sets_home() {
        let mut env = env_with_limit(1.0);
        let (a, _) = ProbeAgent::new(3);
        let home = a.core().home;
        env.add_agent(Box::new(a), AgentSpec::default()).unwrap();
        env.add_agent(Box::new(ProbeAgent::new(4).0), AgentSpec::default()).unwrap();
        assert_eq!(env.home(), Some(home));
    }

    #[test]
    fn explicit_home_wins() {
        let home = Lla::new(1.0, 2.0, 3.0);
        let mut env = EnvironmentBuilder::new(SimConfig::default()).home(home).build().unwrap();
        env.add_agent(Box::new(ProbeAgent::new(0).0), AgentSpec::default()).unwrap();
        assert_eq!(env.home(), Some(home));
    }
}

// ── Step loop ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod step_loop {
    use super::*;
    use crate::SimError;
    use av_agent::MissionState;
    use av_core::WindProfile;

    #[test]
    fn global_time_limit_end_to_end() {
        let mut env = env_with_limit(10.0);
        env.add_agent(Box::new(ProbeAgent::new(0).0), AgentSpec::default()).unwrap();
        env.add_agent(Box::new(ProbeAgent::new(1).0), AgentSpec::default()).unwrap();
        let mut rec = Recorder::default();
        env.run(&mut rec).unwrap();

        assert!(env.agents().iter().all(|a| a.core().is_complete()));
        assert!(env.agents().iter().all(|a| a.core().mission() == MissionState::Terminated));
        assert_eq!(env.clock.count, 200);
        assert!(env.clock.current_time >= 10.0);
        assert!((env.clock.current_time - 10.0).abs() < 1e-9);
        assert_eq!(rec.ended, 1);
    }

    #[test]
    fn fixed_step_increments() {
        let mut env = env_with_limit(2.0);
        env.add_agent(Box::new(ProbeAgent::new(0).0), AgentSpec::default()).unwrap();
        let mut rec = Recorder::default();
        env.run(&mut rec).unwrap();
        for w in rec.ticks.windows(2) {
            assert_eq!(w[1].0, w[0].0 + 1);
            assert!((w[1].1 - w[0].1 - 0.05).abs() < 1e-12);
        }
        assert!(rec.stats.iter().all(|s| s.dt == 0.05));
    }

    #[test]
    fn wall_clock_ticks_use_measured_width() {
        let config = SimConfig { fast_time: false, dt: 0.01, time_limit: Some(0.05), ..SimConfig::default() };
        let mut env = EnvironmentBuilder::new(config).build().unwrap();
        env.add_agent(Box::new(ProbeAgent::new(0).0), AgentSpec::default()).unwrap();
        env.add_agent(Box::new(ProbeAgent::new(1).0), AgentSpec { start_delay: 0.02, ..AgentSpec::default() })
            .unwrap();
        let mut rec = Recorder::default();
        env.run(&mut rec).unwrap();

        let t0 = env.clock.t0;
        assert!(!rec.ticks.is_empty());
        for (n, (count, _)) in rec.ticks.iter().enumerate() {
            assert_eq!(*count, n as u64 + 1);
        }
        assert!(rec.stats.iter().all(|s| s.dt >= 0.01), "dts {:?}", rec.stats.iter().map(|s| s.dt).collect::<Vec<_>>());
        let total: f64 = rec.stats.iter().map(|s| s.dt).sum();
        assert!((env.clock.current_time - t0 - total).abs() < 1e-9);

        // The run ends on the first tick at or past the limit.
        let (_, last) = rec.ticks[rec.ticks.len() - 1];
        assert!(last - t0 >= 0.05);
        if let Some(&(_, before)) = rec.ticks.iter().rev().nth(1) {
            assert!(before - t0 < 0.05);
        }

        let started = env.agents()[1].core().started_at().unwrap();
        assert!(started - t0 >= 0.02);
        assert!(env.agents().iter().all(|a| a.core().is_complete()));
    }

    #[test]
    fn start_delay_respected_and_start_is_sticky() {
        let mut env = env_with_limit(3.0);
        let (a, _) = ProbeAgent::new(0);
        env.add_agent(Box::new(a), AgentSpec { start_delay: 1.0, ..AgentSpec::default() }).unwrap();

        env.run_ticks(19, &mut crate::NoopObserver).unwrap();
        assert!(!env.agents()[0].core().is_started());
        env.run_ticks(1, &mut crate::NoopObserver).unwrap();
        let started = env.agents()[0].core().started_at().unwrap();
        assert!((started - 1.0).abs() < 1e-9);

        env.run(&mut crate::NoopObserver).unwrap();
        assert!(env.agents()[0].core().is_started());
        assert_eq!(env.agents()[0].core().started_at(), Some(started));
    }

    #[test]
    fn no_runs_after_completion() {
        let mut env = env_with_limit(2.0);
        let (a, probe_a) = ProbeAgent::new(0);
        let (b, probe_b) = ProbeAgent::new(1);
        env.add_agent(Box::new(a.finishing_after(5)), AgentSpec::default()).unwrap();
        env.add_agent(Box::new(b), AgentSpec::default()).unwrap();
        env.run(&mut crate::NoopObserver).unwrap();

        assert_eq!(probe_a.borrow().runs, 5);
        assert_eq!(env.agents()[0].core().mission(), MissionState::Complete);
        assert_eq!(probe_b.borrow().runs, 40);
        assert!(probe_a.borrow().terminations >= 1);
    }

    #[test]
    fn per_agent_time_limit() {
        let mut env = env_with_limit(5.0);
        let (a, probe) = ProbeAgent::new(0);
        env.add_agent(Box::new(a), AgentSpec { time_limit: 1.0, ..AgentSpec::default() }).unwrap();
        env.add_agent(Box::new(ProbeAgent::new(1).0), AgentSpec::default()).unwrap();
        env.run_ticks(20, &mut crate::NoopObserver).unwrap();
        assert_eq!(env.agents()[0].core().mission(), MissionState::Terminated);
        assert!(!env.agents()[1].core().is_complete());
        assert_eq!(probe.borrow().runs, 20);
    }

    #[test]
    fn run_stops_when_all_agents_complete() {
        let mut env = env_with_limit(100.0);
        env.add_agent(Box::new(ProbeAgent::new(0).0.finishing_after(3)), AgentSpec::default()).unwrap();
        let done = env.run_ticks(1000, &mut crate::NoopObserver).unwrap();
        assert!(done);
        // Completion is observed on the tick after the third run.
        assert_eq!(env.clock.count, 4);
    }

    #[test]
    fn agent_fault_is_fatal() {
        let mut env = env_with_limit(10.0);
        env.add_agent(Box::new(ProbeAgent::new(0).0.failing_at(3)), AgentSpec::default()).unwrap();
        let err = env.run(&mut crate::NoopObserver).unwrap_err();
        match err {
            SimError::AgentFault { callsign, .. } => assert_eq!(callsign, "P0"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(env.clock.count, 3);
    }

    #[test]
    fn wind_pushed_to_agents() {
        let mut env = EnvironmentBuilder::new(SimConfig { time_limit: Some(1.0), ..SimConfig::default() })
            .wind(WindProfile::from(vec![(0.0, 5.0), (90.0, 10.0)]))
            .build()
            .unwrap();
        let (a, probe) = ProbeAgent::new(0);
        env.add_agent(Box::new(a), AgentSpec::default()).unwrap();
        env.run_ticks(3, &mut crate::NoopObserver).unwrap();
        assert_eq!(probe.borrow().winds, vec![Wind::new(90.0, 10.0); 3]);
        assert_eq!(env.wind(), Wind::new(90.0, 10.0));
    }

    #[test]
    fn snapshots_follow_interval() {
        let cfg = SimConfig { time_limit: Some(1.0), output_interval_ticks: 5, ..SimConfig::default() };
        let mut env = EnvironmentBuilder::new(cfg).build().unwrap();
        env.add_agent(Box::new(ProbeAgent::new(0).0), AgentSpec::default()).unwrap();
        let mut rec = Recorder::default();
        env.run(&mut rec).unwrap();
        assert_eq!(rec.ticks.len(), 20);
        assert_eq!(rec.snapshots.len(), 4);
        assert_eq!(rec.snapshots[0].len(), 1);
    }
}

// ── V2V exchange ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod exchange_tests {
    use super::*;
    use av_traffic::TrafficSpec;

    use crate::ALTERNATE_BUS_APP;

    #[test]
    fn every_receiver_sees_every_sender_in_any_order() {
        let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        for order in orders {
            let mut env = env_with_limit(10.0);
            let mut probes = Vec::new();
            for id in order {
                let (a, p) = ProbeAgent::new(id);
                env.add_agent(Box::new(a), AgentSpec::default()).unwrap();
                probes.push((id, p));
            }
            env.run_ticks(1, &mut crate::NoopObserver).unwrap();
            for (id, p) in &probes {
                let mut heard = p.borrow().heard.clone();
                heard.sort();
                let expected: Vec<String> =
                    (0..3).filter(|o| o != id).map(|o| format!("P{o}")).collect();
                assert_eq!(heard, expected, "order {order:?}, receiver P{id}");
            }
        }
    }

    #[test]
    fn radio_peers_hear_each_other_every_tick() {
        let mut env = env_with_limit(2.0);
        let radio = || AgentSpec { transmitter: "ADS-B".into(), receiver: "ADS-B".into(), ..AgentSpec::default() };
        let (a, pa) = ProbeAgent::new(0);
        let (b, pb) = ProbeAgent::new(1);
        env.add_agent(Box::new(a), radio()).unwrap();
        env.add_agent(Box::new(b), radio()).unwrap();
        let mut rec = Recorder::default();
        env.run(&mut rec).unwrap();

        let sending_ticks = rec.stats.iter().filter(|s| s.channel.transmitted > 0).count();
        assert!(sending_ticks > 30);
        for s in &rec.stats {
            assert_eq!(s.channel.delivered, s.channel.transmitted);
            assert_eq!(s.channel.lost, 0);
        }
        assert_eq!(pa.borrow().heard.len(), sending_ticks);
        assert_eq!(pb.borrow().heard.len(), sending_ticks);
    }

    #[test]
    fn empty_receive_still_reaches_agent() {
        let mut env = env_with_limit(10.0);
        let batches = Rc::new(RefCell::new(Vec::new()));
        let listener = Listener {
            core:    AgentCore::new(VehicleId(0), "L0", Lla::new(37.0, -76.0, 100.0)),
            batches: batches.clone(),
        };
        env.add_agent(Box::new(listener), AgentSpec::default()).unwrap();
        env.run_ticks(3, &mut crate::NoopObserver).unwrap();
        assert_eq!(*batches.borrow(), vec![0, 0, 0]);
    }

    #[test]
    fn alternate_bus_agents_do_not_broadcast() {
        let mut env = env_with_limit(10.0);
        let (a, pa) = ProbeAgent::new(0);
        let (b, pb) = ProbeAgent::new(1);
        env.add_agent(Box::new(a.with_app(ALTERNATE_BUS_APP)), AgentSpec::default()).unwrap();
        env.add_agent(Box::new(b), AgentSpec::default()).unwrap();
        env.run_ticks(1, &mut crate::NoopObserver).unwrap();
        assert!(pb.borrow().heard.is_empty());
        assert_eq!(pa.borrow().heard, vec!["P1".to_owned()]);
    }

    #[test]
    fn unstarted_agents_do_not_send_intruder_reports() {
        let mut env = env_with_limit(10.0);
        let (a, _) = ProbeAgent::new(0);
        let (b, pb) = ProbeAgent::new(1);
        env.add_agent(Box::new(a), AgentSpec { start_delay: 5.0, ..AgentSpec::default() }).unwrap();
        env.add_agent(Box::new(b), AgentSpec::default()).unwrap();
        env.run_ticks(1, &mut crate::NoopObserver).unwrap();
        assert!(pb.borrow().heard.is_empty());
    }

    #[test]
    fn merge_broadcast_ignores_mission_state() {
        let mut env = env_with_limit(10.0);
        let (a, pa) = ProbeAgent::new(0);
        let (b, pb) = ProbeAgent::new(1);
        env.add_agent(Box::new(a.with_arrival(7, 30.0)), AgentSpec::default()).unwrap();
        env.add_agent(
            Box::new(b.with_arrival(7, 20.0)),
            AgentSpec { start_delay: 100.0, ..AgentSpec::default() },
        )
        .unwrap();
        let mut rec = Recorder::default();
        env.run_ticks(1, &mut rec).unwrap();

        // One intruder report (A) plus one merger datagram from each agent.
        assert_eq!(rec.stats[0].channel.transmitted, 3);
        // A hears B's copy of the merge log; B is not started so hears nothing.
        let logs = &pa.borrow().merge_logs;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].total_nodes, 2);
        assert_eq!(logs[0].intersection_id, IntersectionId(7));
        assert!(pb.borrow().merge_logs.is_empty());
    }

    #[test]
    fn merge_logs_for_other_intersections_ignored() {
        let mut env = env_with_limit(10.0);
        let (a, pa) = ProbeAgent::new(0);
        let (b, _) = ProbeAgent::new(1);
        env.add_agent(Box::new(a.with_arrival(1, 30.0)), AgentSpec::default()).unwrap();
        env.add_agent(Box::new(b.with_arrival(2, 20.0)), AgentSpec::default()).unwrap();
        env.run_ticks(1, &mut crate::NoopObserver).unwrap();
        let logs = &pa.borrow().merge_logs;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].intersection_id, IntersectionId(1));
    }

    #[test]
    fn traffic_is_heard_by_agents() {
        let mut env = env_with_limit(10.0);
        let (a, pa) = ProbeAgent::new(0);
        let home = a.core().home;
        env.add_agent(Box::new(a), AgentSpec::default()).unwrap();
        let spec = TrafficSpec {
            id:             VehicleId(100),
            range_m:        2000.0,
            bearing_deg:    45.0,
            altitude_m:     50.0,
            speed_mps:      15.0,
            heading_deg:    225.0,
            climb_rate_mps: 0.0,
            transmitter:    "ADS-B".into(),
        };
        env.add_traffic(&spec, home).unwrap();
        env.run_ticks(2, &mut crate::NoopObserver).unwrap();
        assert_eq!(pa.borrow().heard, vec!["tf100".to_owned(), "tf100".to_owned()]);
        assert!(env.agents()[0].core().traffic_log.contains_key("tf100"));
    }

    #[test]
    fn traffic_id_cannot_shadow_agent() {
        let mut env = env_with_limit(10.0);
        env.add_agent(Box::new(ProbeAgent::new(0).0), AgentSpec::default()).unwrap();
        let spec = TrafficSpec {
            id:             VehicleId(0),
            range_m:        0.0,
            bearing_deg:    0.0,
            altitude_m:     0.0,
            speed_mps:      0.0,
            heading_deg:    0.0,
            climb_rate_mps: 0.0,
            transmitter:    "GroundTruth".into(),
        };
        assert!(env.add_traffic(&spec, Lla::default()).is_err());
    }

    #[test]
    fn channel_is_empty_after_every_tick() {
        let mut env = env_with_limit(10.0);
        env.add_agent(Box::new(ProbeAgent::new(0).0.with_arrival(1, 3.0)), AgentSpec::default()).unwrap();
        env.add_agent(Box::new(ProbeAgent::new(1).0), AgentSpec::default()).unwrap();
        for _ in 0..5 {
            env.run_ticks(1, &mut crate::NoopObserver).unwrap();
            assert_eq!(env.channel().pending(), 0);
        }
    }
}

// ── Normalization and logs ────────────────────────────────────────────────────

#[cfg(test)]
mod normalization {
    use super::*;
    use av_agent::{FenceKind, Geofence, Waypoint, WaypointAgent};
    use av_core::LocalFrame;

    fn plan(home: Lla) -> Vec<Waypoint> {
        let frame = LocalFrame::new(home);
        let mut far = Waypoint::new(20.0, frame.to_lla(av_core::Xyz::new(100.0, 100.0, 10.0)));
        far.tcp = [1, 0, 2];
        far.tcp_value = [5.0, 0.0, 1.5];
        vec![Waypoint::new(0.0, home), far]
    }

    #[test]
    fn plans_keep_length_and_annotations() {
        let home_a = Lla::new(37.0, -76.0, 0.0);
        let home_b = Lla::new(37.01, -76.01, 0.0);
        let fence = Geofence {
            id:       1,
            kind:     FenceKind::KeepOut,
            floor:    0.0,
            roof:     500.0,
            vertices: vec![home_b, Lla::new(37.02, -76.01, 0.0), Lla::new(37.02, -76.0, 0.0)],
        };
        let a = WaypointAgent::new(VehicleId(0), "A", home_a).with_plan(plan(home_a));
        let b = WaypointAgent::new(VehicleId(1), "B", home_b).with_plan(plan(home_b)).with_fence(fence);

        let mut env = env_with_limit(2.0);
        env.add_agent(Box::new(a), AgentSpec::default()).unwrap();
        env.add_agent(Box::new(b), AgentSpec::default()).unwrap();
        env.run(&mut crate::NoopObserver).unwrap();

        for agent in env.agents() {
            let core = agent.core();
            assert_eq!(core.home, home_a);
            assert_eq!(core.local_plans.len(), core.plans.len());
            for (local, global) in core.local_plans.iter().zip(&core.plans) {
                assert_eq!(local.len(), global.len());
                for (l, g) in local.iter().zip(global) {
                    assert_eq!(l.time, g.time);
                    assert_eq!(l.tcp, g.tcp);
                    assert_eq!(l.tcp_value, g.tcp_value);
                }
            }
            assert_eq!(core.local_fences.len(), core.fences.len());
            assert_eq!(core.ownship_log.position_local.len(), core.ownship_log.position.len());
        }

        // B's plan starts at its own home, which sits north-west of A's.
        let b_start = env.agents()[1].core().local_plans[0][0].position;
        assert!(b_start.y > 1000.0 && b_start.x < -800.0);
        assert_eq!(env.agents()[1].core().local_fences[0].len(), 3);
    }

    #[test]
    fn traffic_logs_projected_into_common_frame() {
        let mut env = env_with_limit(1.0);
        let (a, _) = ProbeAgent::new(0);
        let (b, _) = ProbeAgent::new(1);
        env.add_agent(Box::new(a), AgentSpec::default()).unwrap();
        env.add_agent(Box::new(b), AgentSpec::default()).unwrap();
        env.run(&mut crate::NoopObserver).unwrap();

        let home = env.home().unwrap();
        let frame = LocalFrame::new(home);
        let b_track = &env.agents()[0].core().traffic_log["P1"];
        assert_eq!(b_track.position_local.len(), b_track.position.len());
        let expect = frame.to_local(b_track.position[0]);
        assert_eq!(b_track.position_local[0], expect);
    }

    #[test]
    fn merge_fixes_loaded_and_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixes.csv");
        std::fs::write(&path, "lat,lon,alt\n37.005,-76.0,100\n37.006,-76.0,100\n").unwrap();

        let mut env = EnvironmentBuilder::new(SimConfig { time_limit: Some(0.5), ..SimConfig::default() })
            .merge_fixes(&path)
            .build()
            .unwrap();
        env.add_agent(Box::new(ProbeAgent::new(0).0), AgentSpec::default()).unwrap();
        env.run(&mut crate::NoopObserver).unwrap();
        let core = env.agents()[0].core();
        assert_eq!(core.merge_fixes.len(), 2);
        assert_eq!(core.local_merge_fixes.len(), 2);
    }

    #[test]
    fn missing_merge_fix_file_fails_run() {
        let mut env = EnvironmentBuilder::new(SimConfig { time_limit: Some(0.5), ..SimConfig::default() })
            .merge_fixes("/nonexistent/fixes.csv")
            .build()
            .unwrap();
        env.add_agent(Box::new(ProbeAgent::new(0).0), AgentSpec::default()).unwrap();
        assert!(matches!(env.run(&mut crate::NoopObserver), Err(crate::SimError::Agent(_))));
    }

    #[test]
    fn write_logs_one_file_per_agent() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = env_with_limit(0.5);
        env.add_agent(Box::new(ProbeAgent::new(0).0), AgentSpec::default()).unwrap();
        env.add_agent(Box::new(ProbeAgent::new(1).0), AgentSpec::default()).unwrap();
        env.run(&mut crate::NoopObserver).unwrap();
        let written = env.write_logs(dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.path().join("simlog-P0.json").exists());
        assert!(dir.path().join("simlog-P1.json").exists());
    }
}
