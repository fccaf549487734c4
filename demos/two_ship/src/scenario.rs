//! JSON scenario files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use av_agent::{Geofence, Waypoint, WaypointAgent};
use av_comms::ChannelConfig;
use av_core::{IntersectionId, Lla, SimConfig, Uncertainty, VehicleId, WindProfile};
use av_sim::{AgentSpec, Environment, EnvironmentBuilder};
use av_traffic::TrafficSpec;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub sim:             SimConfig,
    #[serde(default)]
    pub channel:         ChannelConfig,
    /// `(direction_deg, speed_mps)` per tick; the last entry holds.
    #[serde(default)]
    pub wind:            Vec<(f64, f64)>,
    /// Global home.  Defaults to the first agent's home.
    pub home:            Option<Lla>,
    /// CSV of `lat,lon,alt` merge fixes, relative to the scenario file.
    pub merge_fixes:     Option<PathBuf>,
    pub agents:          Vec<AgentEntry>,
    #[serde(default)]
    pub traffic:         Vec<TrafficSpec>,
    pub pos_uncertainty: Option<Uncertainty>,
    pub vel_uncertainty: Option<Uncertainty>,
}

#[derive(Debug, Deserialize)]
pub struct AgentEntry {
    pub id:        VehicleId,
    pub callsign:  String,
    pub home:      Lla,
    #[serde(default = "default_speed")]
    pub speed_mps: f64,
    #[serde(default)]
    pub plan:      Vec<Waypoint>,
    #[serde(default)]
    pub fences:    Vec<Geofence>,
    pub arrival:   Option<ArrivalEntry>,
    #[serde(flatten)]
    pub spec:      AgentSpec,
}

#[derive(Debug, Deserialize)]
pub struct ArrivalEntry {
    pub intersection:   IntersectionId,
    pub requested_time: f64,
}

fn default_speed() -> f64 {
    10.0
}

impl Scenario {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        let mut scenario = Self::from_json(&text)
            .with_context(|| format!("parsing scenario {}", path.display()))?;
        if let (Some(fixes), Some(dir)) = (&scenario.merge_fixes, path.parent()) {
            scenario.merge_fixes = Some(dir.join(fixes));
        }
        Ok(scenario)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build a ready-to-run environment holding every agent and traffic
    /// vehicle of the scenario.
    pub fn build(self) -> Result<Environment> {
        let wind = if self.wind.is_empty() { WindProfile::default() } else { self.wind.into() };
        let mut builder = EnvironmentBuilder::new(self.sim).channel(self.channel).wind(wind);
        if let Some(home) = self.home {
            builder = builder.home(home);
        }
        if let Some(path) = self.merge_fixes {
            builder = builder.merge_fixes(path);
        }
        let mut env = builder.build()?;

        for entry in self.agents {
            let mut agent = WaypointAgent::new(entry.id, entry.callsign, entry.home)
                .with_speed(entry.speed_mps)
                .with_plan(entry.plan);
            for fence in entry.fences {
                agent = agent.with_fence(fence);
            }
            if let Some(arrival) = entry.arrival {
                agent = agent.with_arrival(arrival.intersection, arrival.requested_time);
            }
            env.add_agent(Box::new(agent), entry.spec)?;
        }

        let home = env.home().context("scenario has no agents and no home")?;
        for spec in &self.traffic {
            env.add_traffic(spec, home)?;
        }
        if let Some(u) = self.pos_uncertainty {
            env.set_pos_uncertainty(u)?;
        }
        if let Some(u) = self.vel_uncertainty {
            env.set_vel_uncertainty(u)?;
        }
        Ok(env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLED: &str = include_str!("../scenarios/two_ship.json");

    #[test]
    fn bundled_scenario_builds() {
        let env = Scenario::from_json(BUNDLED).unwrap().build().unwrap();
        assert_eq!(env.agents().len(), 2);
        assert_eq!(env.traffic().len(), 1);
        assert_eq!(env.agents()[1].core().fences.len(), 1);
        assert_eq!(env.home(), Some(env.agents()[0].core().home));
    }

    #[test]
    fn minimal_scenario_uses_defaults() {
        let json = r#"{ "agents": [ { "id": 3, "callsign": "M3", "home": { "lat": 1.0, "lon": 2.0, "alt": 0.0 } } ] }"#;
        let scenario = Scenario::from_json(json).unwrap();
        assert_eq!(scenario.sim, SimConfig::default());
        assert_eq!(scenario.agents[0].spec, AgentSpec::default());
        assert_eq!(scenario.agents[0].speed_mps, 10.0);
    }

    #[test]
    fn unknown_channel_model_rejected() {
        let json = r#"{ "channel": { "propagation": "Smoke" }, "agents": [] }"#;
        assert!(Scenario::from_json(json).unwrap().build().is_err());
    }

    #[test]
    fn unknown_channel_key_rejected() {
        let json = r#"{ "channel": { "propagation": "NoLoss", "latency_s": 0.01 }, "agents": [] }"#;
        assert!(Scenario::from_json(json).is_err());
    }

    #[test]
    fn unknown_field_rejected() {
        assert!(Scenario::from_json(r#"{ "agents": [], "speed": 3 }"#).is_err());
    }
}
