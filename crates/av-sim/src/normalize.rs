//! Post-run coordinate normalization.
//!
//! Every agent's logged geodetic data is re-projected into one local frame:
//! the projection of the first registered agent, anchored at the run's
//! global home.  Lists keep their order and length; flight-plan waypoints
//! keep their time and trajectory-change fields.

use std::collections::BTreeMap;

use av_agent::{Agent, AgentCore, LocalWaypoint};
use av_core::{Lla, Xyz};

/// Local-frame replacements for one agent's logs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocalLogs {
    pub ownship:     Vec<Xyz>,
    pub traffic:     BTreeMap<String, Vec<Xyz>>,
    pub plans:       Vec<Vec<LocalWaypoint>>,
    pub fences:      Vec<Vec<Xyz>>,
    pub merge_fixes: Vec<Xyz>,
}

impl LocalLogs {
    /// Project every geodetic quantity in `core` through `to_local`.
    pub fn project(core: &AgentCore, to_local: impl Fn(Lla) -> Xyz) -> Self {
        Self {
            ownship: core.ownship_log.position.iter().map(|&p| to_local(p)).collect(),
            traffic: core
                .traffic_log
                .iter()
                .map(|(callsign, track)| {
                    (callsign.clone(), track.position.iter().map(|&p| to_local(p)).collect())
                })
                .collect(),
            plans: core
                .plans
                .iter()
                .map(|plan| plan.iter().map(|wp| wp.localize(to_local(wp.position))).collect())
                .collect(),
            fences: core
                .fences
                .iter()
                .map(|fence| fence.vertices.iter().map(|&v| to_local(v)).collect())
                .collect(),
            merge_fixes: core.merge_fixes.iter().map(|&p| to_local(p)).collect(),
        }
    }

    /// Store the projected logs in `core` and re-anchor it at `home`.
    pub fn apply(self, core: &mut AgentCore, home: Lla) {
        core.home = home;
        core.ownship_log.position_local = self.ownship;
        for (callsign, local) in self.traffic {
            if let Some(track) = core.traffic_log.get_mut(&callsign) {
                track.position_local = local;
            }
        }
        core.local_plans = self.plans;
        core.local_fences = self.fences;
        core.local_merge_fixes = self.merge_fixes;
    }
}

/// Normalize every agent's logs into the frame of `agents[0]` anchored at
/// `home`.  No-op for an empty slice.
pub fn normalize_logs(agents: &mut [Box<dyn Agent>], home: Lla) {
    let Some(first) = agents.first() else {
        return;
    };
    let projector: &dyn Agent = first.as_ref();
    let projected: Vec<LocalLogs> = agents
        .iter()
        .map(|a| LocalLogs::project(a.core(), |p| projector.to_local(home, p)))
        .collect();

    for (agent, logs) in agents.iter_mut().zip(projected) {
        logs.apply(agent.core_mut(), home);
    }
}
