//! The per-tick V2V exchange.
//!
//! Four strictly ordered passes:
//!
//! 1. **Transmit**: every started, not-complete, broadcast-eligible agent
//!    sends an intruder report; every traffic vehicle does too.
//! 2. **Merge**: arrival records of all agents are aggregated per
//!    intersection and each merger datagram is sent by every
//!    broadcast-eligible agent, whatever its mission state.
//! 3. **Receive**: every started, not-complete agent drains its receiver
//!    and hands the datagrams to the agent, even when there are none.
//! 4. **Flush**: the channel drops whatever is left.
//!
//! All sends happen before any receive, so every receiver sees every sender
//! of the tick regardless of registration order.

use av_agent::Agent;
use av_comms::{aggregate_arrivals, ChannelHandle, ChannelStats, Datagram, Receiver, Transmitter};
use av_traffic::TrafficGenerator;
use log::debug;

/// Subsystem name of the alternate internal message bus.  Agents running it
/// exchange V2V data themselves and never broadcast through the channel.
pub const ALTERNATE_BUS_APP: &str = "SBN";

/// `true` when `agent` may broadcast through the shared channel.
pub fn broadcast_eligible(agent: &dyn Agent) -> bool {
    !agent.core().apps.contains(ALTERNATE_BUS_APP)
}

#[inline]
fn in_flight(agent: &dyn Agent) -> bool {
    let core = agent.core();
    core.is_started() && !core.is_complete()
}

/// Run one tick's exchange at `time`.  `agents`, `transmitters` and
/// `receivers` are parallel slices in registration order.
pub fn exchange(
    time:         f64,
    agents:       &mut [Box<dyn Agent>],
    transmitters: &mut [Box<dyn Transmitter>],
    receivers:    &mut [Box<dyn Receiver>],
    traffic:      &mut TrafficGenerator,
    channel:      &ChannelHandle,
) -> ChannelStats {
    let eligible: Vec<bool> = agents.iter().map(|a| broadcast_eligible(a.as_ref())).collect();

    // ── 1. Transmit ───────────────────────────────────────────────────────
    for ((agent, tx), &ok) in agents.iter().zip(transmitters.iter_mut()).zip(&eligible) {
        if !ok || !in_flight(agent.as_ref()) {
            continue;
        }
        let core = agent.core();
        let datagram = Datagram::intruder(core.callsign.clone(), core.position, core.velocity);
        tx.transmit(time, core.position, datagram);
    }
    traffic.transmit(time);

    // ── 2. Merge ──────────────────────────────────────────────────────────
    let merge_logs = aggregate_arrivals(agents.iter().filter_map(|a| a.core().arrival.as_ref()));
    for log in &merge_logs {
        for ((agent, tx), &ok) in agents.iter().zip(transmitters.iter_mut()).zip(&eligible) {
            if !ok {
                continue;
            }
            let position = agent.core().position;
            tx.transmit(time, position, Datagram::Merger(log.clone()));
        }
    }

    // ── 3. Receive ────────────────────────────────────────────────────────
    for (agent, rx) in agents.iter_mut().zip(receivers.iter_mut()) {
        if !in_flight(agent.as_ref()) {
            continue;
        }
        let data = rx.receive(time, agent.core().position);
        agent.input_v2v_data(time, data);
    }

    // ── 4. Flush ──────────────────────────────────────────────────────────
    let stats = channel.flush();
    debug!(
        "t={time:.3}s: {} sent, {} delivered, {} lost, {} merge logs",
        stats.transmitted,
        stats.delivered,
        stats.lost,
        merge_logs.len()
    );
    stats
}
