//! The shared channel model and its handle.

use std::cell::RefCell;
use std::rc::Rc;

use av_core::{Lla, SimRng, VehicleId};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{CommsResult, Datagram, PropagationModel, PropagationParams, ReceptionModel, ReceptionParams};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Named channel configuration, as found in a scenario file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelConfig {
    pub propagation:        String,
    pub reception:          String,
    pub propagation_params: PropagationParams,
    pub reception_params:   ReceptionParams,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            propagation:        "NoLoss".to_owned(),
            reception:          "Perfect".to_owned(),
            propagation_params: PropagationParams::default(),
            reception_params:   ReceptionParams::default(),
        }
    }
}

// ── ChannelModel ──────────────────────────────────────────────────────────────

/// A message sitting on the channel, waiting for receivers to poll.
#[derive(Clone, Debug)]
struct Transmission {
    sender:       VehicleId,
    position:     Lla,
    /// `true` when the sender is a radio (ADS-B) endpoint.
    radio:        bool,
    datagram:     Datagram,
    delivered_to: Vec<VehicleId>,
}

/// Per-tick traffic counters, reset by [`ChannelModel::flush`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub transmitted: usize,
    pub delivered:   usize,
    /// Deliveries rejected by the propagation/reception models.
    pub lost:        usize,
}

/// Propagation model + reception model + the current tick's message queue.
#[derive(Debug)]
pub struct ChannelModel {
    propagation: PropagationModel,
    reception:   ReceptionModel,
    rng:         SimRng,
    queue:       Vec<Transmission>,
    stats:       ChannelStats,
}

impl Default for ChannelModel {
    /// Lossless, perfect-reception channel.
    fn default() -> Self {
        Self::new(PropagationModel::default(), ReceptionModel::default(), SimRng::new(0))
    }
}

impl ChannelModel {
    pub fn new(propagation: PropagationModel, reception: ReceptionModel, rng: SimRng) -> Self {
        Self {
            propagation,
            reception,
            rng,
            queue: Vec::new(),
            stats: ChannelStats::default(),
        }
    }

    /// Build a channel from model names, failing fast on anything unknown.
    pub fn from_config(config: &ChannelConfig, seed: u64) -> CommsResult<Self> {
        let propagation =
            PropagationModel::from_name(&config.propagation, config.propagation_params.clone())?;
        let reception = ReceptionModel::from_name(&config.reception, &config.reception_params)?;
        info!("channel: propagation={} reception={}", propagation.name(), reception.name());
        Ok(Self::new(propagation, reception, SimRng::for_stream(seed, 0)))
    }

    pub fn propagation(&self) -> &PropagationModel {
        &self.propagation
    }

    pub fn reception(&self) -> &ReceptionModel {
        &self.reception
    }

    /// Queue a broadcast for this tick.
    pub fn enqueue(&mut self, sender: VehicleId, radio: bool, position: Lla, datagram: Datagram) {
        self.stats.transmitted += 1;
        self.queue.push(Transmission {
            sender,
            position,
            radio,
            datagram,
            delivered_to: Vec::new(),
        });
    }

    /// Hand `receiver` every queued message it can decode at `position`.
    ///
    /// A message is offered at most once to each receiver, and never to its
    /// own sender.  The loss models apply only when both ends are radios.
    pub fn deliver(&mut self, receiver: VehicleId, radio: bool, position: Lla) -> Vec<Datagram> {
        let mut out = Vec::new();
        for tx in &mut self.queue {
            if tx.sender == receiver || tx.delivered_to.contains(&receiver) {
                continue;
            }
            tx.delivered_to.push(receiver);
            let decoded = if radio && tx.radio {
                let power = self.propagation.received_power_w(tx.position, position);
                self.reception.receives(power, &mut self.rng)
            } else {
                true
            };
            if decoded {
                self.stats.delivered += 1;
                out.push(tx.datagram.clone());
            } else {
                self.stats.lost += 1;
            }
        }
        out
    }

    /// Drop every queued message and return (and reset) this tick's counters.
    pub fn flush(&mut self) -> ChannelStats {
        self.queue.clear();
        std::mem::take(&mut self.stats)
    }

    /// Messages currently queued.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

// ── ChannelHandle ─────────────────────────────────────────────────────────────

/// Shared handle to the single channel of a run.
///
/// The environment creates one channel before any vehicle registers and
/// passes clones of this handle into every transmitter and receiver.  The
/// simulation is single-threaded, so `Rc<RefCell<_>>` is all the sharing it
/// needs; borrows never outlive a single call.
#[derive(Clone, Debug)]
pub struct ChannelHandle(Rc<RefCell<ChannelModel>>);

impl ChannelHandle {
    pub fn new(model: ChannelModel) -> Self {
        Self(Rc::new(RefCell::new(model)))
    }

    pub fn enqueue(&self, sender: VehicleId, radio: bool, position: Lla, datagram: Datagram) {
        self.0.borrow_mut().enqueue(sender, radio, position, datagram);
    }

    pub fn deliver(&self, receiver: VehicleId, radio: bool, position: Lla) -> Vec<Datagram> {
        self.0.borrow_mut().deliver(receiver, radio, position)
    }

    pub fn flush(&self) -> ChannelStats {
        self.0.borrow_mut().flush()
    }

    pub fn pending(&self) -> usize {
        self.0.borrow().pending()
    }

    /// Names of the configured (propagation, reception) models.
    pub fn model_names(&self) -> (&'static str, &'static str) {
        let channel = self.0.borrow();
        (channel.propagation().name(), channel.reception().name())
    }

    /// `true` when both handles point at the same channel instance.
    pub fn same_channel(&self, other: &ChannelHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for ChannelHandle {
    fn default() -> Self {
        Self::new(ChannelModel::default())
    }
}
