//! Per-vehicle transmitter and receiver endpoints.
//!
//! Endpoints are created by the environment when a vehicle registers and are
//! bound to the run's single [`ChannelHandle`] for their whole life.

use std::fmt;
use std::str::FromStr;

use av_core::{Lla, VehicleId};

use crate::{ChannelHandle, CommsError, CommsResult, Datagram};

// ── EndpointKind ──────────────────────────────────────────────────────────────

/// The kinds of V2V endpoint a vehicle can carry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    /// A modeled 1090 MHz radio: subject to the channel's loss models.
    AdsB,
    /// Perfect knowledge of other vehicles' reported state.
    GroundTruth,
    /// No endpoint: never sends, never receives.
    Disabled,
}

impl EndpointKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EndpointKind::AdsB        => "ADS-B",
            EndpointKind::GroundTruth => "GroundTruth",
            EndpointKind::Disabled    => "none",
        }
    }

    #[inline]
    fn is_radio(self) -> bool {
        matches!(self, EndpointKind::AdsB)
    }
}

impl FromStr for EndpointKind {
    type Err = CommsError;

    fn from_str(s: &str) -> CommsResult<Self> {
        match s {
            "ADS-B"           => Ok(EndpointKind::AdsB),
            "GroundTruth"     => Ok(EndpointKind::GroundTruth),
            "none" | "None"   => Ok(EndpointKind::Disabled),
            other => Err(CommsError::UnknownEndpoint(other.to_owned())),
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Traits ────────────────────────────────────────────────────────────────────

/// Sending side of a vehicle's V2V link.
pub trait Transmitter {
    fn kind(&self) -> EndpointKind;

    /// Broadcast `datagram`, sent at `time` from `position`.
    fn transmit(&mut self, time: f64, position: Lla, datagram: Datagram);

    /// The channel this endpoint is bound to, if any.
    fn channel(&self) -> Option<&ChannelHandle> {
        None
    }
}

/// Receiving side of a vehicle's V2V link.
pub trait Receiver {
    fn kind(&self) -> EndpointKind;

    /// Every datagram deliverable to this vehicle at `time` and `position`.
    fn receive(&mut self, time: f64, position: Lla) -> Vec<Datagram>;

    fn channel(&self) -> Option<&ChannelHandle> {
        None
    }
}

// ── Channel-backed endpoints ──────────────────────────────────────────────────

/// A transmitter that queues broadcasts on the shared channel.
pub struct ChannelTransmitter {
    owner:   VehicleId,
    kind:    EndpointKind,
    channel: ChannelHandle,
}

impl Transmitter for ChannelTransmitter {
    fn kind(&self) -> EndpointKind {
        self.kind
    }

    fn transmit(&mut self, _time: f64, position: Lla, datagram: Datagram) {
        self.channel.enqueue(self.owner, self.kind.is_radio(), position, datagram);
    }

    fn channel(&self) -> Option<&ChannelHandle> {
        Some(&self.channel)
    }
}

/// A receiver that polls the shared channel.
pub struct ChannelReceiver {
    owner:   VehicleId,
    kind:    EndpointKind,
    channel: ChannelHandle,
}

impl Receiver for ChannelReceiver {
    fn kind(&self) -> EndpointKind {
        self.kind
    }

    fn receive(&mut self, _time: f64, position: Lla) -> Vec<Datagram> {
        self.channel.deliver(self.owner, self.kind.is_radio(), position)
    }

    fn channel(&self) -> Option<&ChannelHandle> {
        Some(&self.channel)
    }
}

// ── Disabled endpoints ────────────────────────────────────────────────────────

/// Transmitter for vehicles configured without one.
pub struct NullTransmitter;

impl Transmitter for NullTransmitter {
    fn kind(&self) -> EndpointKind {
        EndpointKind::Disabled
    }

    fn transmit(&mut self, _time: f64, _position: Lla, _datagram: Datagram) {}
}

/// Receiver for vehicles configured without one.
pub struct NullReceiver;

impl Receiver for NullReceiver {
    fn kind(&self) -> EndpointKind {
        EndpointKind::Disabled
    }

    fn receive(&mut self, _time: f64, _position: Lla) -> Vec<Datagram> {
        Vec::new()
    }
}

// ── Factories ─────────────────────────────────────────────────────────────────

/// Create a transmitter of `kind` for vehicle `owner`, bound to `channel`.
pub fn make_transmitter(kind: EndpointKind, owner: VehicleId, channel: &ChannelHandle) -> Box<dyn Transmitter> {
    match kind {
        EndpointKind::Disabled => Box::new(NullTransmitter),
        _ => Box::new(ChannelTransmitter { owner, kind, channel: channel.clone() }),
    }
}

/// Create a receiver of `kind` for vehicle `owner`, bound to `channel`.
pub fn make_receiver(kind: EndpointKind, owner: VehicleId, channel: &ChannelHandle) -> Box<dyn Receiver> {
    match kind {
        EndpointKind::Disabled => Box::new(NullReceiver),
        _ => Box::new(ChannelReceiver { owner, kind, channel: channel.clone() }),
    }
}

/// [`make_transmitter`] from a configuration name.
pub fn transmitter_from_name(name: &str, owner: VehicleId, channel: &ChannelHandle) -> CommsResult<Box<dyn Transmitter>> {
    Ok(make_transmitter(name.parse()?, owner, channel))
}

/// [`make_receiver`] from a configuration name.
pub fn receiver_from_name(name: &str, owner: VehicleId, channel: &ChannelHandle) -> CommsResult<Box<dyn Receiver>> {
    Ok(make_receiver(name.parse()?, owner, channel))
}
