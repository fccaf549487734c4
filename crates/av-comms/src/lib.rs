//! `av-comms` — the modeled vehicle-to-vehicle broadcast channel.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                     |
//! |-----------------|--------------------------------------------------------------|
//! | [`datagram`]    | `Datagram` (`Intruder` / `Merger`), `ArrivalRecord`, `MAX_NODES` |
//! | [`propagation`] | `PropagationModel`: `NoLoss`, `FreeSpace`, `TwoRayGround`    |
//! | [`reception`]   | `ReceptionModel`: `Perfect`, `Deterministic`, `Rayleigh`, `Nakagami` |
//! | [`channel`]     | `ChannelModel`, `ChannelHandle`, `ChannelConfig`, `ChannelStats` |
//! | [`endpoint`]    | `Transmitter` / `Receiver` traits, `EndpointKind`, factories |
//! | [`merge`]       | `aggregate_arrivals`: arrival records → merger datagrams    |
//! | [`error`]       | `CommsError`, `CommsResult<T>`                               |
//!
//! # Delivery model
//!
//! Transmissions are queued on the shared [`ChannelModel`] during a tick.
//! Each receiver then polls the channel once; a queued message is handed to
//! every receiver other than its sender whose time has reached the message's
//! delivery time and, for radio links, whose propagation and reception
//! models accept it.  [`ChannelModel::flush`] empties the queue at the end of
//! every tick, so nothing carries over into the next tick.

pub mod channel;
pub mod datagram;
pub mod endpoint;
pub mod error;
pub mod merge;
pub mod propagation;
pub mod reception;


pub use channel::{ChannelConfig, ChannelHandle, ChannelModel, ChannelStats};
pub use datagram::{ArrivalRecord, Datagram, IntruderReport, MergeLog, NodeRole, MAX_NODES};
pub use endpoint::{
    make_receiver, make_transmitter, receiver_from_name, transmitter_from_name, EndpointKind,
    Receiver, Transmitter,
};
pub use error::{CommsError, CommsResult};
pub use merge::aggregate_arrivals;
pub use propagation::{PropagationModel, PropagationParams};
pub use reception::{ReceptionModel, ReceptionParams};
