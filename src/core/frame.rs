//! # Frame & Chain Data Model
//!
//! The types that flow between decoders and the registry.
//!
//! A capture source hands the pipeline a [`RawFrame`]; each decode step
//! consumes a [`LayerInput`] (the previous layer's payload plus its declared
//! payload type) and produces one [`DecodedLayer`]. The registry strings the
//! layers together into a [`PacketChain`].
//!
//! ## Ownership
//! Every object here is created fresh per decode call and owned exclusively by
//! the caller that receives it. Payload fields are [`Bytes`] views into the
//! original frame buffer: cloning them is cheap and never copies packet data.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::protocol::arp::ArpLayer;
use crate::protocol::ethernet::EthernetLayer;
use crate::protocol::ipv4::Ipv4Layer;
use crate::protocol::ipv6::Ipv6Layer;

/// Opaque handle naming the port a frame arrived on.
///
/// Decoders carry this through untouched; only the host that captured the
/// frame knows how to interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId(String);

impl PortId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A raw link-layer frame as delivered by a network device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFrame {
    /// Immutable frame bytes, starting at the destination MAC.
    pub data: Bytes,
    /// Ingress port the frame was captured on.
    pub ingress: PortId,
}

impl RawFrame {
    pub fn new(data: impl Into<Bytes>, ingress: PortId) -> Self {
        Self {
            data: data.into(),
            ingress,
        }
    }
}

/// Protocol family half of the composite dispatch key.
///
/// Names the layer kind that *declared* a payload type: a frame fresh off the
/// wire is `Raw`, an EtherType field belongs to `Ethernet`, an IPv4 protocol
/// field to `Ipv4`, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolFamily {
    Raw,
    Ethernet,
    Ipv4,
    Ipv6,
}

impl fmt::Display for ProtocolFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProtocolFamily::Raw => "raw",
            ProtocolFamily::Ethernet => "ethernet",
            ProtocolFamily::Ipv4 => "ipv4",
            ProtocolFamily::Ipv6 => "ipv6",
        };
        f.write_str(name)
    }
}

/// Composite key the registry uses to pick the next decoder.
///
/// The numeric sub-type is interpreted relative to the family: an EtherType
/// for `Ethernet`, an IP protocol number for `Ipv4`/`Ipv6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayloadType {
    pub family: ProtocolFamily,
    pub sub_type: u16,
}

impl PayloadType {
    pub const fn new(family: ProtocolFamily, sub_type: u16) -> Self {
        Self { family, sub_type }
    }

    /// Key of a frame that has not been decoded at all yet.
    pub const fn raw() -> Self {
        Self::new(ProtocolFamily::Raw, 0)
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {:#06x}}}", self.family, self.sub_type)
    }
}

/// Input to one decode step: the previous layer's payload together with the
/// payload type that layer declared for it.
#[derive(Debug, Clone)]
pub struct LayerInput {
    pub payload: Bytes,
    pub payload_type: PayloadType,
}

impl LayerInput {
    pub fn new(payload: Bytes, payload_type: PayloadType) -> Self {
        Self {
            payload,
            payload_type,
        }
    }

    /// Wrap a raw frame as the first input of a chain.
    pub fn from_frame(frame: &RawFrame) -> Self {
        Self::new(frame.data.clone(), PayloadType::raw())
    }
}

/// One fully or partially decoded protocol layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DecodedLayer {
    Ethernet(EthernetLayer),
    Arp(ArpLayer),
    Ipv4(Ipv4Layer),
    Ipv6(Ipv6Layer),
}

impl DecodedLayer {
    /// Short protocol name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            DecodedLayer::Ethernet(_) => "ethernet",
            DecodedLayer::Arp(_) => "arp",
            DecodedLayer::Ipv4(_) => "ipv4",
            DecodedLayer::Ipv6(_) => "ipv6",
        }
    }

    /// The undecoded remainder this layer hands to the next decoder.
    pub fn payload(&self) -> &Bytes {
        match self {
            DecodedLayer::Ethernet(l) => &l.payload,
            DecodedLayer::Arp(l) => &l.payload,
            DecodedLayer::Ipv4(l) => &l.payload,
            DecodedLayer::Ipv6(l) => &l.payload,
        }
    }

    /// Dispatch key for the payload, if this layer managed to declare one.
    pub fn next_payload_type(&self) -> Option<PayloadType> {
        match self {
            DecodedLayer::Ethernet(l) => l.next_payload_type(),
            DecodedLayer::Arp(l) => l.next_payload_type(),
            DecodedLayer::Ipv4(l) => l.next_payload_type(),
            DecodedLayer::Ipv6(l) => l.next_payload_type(),
        }
    }
}

/// Ordered sequence of decoded layers for one frame, outermost first.
///
/// Built incrementally by the registry; the decoders themselves are unaware
/// of the chain as a whole.
#[derive(Debug, Clone, Serialize)]
pub struct PacketChain {
    pub raw: RawFrame,
    pub layers: Vec<DecodedLayer>,
}

impl PacketChain {
    pub fn new(raw: RawFrame) -> Self {
        Self {
            raw,
            layers: Vec::new(),
        }
    }

    pub fn push(&mut self, layer: DecodedLayer) {
        self.layers.push(layer);
    }

    pub fn last(&self) -> Option<&DecodedLayer> {
        self.layers.last()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
