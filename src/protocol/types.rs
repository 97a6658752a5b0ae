//! # Known Wire Values
//!
//! Closed enumerations for the wire values the decoders recognize.
//!
//! Each enum pairs a `from_value` lookup with a `value` accessor. A raw value
//! with no match is *not* an error at this level: the caller records an
//! `UnrecognizedType` condition, leaves the corresponding field unset and
//! keeps going.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DecodeError;

/// Record an unrecognized wire value without failing the decode.
pub(crate) fn note_unrecognized(field: &'static str, value: u64) {
    debug!(
        error = %DecodeError::UnrecognizedType { field, value },
        "field left unset"
    );
}

/// EtherType values the Ethernet and ARP decoders care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownEtherType {
    Ipv4,
    Arp,
    Rarp,
    VlanTagged,
    Ipv6,
    QinQ,
    Lldp,
}

impl KnownEtherType {
    pub fn from_value(value: u16) -> Option<Self> {
        match value {
            0x0800 => Some(Self::Ipv4),
            0x0806 => Some(Self::Arp),
            0x8035 => Some(Self::Rarp),
            0x8100 => Some(Self::VlanTagged),
            0x86DD => Some(Self::Ipv6),
            0x9100 => Some(Self::QinQ),
            0x88CC => Some(Self::Lldp),
            _ => None,
        }
    }

    pub fn value(self) -> u16 {
        match self {
            Self::Ipv4 => 0x0800,
            Self::Arp => 0x0806,
            Self::Rarp => 0x8035,
            Self::VlanTagged => 0x8100,
            Self::Ipv6 => 0x86DD,
            Self::QinQ => 0x9100,
            Self::Lldp => 0x88CC,
        }
    }
}

/// ARP hardware-type values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownHardwareType {
    Ethernet,
    Ieee802,
}

impl KnownHardwareType {
    pub fn from_value(value: u16) -> Option<Self> {
        match value {
            1 => Some(Self::Ethernet),
            6 => Some(Self::Ieee802),
            _ => None,
        }
    }

    pub fn value(self) -> u16 {
        match self {
            Self::Ethernet => 1,
            Self::Ieee802 => 6,
        }
    }
}

/// ARP operation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArpOperation {
    Request,
    Reply,
    RequestReverse,
    ReplyReverse,
}

impl ArpOperation {
    pub fn from_value(value: u16) -> Option<Self> {
        match value {
            1 => Some(Self::Request),
            2 => Some(Self::Reply),
            3 => Some(Self::RequestReverse),
            4 => Some(Self::ReplyReverse),
            _ => None,
        }
    }

    pub fn value(self) -> u16 {
        match self {
            Self::Request => 1,
            Self::Reply => 2,
            Self::RequestReverse => 3,
            Self::ReplyReverse => 4,
        }
    }
}

/// IP protocol numbers, shared by the IPv4 protocol field and the IPv6
/// next-header chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IpProtocol {
    HopByHopOptions,
    Icmp,
    Igmp,
    Tcp,
    Udp,
    Ipv6Routing,
    Ipv6Fragment,
    Gre,
    Esp,
    AuthenticationHeader,
    Icmpv6,
    NoNextHeader,
    DestinationOptions,
    Ospf,
    Sctp,
    Mobility,
}

impl IpProtocol {
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::HopByHopOptions),
            1 => Some(Self::Icmp),
            2 => Some(Self::Igmp),
            6 => Some(Self::Tcp),
            17 => Some(Self::Udp),
            43 => Some(Self::Ipv6Routing),
            44 => Some(Self::Ipv6Fragment),
            47 => Some(Self::Gre),
            50 => Some(Self::Esp),
            51 => Some(Self::AuthenticationHeader),
            58 => Some(Self::Icmpv6),
            59 => Some(Self::NoNextHeader),
            60 => Some(Self::DestinationOptions),
            89 => Some(Self::Ospf),
            132 => Some(Self::Sctp),
            135 => Some(Self::Mobility),
            _ => None,
        }
    }

    pub fn value(self) -> u8 {
        match self {
            Self::HopByHopOptions => 0,
            Self::Icmp => 1,
            Self::Igmp => 2,
            Self::Tcp => 6,
            Self::Udp => 17,
            Self::Ipv6Routing => 43,
            Self::Ipv6Fragment => 44,
            Self::Gre => 47,
            Self::Esp => 50,
            Self::AuthenticationHeader => 51,
            Self::Icmpv6 => 58,
            Self::NoNextHeader => 59,
            Self::DestinationOptions => 60,
            Self::Ospf => 89,
            Self::Sctp => 132,
            Self::Mobility => 135,
        }
    }
}
