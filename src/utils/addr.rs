//! # Address Rendering
//!
//! Helpers for turning raw address bytes into their textual forms: MAC
//! addresses as colon-separated hex and IP addresses via the standard
//! dotted/colon notation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::{DecodeError, Result};

/// A 48-bit IEEE 802 MAC address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let octets: [u8; 6] = bytes.try_into().map_err(|_| {
            DecodeError::AddressFormat(format!("expected 6 MAC octets, got {}", bytes.len()))
        })?;
        Ok(Self(octets))
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xFF; 6]
    }

    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

/// Render a hardware address of any declared length as colon-separated hex.
///
/// ARP permits non-standard hardware lengths, so this does not assume six
/// octets the way [`MacAddr`] does.
pub fn format_hw_addr(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(':');
        }
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// Render protocol address bytes as an IP address, picking the family from
/// the byte count.
pub fn ip_from_bytes(bytes: &[u8]) -> Result<IpAddr> {
    if let Ok(octets) = <[u8; 4]>::try_from(bytes) {
        return Ok(IpAddr::V4(Ipv4Addr::from(octets)));
    }
    if let Ok(octets) = <[u8; 16]>::try_from(bytes) {
        return Ok(IpAddr::V6(Ipv6Addr::from(octets)));
    }
    Err(DecodeError::AddressFormat(format!(
        "cannot render {}-byte protocol address as an IP address",
        bytes.len()
    )))
}
