//! # ARP Decoder
//!
//! Decodes an Ethernet payload carrying an Address Resolution Protocol
//! message.
//!
//! The first five fields sit at fixed offsets; the four address fields follow
//! at offsets computed from the just-read hardware and protocol address
//! lengths, so decoding stays correct for non-standard address sizes.
//! Hardware addresses are rendered as colon-separated hex only when the
//! hardware type is Ethernet; protocol addresses are rendered in IP notation
//! only when the protocol type is IPv4 or IPv6.

use bytes::Bytes;
use serde::Serialize;
use std::net::IpAddr;
use tracing::debug;

use crate::core::bits::BitCursor;
use crate::core::frame::{DecodedLayer, LayerInput, PayloadType, ProtocolFamily};
use crate::error::{DecodeError, Result};
use crate::protocol::registry::Decoder;
use crate::protocol::types::{note_unrecognized, ArpOperation, KnownEtherType, KnownHardwareType};
use crate::utils::addr::{format_hw_addr, ip_from_bytes};

/// A decoded ARP layer. Fields that could not be read or rendered stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArpLayer {
    pub hardware_type: Option<KnownHardwareType>,
    pub protocol_type: Option<KnownEtherType>,
    pub hardware_length: Option<u8>,
    pub protocol_length: Option<u8>,
    pub operation: Option<ArpOperation>,
    /// Sender hardware address, colon-separated hex.
    pub source_hardware_address: Option<String>,
    /// Sender protocol address in IP notation.
    pub source_protocol_address: Option<String>,
    /// Target hardware address, colon-separated hex.
    pub destination_hardware_address: Option<String>,
    /// Target protocol address in IP notation.
    pub destination_protocol_address: Option<String>,
    /// Bytes after the last address field; normally padding or empty.
    pub payload: Bytes,
}

impl ArpLayer {
    /// ARP is a terminal layer; it never declares a next payload.
    pub fn next_payload_type(&self) -> Option<PayloadType> {
        None
    }
}

/// Decoder for `{Ethernet, 0x0806}` payloads.
#[derive(Debug, Clone, Default)]
pub struct ArpDecoder;

impl ArpDecoder {
    pub fn new() -> Self {
        Self
    }

    fn read_fields(data: &Bytes, layer: &mut ArpLayer) -> Result<()> {
        let mut cur = BitCursor::new(data);

        let htype = cur.read_u16(16)?;
        layer.hardware_type = KnownHardwareType::from_value(htype);
        if layer.hardware_type.is_none() {
            note_unrecognized("ARP hardware type", u64::from(htype));
        }

        let ptype = cur.read_u16(16)?;
        layer.protocol_type = KnownEtherType::from_value(ptype);
        if layer.protocol_type.is_none() {
            note_unrecognized("ARP protocol type", u64::from(ptype));
        }

        let hlen = cur.read_u8(8)?;
        layer.hardware_length = Some(hlen);
        let plen = cur.read_u8(8)?;
        layer.protocol_length = Some(plen);

        let oper = cur.read_u16(16)?;
        layer.operation = ArpOperation::from_value(oper);
        if layer.operation.is_none() {
            note_unrecognized("ARP operation", u64::from(oper));
        }

        // Address fields are contiguous; each offset is the previous field's
        // end, driven entirely by the two declared lengths.
        let sha = cur.read_bytes(8 * hlen as usize)?;
        let spa = cur.read_bytes(8 * plen as usize)?;
        let tha = cur.read_bytes(8 * hlen as usize)?;
        let tpa = cur.read_bytes(8 * plen as usize)?;
        layer.payload = data.slice(cur.byte_position()..);

        if layer.hardware_type == Some(KnownHardwareType::Ethernet) {
            layer.source_hardware_address = Some(format_hw_addr(&sha));
            layer.destination_hardware_address = Some(format_hw_addr(&tha));
        } else {
            debug!("unknown hardware type, hardware addresses not rendered");
        }

        match layer.protocol_type {
            Some(KnownEtherType::Ipv4) | Some(KnownEtherType::Ipv6) => {
                layer.source_protocol_address =
                    Some(render_proto_addr(layer.protocol_type, &spa)?.to_string());
                layer.destination_protocol_address =
                    Some(render_proto_addr(layer.protocol_type, &tpa)?.to_string());
            }
            _ => debug!("unknown protocol type, protocol addresses not rendered"),
        }
        Ok(())
    }
}

/// Render protocol address bytes, requiring the byte count to agree with the
/// declared protocol type.
fn render_proto_addr(ptype: Option<KnownEtherType>, bytes: &[u8]) -> Result<IpAddr> {
    let addr = ip_from_bytes(bytes)?;
    let consistent = matches!(
        (ptype, addr),
        (Some(KnownEtherType::Ipv4), IpAddr::V4(_)) | (Some(KnownEtherType::Ipv6), IpAddr::V6(_))
    );
    if !consistent {
        return Err(DecodeError::AddressFormat(format!(
            "{}-byte address does not match declared protocol type",
            bytes.len()
        )));
    }
    Ok(addr)
}

impl Decoder for ArpDecoder {
    fn name(&self) -> &'static str {
        "arp"
    }

    fn can_decode(&self, input: &LayerInput) -> bool {
        input.payload_type
            == PayloadType::new(ProtocolFamily::Ethernet, KnownEtherType::Arp.value())
    }

    fn decode(&self, input: &LayerInput) -> Result<DecodedLayer> {
        if !self.can_decode(input) {
            return Err(DecodeError::InputTypeMismatch {
                expected: "ARP over ethernet",
                actual: input.payload_type.to_string(),
            });
        }

        let mut layer = ArpLayer::default();
        if let Err(e) = Self::read_fields(&input.payload, &mut layer) {
            debug!(error = %e, "error while decoding ARP packet");
        }
        Ok(DecodedLayer::Arp(layer))
    }
}
