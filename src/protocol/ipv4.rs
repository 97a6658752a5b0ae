//! # IPv4 Decoder
//!
//! Decodes an Ethernet payload carrying an IPv4 datagram: the fixed 20-byte
//! base header, the optional options run declared by the IHL field, and the
//! payload view.
//!
//! Checksums are extracted but not verified; locating field boundaries is
//! this crate's whole job.

use bytes::Bytes;
use serde::Serialize;
use std::net::Ipv4Addr;
use tracing::debug;

use crate::core::bits::BitCursor;
use crate::core::frame::{DecodedLayer, LayerInput, PayloadType, ProtocolFamily};
use crate::error::{DecodeError, Result};
use crate::protocol::registry::Decoder;
use crate::protocol::types::{note_unrecognized, IpProtocol, KnownEtherType};

/// A decoded IPv4 layer. Fields that could not be read stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ipv4Layer {
    pub version: Option<u8>,
    /// Header length in 32-bit words.
    pub ihl: Option<u8>,
    pub dscp: Option<u8>,
    pub ecn: Option<u8>,
    pub total_length: Option<u16>,
    pub identification: Option<u16>,
    pub reserved_flag: Option<bool>,
    pub dont_fragment: Option<bool>,
    pub more_fragments: Option<bool>,
    pub fragment_offset: Option<u16>,
    pub ttl: Option<u8>,
    pub protocol: Option<IpProtocol>,
    pub checksum: Option<u16>,
    pub source: Option<Ipv4Addr>,
    pub destination: Option<Ipv4Addr>,
    /// Raw options bytes; present only when IHL > 5.
    pub options: Option<Bytes>,
    /// Everything after the fixed header and options.
    pub payload: Bytes,
}

impl Ipv4Layer {
    pub fn next_payload_type(&self) -> Option<PayloadType> {
        self.protocol
            .map(|p| PayloadType::new(ProtocolFamily::Ipv4, u16::from(p.value())))
    }
}

/// Decoder for `{Ethernet, 0x0800}` payloads.
#[derive(Debug, Clone, Default)]
pub struct Ipv4Decoder;

impl Ipv4Decoder {
    pub fn new() -> Self {
        Self
    }

    fn read_fields(data: &Bytes, layer: &mut Ipv4Layer) -> Result<()> {
        let mut cur = BitCursor::new(data);

        let version = cur.read_u8(4)?;
        layer.version = Some(version);
        if version != 4 {
            debug!(version, "IPv4 version field should be 4");
        }

        let ihl = cur.read_u8(4)?;
        layer.ihl = Some(ihl);
        layer.dscp = Some(cur.read_u8(6)?);
        layer.ecn = Some(cur.read_u8(2)?);
        layer.total_length = Some(cur.read_u16(16)?);
        layer.identification = Some(cur.read_u16(16)?);

        let reserved = cur.read_bool()?;
        layer.reserved_flag = Some(reserved);
        if reserved {
            debug!("IPv4 reserved flag should be 0, but is 1");
        }
        layer.dont_fragment = Some(cur.read_bool()?);
        layer.more_fragments = Some(cur.read_bool()?);
        layer.fragment_offset = Some(cur.read_u16(13)?);

        layer.ttl = Some(cur.read_u8(8)?);
        let proto = cur.read_u8(8)?;
        layer.protocol = IpProtocol::from_value(proto);
        if layer.protocol.is_none() {
            note_unrecognized("IPv4 protocol", u64::from(proto));
        }
        layer.checksum = Some(cur.read_u16(16)?);
        layer.source = Some(Ipv4Addr::from(cur.read_u32(32)?));
        layer.destination = Some(Ipv4Addr::from(cur.read_u32(32)?));

        // Options occupy (IHL - 5) words right after the fixed header.
        let options_bits = usize::from(ihl.saturating_sub(5)) * 32;
        if options_bits > 0 {
            let start = cur.byte_position();
            cur.skip(options_bits)?;
            layer.options = Some(data.slice(start..cur.byte_position()));
        }

        layer.payload = data.slice(cur.byte_position()..);
        Ok(())
    }
}

impl Decoder for Ipv4Decoder {
    fn name(&self) -> &'static str {
        "ipv4"
    }

    fn can_decode(&self, input: &LayerInput) -> bool {
        input.payload_type
            == PayloadType::new(ProtocolFamily::Ethernet, KnownEtherType::Ipv4.value())
    }

    fn decode(&self, input: &LayerInput) -> Result<DecodedLayer> {
        if !self.can_decode(input) {
            return Err(DecodeError::InputTypeMismatch {
                expected: "IPv4 over ethernet",
                actual: input.payload_type.to_string(),
            });
        }

        let mut layer = Ipv4Layer::default();
        if let Err(e) = Self::read_fields(&input.payload, &mut layer) {
            debug!(error = %e, "error while decoding IPv4 packet");
        }
        Ok(DecodedLayer::Ipv4(layer))
    }
}
