//! # IPv6 Decoder
//!
//! Decodes an Ethernet payload carrying an IPv6 datagram: the fixed 40-byte
//! base header, then a walk down the extension-header chain until a terminal
//! upper-layer protocol is reached.
//!
//! ## Extension-header framing
//! Real-world extension headers do not share one length convention, so each
//! known type is framed explicitly instead of assuming uniform "8 + 8·len"
//! arithmetic:
//!
//! | type                                  | total span (bytes) |
//! |---------------------------------------|--------------------|
//! | Hop-by-Hop, Routing, Dest Opts, Mobility | 8 + 8·len       |
//! | Fragment                              | 8 (length byte is reserved) |
//! | Authentication Header                 | 4·(len + 2)        |
//!
//! ESP (opaque past its header), No Next Header, unrecognized values and all
//! upper-layer protocols (TCP, UDP, ICMPv6, ...) terminate the walk. Every
//! consumed header advances the offset by at least 8 bytes, so the walk always
//! terminates; a configurable header-count cap bounds it further.

use bytes::Bytes;
use serde::Serialize;
use std::net::Ipv6Addr;
use tracing::debug;

use crate::config::DecodeConfig;
use crate::core::bits::BitCursor;
use crate::core::frame::{DecodedLayer, LayerInput, PayloadType, ProtocolFamily};
use crate::error::{DecodeError, Result};
use crate::protocol::registry::Decoder;
use crate::protocol::types::{note_unrecognized, IpProtocol, KnownEtherType};

/// Default cap on the number of extension headers walked per packet.
pub const DEFAULT_MAX_EXTENSION_HEADERS: usize = 16;

/// One collected extension header, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionHeader {
    /// The next-header value that announced this header.
    pub header_type: IpProtocol,
    /// The raw 8-bit length field (reserved and therefore 0-meaning for the
    /// Fragment header; 4-byte units for AH; 8-byte units otherwise).
    pub length: u8,
    /// Header bytes after the 2-byte next-header/length prefix.
    pub data: Bytes,
}

/// A decoded IPv6 layer. Fields that could not be read stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ipv6Layer {
    pub version: Option<u8>,
    pub dscp: Option<u8>,
    pub ecn: Option<u8>,
    pub flow_label: Option<u32>,
    pub payload_length: Option<u16>,
    /// The next-header value left after walking the extension chain; the
    /// upper-layer protocol when recognized.
    pub next_header: Option<IpProtocol>,
    pub hop_limit: Option<u8>,
    pub source: Option<Ipv6Addr>,
    pub destination: Option<Ipv6Addr>,
    /// Extension headers in wire order.
    pub extension_headers: Vec<ExtensionHeader>,
    /// Everything after the last consumed header.
    pub payload: Bytes,
}

impl Ipv6Layer {
    pub fn next_payload_type(&self) -> Option<PayloadType> {
        self.next_header
            .map(|p| PayloadType::new(ProtocolFamily::Ipv6, u16::from(p.value())))
    }
}

/// Whether a next-header value names a walkable extension header.
fn is_extension(proto: IpProtocol) -> bool {
    matches!(
        proto,
        IpProtocol::HopByHopOptions
            | IpProtocol::Ipv6Routing
            | IpProtocol::Ipv6Fragment
            | IpProtocol::AuthenticationHeader
            | IpProtocol::DestinationOptions
            | IpProtocol::Mobility
    )
}

/// Total span in bytes of an extension header, including its 2-byte prefix.
fn extension_span(proto: IpProtocol, length: u8) -> usize {
    match proto {
        IpProtocol::Ipv6Fragment => 8,
        IpProtocol::AuthenticationHeader => 4 * (usize::from(length) + 2),
        _ => 8 + 8 * usize::from(length),
    }
}

fn read_v6_addr(cur: &mut BitCursor<'_>) -> Result<Ipv6Addr> {
    let octets: [u8; 16] = cur
        .read_bytes(128)?
        .try_into()
        .map_err(|_| DecodeError::AddressFormat("IPv6 address read was not 16 bytes".into()))?;
    Ok(Ipv6Addr::from(octets))
}

/// Decoder for `{Ethernet, 0x86DD}` payloads.
#[derive(Debug, Clone)]
pub struct Ipv6Decoder {
    max_extension_headers: usize,
}

impl Default for Ipv6Decoder {
    fn default() -> Self {
        Self {
            max_extension_headers: DEFAULT_MAX_EXTENSION_HEADERS,
        }
    }
}

impl Ipv6Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &DecodeConfig) -> Self {
        Self {
            max_extension_headers: config.ipv6.max_extension_headers,
        }
    }

    fn read_fields(&self, data: &Bytes, layer: &mut Ipv6Layer) -> Result<()> {
        let mut cur = BitCursor::new(data);

        let version = cur.read_u8(4)?;
        layer.version = Some(version);
        if version != 6 {
            debug!(version, "IPv6 version field should be 6");
        }

        layer.dscp = Some(cur.read_u8(6)?);
        layer.ecn = Some(cur.read_u8(2)?);
        layer.flow_label = Some(cur.read_u32(20)?);
        layer.payload_length = Some(cur.read_u16(16)?);

        let first_nh = cur.read_u8(8)?;
        layer.next_header = IpProtocol::from_value(first_nh);
        if layer.next_header.is_none() {
            note_unrecognized("IPv6 next-header", u64::from(first_nh));
        }

        layer.hop_limit = Some(cur.read_u8(8)?);

        layer.source = Some(read_v6_addr(&mut cur)?);
        layer.destination = Some(read_v6_addr(&mut cur)?);

        self.walk_extensions(data, &mut cur, layer);
        layer.payload = data.slice(cur.byte_position()..);
        Ok(())
    }

    /// Walk the extension-header chain starting at the cursor position.
    ///
    /// The cursor only advances past headers that fit entirely in the buffer;
    /// on truncation it is left at the start of the unsatisfiable header so
    /// the payload view still begins after the last header consumed.
    fn walk_extensions(&self, data: &Bytes, cur: &mut BitCursor<'_>, layer: &mut Ipv6Layer) {
        while let Some(announced) = layer.next_header {
            if !is_extension(announced) {
                break;
            }
            if layer.extension_headers.len() >= self.max_extension_headers {
                debug!(
                    cap = self.max_extension_headers,
                    "extension-header cap reached, stopping walk"
                );
                break;
            }

            let mut trial = cur.clone();
            let consumed = (|| -> Result<(u8, ExtensionHeader)> {
                let next_value = trial.read_u8(8)?;
                let length = trial.read_u8(8)?;
                let span = extension_span(announced, length);
                let start = trial.byte_position();
                trial.skip((span - 2) * 8)?;
                Ok((
                    next_value,
                    ExtensionHeader {
                        header_type: announced,
                        length,
                        data: data.slice(start..trial.byte_position()),
                    },
                ))
            })();

            match consumed {
                Ok((next_value, header)) => {
                    layer.extension_headers.push(header);
                    layer.next_header = IpProtocol::from_value(next_value);
                    if layer.next_header.is_none() {
                        note_unrecognized("IPv6 next-header", u64::from(next_value));
                    }
                    *cur = trial;
                }
                Err(e) => {
                    debug!(error = %e, header = ?announced, "truncated IPv6 extension header");
                    break;
                }
            }
        }
    }
}

impl Decoder for Ipv6Decoder {
    fn name(&self) -> &'static str {
        "ipv6"
    }

    fn can_decode(&self, input: &LayerInput) -> bool {
        input.payload_type
            == PayloadType::new(ProtocolFamily::Ethernet, KnownEtherType::Ipv6.value())
    }

    fn decode(&self, input: &LayerInput) -> Result<DecodedLayer> {
        if !self.can_decode(input) {
            return Err(DecodeError::InputTypeMismatch {
                expected: "IPv6 over ethernet",
                actual: input.payload_type.to_string(),
            });
        }

        let mut layer = Ipv6Layer::default();
        if let Err(e) = self.read_fields(&input.payload, &mut layer) {
            debug!(error = %e, "error while decoding IPv6 packet");
        }
        Ok(DecodedLayer::Ipv6(layer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ipv6_input(data: Vec<u8>) -> LayerInput {
        LayerInput::new(
            Bytes::from(data),
            PayloadType::new(ProtocolFamily::Ethernet, 0x86DD),
        )
    }

    fn decode(data: Vec<u8>) -> Ipv6Layer {
        match Ipv6Decoder::new().decode(&ipv6_input(data)).unwrap() {
            DecodedLayer::Ipv6(l) => l,
            other => panic!("expected ipv6 layer, got {}", other.name()),
        }
    }

    /// 40-byte base header with the given next-header and payload length.
    fn base_header(next_header: u8, payload_length: u16) -> Vec<u8> {
        let mut hdr = vec![
            0x60, 0x00, 0x00, 0x00, // version 6, tc 0, flow 0
        ];
        hdr.extend_from_slice(&payload_length.to_be_bytes());
        hdr.push(next_header);
        hdr.push(64); // hop limit
        hdr.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]); // ::1
        hdr.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2]); // ::2
        hdr
    }

    #[test]
    fn base_header_without_extensions() {
        let mut data = base_header(17, 2);
        data.extend_from_slice(&[0xAA, 0xBB]);
        let layer = decode(data);

        assert_eq!(layer.version, Some(6));
        assert_eq!(layer.dscp, Some(0));
        assert_eq!(layer.ecn, Some(0));
        assert_eq!(layer.flow_label, Some(0));
        assert_eq!(layer.payload_length, Some(2));
        assert_eq!(layer.next_header, Some(IpProtocol::Udp));
        assert_eq!(layer.hop_limit, Some(64));
        assert_eq!(layer.source.unwrap().to_string(), "::1");
        assert_eq!(layer.destination.unwrap().to_string(), "::2");
        assert!(layer.extension_headers.is_empty());
        assert_eq!(&layer.payload[..], &[0xAA, 0xBB]);
        assert_eq!(
            layer.next_payload_type(),
            Some(PayloadType::new(ProtocolFamily::Ipv6, 17))
        );
    }

    #[test]
    fn traffic_class_and_flow_label() {
        let mut data = base_header(6, 0);
        // dscp 46, ecn 1, flow label 0xABCDE
        data[0] = 0x6B;
        data[1] = 0x9A;
        data[2] = 0xBC;
        data[3] = 0xDE;
        let layer = decode(data);
        assert_eq!(layer.dscp, Some(46));
        assert_eq!(layer.ecn, Some(1));
        assert_eq!(layer.flow_label, Some(0xABCDE));
    }

    #[test]
    fn hop_by_hop_then_routing_then_tcp() {
        let mut data = base_header(0, 26); // hop-by-hop first
        // hop-by-hop: next 43 (routing), len 0 -> 8 bytes total
        data.extend_from_slice(&[43, 0, 1, 2, 3, 4, 5, 6]);
        // routing: next 6 (TCP), len 1 -> 16 bytes total
        data.extend_from_slice(&[6, 1, 0, 0, 0, 0, 0, 0]);
        data.extend_from_slice(&[9, 9, 9, 9, 9, 9, 9, 9]);
        data.extend_from_slice(&[0xCA, 0xFE]);
        let layer = decode(data);

        assert_eq!(layer.extension_headers.len(), 2);
        let hbh = &layer.extension_headers[0];
        assert_eq!(hbh.header_type, IpProtocol::HopByHopOptions);
        assert_eq!(hbh.length, 0);
        assert_eq!(&hbh.data[..], &[1, 2, 3, 4, 5, 6]);
        let routing = &layer.extension_headers[1];
        assert_eq!(routing.header_type, IpProtocol::Ipv6Routing);
        assert_eq!(routing.length, 1);
        assert_eq!(routing.data.len(), 14);
        assert_eq!(layer.next_header, Some(IpProtocol::Tcp));
        assert_eq!(&layer.payload[..], &[0xCA, 0xFE]);
    }

    #[test]
    fn fragment_header_span_is_fixed() {
        let mut data = base_header(44, 12);
        // fragment: next 17 (UDP), reserved byte nonzero, offset/id bytes.
        data.extend_from_slice(&[17, 0xFF, 0x00, 0x08, 0xDE, 0xAD, 0xBE, 0xEF]);
        data.extend_from_slice(&[0x01, 0x02]);
        let layer = decode(data);

        assert_eq!(layer.extension_headers.len(), 1);
        let frag = &layer.extension_headers[0];
        assert_eq!(frag.header_type, IpProtocol::Ipv6Fragment);
        // The second byte is reserved; it must not stretch the span.
        assert_eq!(frag.length, 0xFF);
        assert_eq!(&frag.data[..], &[0x00, 0x08, 0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(layer.next_header, Some(IpProtocol::Udp));
        assert_eq!(&layer.payload[..], &[0x01, 0x02]);
    }

    #[test]
    fn authentication_header_uses_four_byte_units() {
        let mut data = base_header(51, 14);
        // AH: next 6 (TCP), len 1 -> span 4*(1+2) = 12 bytes
        data.extend_from_slice(&[6, 1, 0, 0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88]);
        data.extend_from_slice(&[0x0A, 0x0B]);
        let layer = decode(data);

        assert_eq!(layer.extension_headers.len(), 1);
        assert_eq!(layer.extension_headers[0].data.len(), 10);
        assert_eq!(layer.next_header, Some(IpProtocol::Tcp));
        assert_eq!(&layer.payload[..], &[0x0A, 0x0B]);
    }

    #[test]
    fn esp_terminates_the_walk() {
        let mut data = base_header(50, 8);
        data.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x11, 0x22, 0x33]);
        let layer = decode(data);
        assert!(layer.extension_headers.is_empty());
        assert_eq!(layer.next_header, Some(IpProtocol::Esp));
        assert_eq!(layer.payload.len(), 8);
    }

    #[test]
    fn icmpv6_is_upper_layer_not_extension() {
        let mut data = base_header(58, 4);
        data.extend_from_slice(&[0x80, 0x00, 0x00, 0x00]);
        let layer = decode(data);
        assert!(layer.extension_headers.is_empty());
        assert_eq!(layer.next_header, Some(IpProtocol::Icmpv6));
        assert_eq!(
            layer.next_payload_type(),
            Some(PayloadType::new(ProtocolFamily::Ipv6, 58))
        );
    }

    #[test]
    fn unrecognized_next_header_stops_walk() {
        let mut data = base_header(0, 10);
        // hop-by-hop announcing protocol 143, which this crate does not know.
        data.extend_from_slice(&[143, 0, 0, 0, 0, 0, 0, 0]);
        data.extend_from_slice(&[0xEE, 0xFF]);
        let layer = decode(data);
        assert_eq!(layer.extension_headers.len(), 1);
        assert_eq!(layer.next_header, None);
        assert_eq!(layer.next_payload_type(), None);
        assert_eq!(&layer.payload[..], &[0xEE, 0xFF]);
    }

    #[test]
    fn truncated_extension_keeps_earlier_headers() {
        let mut data = base_header(0, 24);
        // First hop-by-hop fits.
        data.extend_from_slice(&[60, 0, 1, 2, 3, 4, 5, 6]);
        // Destination options claims 3 more 8-byte units than remain.
        data.extend_from_slice(&[6, 3, 0, 0]);
        let layer = decode(data);

        assert_eq!(layer.extension_headers.len(), 1);
        assert_eq!(
            layer.extension_headers[0].header_type,
            IpProtocol::HopByHopOptions
        );
        // The walk stopped at the start of the unsatisfiable header.
        assert_eq!(layer.next_header, Some(IpProtocol::DestinationOptions));
        assert_eq!(&layer.payload[..], &[6, 3, 0, 0]);
    }

    #[test]
    fn header_cap_bounds_the_walk() {
        let config =
            DecodeConfig::default_with_overrides(|c| c.ipv6.max_extension_headers = 2);
        let decoder = Ipv6Decoder::with_config(&config);

        let mut data = base_header(0, 40);
        for _ in 0..4 {
            // Each hop-by-hop announces another hop-by-hop.
            data.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0]);
        }
        data.extend_from_slice(&[6, 0, 0, 0, 0, 0, 0, 0]);
        let layer = match decoder.decode(&ipv6_input(data)).unwrap() {
            DecodedLayer::Ipv6(l) => l,
            other => panic!("expected ipv6 layer, got {}", other.name()),
        };
        assert_eq!(layer.extension_headers.len(), 2);
        assert_eq!(layer.next_header, Some(IpProtocol::HopByHopOptions));
    }

    #[test]
    fn truncated_base_header_keeps_earlier_fields() {
        let layer = decode(base_header(17, 0)[..20].to_vec());
        assert_eq!(layer.version, Some(6));
        assert_eq!(layer.next_header, Some(IpProtocol::Udp));
        assert_eq!(layer.source, None);
        assert_eq!(layer.destination, None);
        assert!(layer.payload.is_empty());
    }

    #[test]
    fn wrong_input_kind_is_declined() {
        let input = LayerInput::new(Bytes::from(base_header(17, 0)), PayloadType::raw());
        assert!(matches!(
            Ipv6Decoder::new().decode(&input).unwrap_err(),
            DecodeError::InputTypeMismatch { .. }
        ));
    }
}
