//! # Ethernet Decoder
//!
//! Decodes a raw link-layer frame into MAC addresses, zero or more 802.1Q
//! VLAN tags, the EtherType/length discriminator and the payload view.
//!
//! ## Wire Layout
//! ```text
//! [dst MAC(6)] [src MAC(6)] [tag(4)]* [EtherType-or-Length(2)] [payload(N)] [FCS(4)?]
//! ```
//!
//! Tags chain: a 16-bit value of 0x8100 (802.1Q) or 0x9100 (QinQ outer)
//! announces a tag, whose own trailing 16-bit value may announce another. The
//! first non-tag value is the discriminator: ≥ 1536 is an EtherType, values
//! inside `[64, 1500]` are an 802.3 length field, anything else is malformed
//! but non-fatal.
//!
//! Frame checksums are only present when the capture path preserves them, so
//! FCS trimming is opt-in via [`crate::config::EthernetConfig::trim_fcs`].

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::config::DecodeConfig;
use crate::core::bits::BitCursor;
use crate::core::frame::{DecodedLayer, LayerInput, PayloadType, ProtocolFamily};
use crate::error::{DecodeError, Result};
use crate::protocol::registry::Decoder;
use crate::protocol::types::{note_unrecognized, KnownEtherType};
use crate::utils::addr::MacAddr;

/// Smallest discriminator value that denotes an EtherType.
pub const ETHERTYPE_MIN: u16 = 1536;
/// Smallest discriminator value that denotes an 802.3 length field.
pub const LENGTH_MIN: u16 = 64;
/// Largest discriminator value that denotes an 802.3 length field.
pub const LENGTH_MAX: u16 = 1500;
/// 802.1Q tag protocol identifier.
pub const TPID_8021Q: u16 = 0x8100;
/// QinQ (802.1ad predecessor) outer tag protocol identifier.
pub const TPID_QINQ: u16 = 0x9100;

/// One 802.1Q VLAN tag, as found between the source MAC and the EtherType.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VlanTag {
    /// Tag protocol identifier that announced this tag (0x8100 or 0x9100).
    pub tpid: u16,
    /// Priority code point, 3 bits.
    pub priority: u8,
    /// Drop eligible indicator.
    pub drop_eligible: bool,
    /// VLAN identifier, 12 bits.
    pub vlan_id: u16,
}

/// A decoded Ethernet layer. Fields that could not be read stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EthernetLayer {
    pub destination: Option<MacAddr>,
    pub source: Option<MacAddr>,
    /// VLAN tags in wire order, outermost first. Empty when untagged.
    pub vlan_tags: Vec<VlanTag>,
    /// Discriminator when it denoted an EtherType (≥ 1536). Kept numeric so
    /// the dispatch key survives EtherTypes this crate does not recognize.
    pub ethertype: Option<u16>,
    /// Discriminator when it denoted an 802.3 length field.
    pub length: Option<u16>,
    /// Trailing frame checksum, when FCS trimming is enabled.
    pub crc: Option<u32>,
    /// Everything after the discriminator (and before the FCS, if trimmed).
    pub payload: Bytes,
}

impl EthernetLayer {
    /// The EtherType as a known value, when recognized.
    pub fn known_ethertype(&self) -> Option<KnownEtherType> {
        self.ethertype.and_then(KnownEtherType::from_value)
    }

    pub fn next_payload_type(&self) -> Option<PayloadType> {
        self.ethertype
            .map(|ty| PayloadType::new(ProtocolFamily::Ethernet, ty))
    }
}

/// Decoder for raw frames believed to start with an Ethernet header.
#[derive(Debug, Clone, Default)]
pub struct EthernetDecoder {
    trim_fcs: bool,
}

impl EthernetDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &DecodeConfig) -> Self {
        Self {
            trim_fcs: config.ethernet.trim_fcs,
        }
    }

    fn read_fields(&self, data: &Bytes, layer: &mut EthernetLayer) -> Result<()> {
        let mut cur = BitCursor::new(data);

        layer.destination = Some(MacAddr::from_bytes(&cur.read_bytes(48)?)?);
        layer.source = Some(MacAddr::from_bytes(&cur.read_bytes(48)?)?);

        // 0, 1 (802.1Q) or 2 (QinQ outer + inner) tags fall out of re-reading
        // the 16-bit field until it is no longer a tag protocol identifier.
        let mut next_field = cur.read_u16(16)?;
        while next_field == TPID_8021Q || next_field == TPID_QINQ {
            let priority = cur.read_u8(3)?;
            let drop_eligible = cur.read_bool()?;
            let vlan_id = cur.read_u16(12)?;
            layer.vlan_tags.push(VlanTag {
                tpid: next_field,
                priority,
                drop_eligible,
                vlan_id,
            });
            next_field = cur.read_u16(16)?;
        }

        if next_field >= ETHERTYPE_MIN {
            layer.ethertype = Some(next_field);
            if KnownEtherType::from_value(next_field).is_none() {
                note_unrecognized("EtherType", u64::from(next_field));
            }
        } else if (LENGTH_MIN..=LENGTH_MAX).contains(&next_field) {
            layer.length = Some(next_field);
        } else {
            debug!(
                value = next_field,
                "discriminator is neither a valid EtherType nor a length field"
            );
        }

        // Cursor sits right after the discriminator: byte 14 + 4 per tag.
        let payload_start = cur.byte_position();
        let mut payload_end = data.len();
        if self.trim_fcs && payload_end >= payload_start + 4 {
            cur.seek((payload_end - 4) * 8);
            layer.crc = Some(cur.read_u32(32)?);
            payload_end -= 4;
        }
        layer.payload = data.slice(payload_start..payload_end);
        Ok(())
    }
}

impl Decoder for EthernetDecoder {
    fn name(&self) -> &'static str {
        "ethernet"
    }

    fn can_decode(&self, input: &LayerInput) -> bool {
        input.payload_type.family == ProtocolFamily::Raw
    }

    fn decode(&self, input: &LayerInput) -> Result<DecodedLayer> {
        if !self.can_decode(input) {
            return Err(DecodeError::InputTypeMismatch {
                expected: "raw frame",
                actual: input.payload_type.to_string(),
            });
        }

        let mut layer = EthernetLayer::default();
        if let Err(e) = self.read_fields(&input.payload, &mut layer) {
            debug!(error = %e, "truncated frame while decoding ethernet header");
        }
        Ok(DecodedLayer::Ethernet(layer))
    }
}
