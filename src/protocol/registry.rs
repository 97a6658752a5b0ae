//! # Decoder Registry
//!
//! Maps composite payload-type keys to registered decoders and drives the
//! layer-by-layer decode of a raw frame into a [`PacketChain`].
//!
//! The decoders themselves are independent and stateless; composition (which
//! decoder follows which) lives entirely here. A decode failure inside a
//! layer never aborts the chain: the registry logs it and returns the layers
//! that did decode, so downstream consumers can still inspect them.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, trace, warn};

use crate::config::DecodeConfig;
use crate::core::frame::{DecodedLayer, LayerInput, PacketChain, PayloadType, RawFrame};
use crate::error::{DecodeError, Result};
use crate::protocol::arp::ArpDecoder;
use crate::protocol::ethernet::EthernetDecoder;
use crate::protocol::ipv4::Ipv4Decoder;
use crate::protocol::ipv6::Ipv6Decoder;
use crate::protocol::types::KnownEtherType;
use crate::core::frame::ProtocolFamily;
use crate::utils::metrics::Metrics;

/// One protocol decoder: a pure, stateless function of its input buffer.
///
/// The only hard error `decode` may return is
/// [`DecodeError::InputTypeMismatch`]; malformed or truncated input yields a
/// partially populated layer instead.
pub trait Decoder: Send + Sync {
    /// Short protocol name, for logging.
    fn name(&self) -> &'static str;

    /// Whether this decoder accepts the input's declared payload type.
    fn can_decode(&self, input: &LayerInput) -> bool;

    /// Decode one layer out of the input payload.
    fn decode(&self, input: &LayerInput) -> Result<DecodedLayer>;
}

/// Registry of decoders keyed by composite payload type.
pub struct DecoderRegistry {
    decoders: Arc<RwLock<HashMap<PayloadType, Arc<dyn Decoder>>>>,
    metrics: Arc<Metrics>,
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderRegistry {
    /// An empty registry; decoders must be registered before use.
    pub fn new() -> Self {
        Self {
            decoders: Arc::new(RwLock::new(HashMap::new())),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// A registry pre-populated with the standard Ethernet/ARP/IPv4/IPv6
    /// decoders, configured from `config`.
    pub fn standard(config: &DecodeConfig) -> Result<Self> {
        let registry = Self::new();
        registry.register(
            PayloadType::raw(),
            Arc::new(EthernetDecoder::with_config(config)),
        )?;
        registry.register(
            PayloadType::new(ProtocolFamily::Ethernet, KnownEtherType::Arp.value()),
            Arc::new(ArpDecoder::new()),
        )?;
        registry.register(
            PayloadType::new(ProtocolFamily::Ethernet, KnownEtherType::Ipv4.value()),
            Arc::new(Ipv4Decoder::new()),
        )?;
        registry.register(
            PayloadType::new(ProtocolFamily::Ethernet, KnownEtherType::Ipv6.value()),
            Arc::new(Ipv6Decoder::with_config(config)),
        )?;
        Ok(registry)
    }

    /// Register `decoder` for the composite key `payload_type`, replacing any
    /// previous registration.
    pub fn register(&self, payload_type: PayloadType, decoder: Arc<dyn Decoder>) -> Result<()> {
        let mut decoders = self
            .decoders
            .write()
            .map_err(|_| DecodeError::LockPoisoned)?;
        decoders.insert(payload_type, decoder);
        Ok(())
    }

    /// Look up the decoder registered for `payload_type`.
    pub fn lookup(&self, payload_type: PayloadType) -> Result<Option<Arc<dyn Decoder>>> {
        let decoders = self
            .decoders
            .read()
            .map_err(|_| DecodeError::LockPoisoned)?;
        Ok(decoders.get(&payload_type).cloned())
    }

    /// Decode counters shared with this registry.
    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    /// Decode `frame` layer by layer into a packet chain.
    ///
    /// The chain stops at the first of: an empty payload, a layer that
    /// declares no next payload type, a key with no registered decoder, or a
    /// decoder declining its input. The layers decoded so far are always
    /// returned.
    pub fn decode_chain(&self, frame: RawFrame) -> Result<PacketChain> {
        self.metrics.frames_total.increment();
        let mut chain = PacketChain::new(frame);
        let mut input = LayerInput::from_frame(&chain.raw);

        loop {
            let Some(decoder) = self.lookup(input.payload_type)? else {
                if !chain.is_empty() {
                    trace!(key = %input.payload_type, "no decoder registered, chain complete");
                    self.metrics.dispatch_misses.increment();
                }
                break;
            };

            if !decoder.can_decode(&input) {
                debug!(
                    decoder = decoder.name(),
                    key = %input.payload_type,
                    "registered decoder declined input"
                );
                self.metrics.dispatch_misses.increment();
                break;
            }

            match decoder.decode(&input) {
                Ok(layer) => {
                    trace!(
                        decoder = decoder.name(),
                        depth = chain.len() + 1,
                        "decoded layer"
                    );
                    self.metrics.record_layer(&layer);
                    let next = layer.next_payload_type();
                    let payload = layer.payload().clone();
                    chain.push(layer);

                    let Some(next) = next else { break };
                    if payload.is_empty() {
                        break;
                    }
                    input = LayerInput::new(payload, next);
                }
                Err(e) => {
                    // Contract violation between registry and decoder; the
                    // chain so far is still useful.
                    warn!(decoder = decoder.name(), error = %e, "decoder rejected input");
                    self.metrics.decode_errors.increment();
                    break;
                }
            }
        }

        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::PortId;
    use bytes::Bytes;

    fn frame(data: Vec<u8>) -> RawFrame {
        RawFrame::new(Bytes::from(data), PortId::new("openflow:1:2"))
    }

    fn standard() -> DecoderRegistry {
        DecoderRegistry::standard(&DecodeConfig::default()).unwrap()
    }

    #[test]
    fn empty_registry_decodes_nothing() {
        let registry = DecoderRegistry::new();
        let chain = registry.decode_chain(frame(vec![0u8; 64])).unwrap();
        assert!(chain.is_empty());
    }

    #[test]
    fn ethernet_then_arp() {
        let mut data = vec![
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0x08, 0x06,
        ];
        data.extend_from_slice(&[
            0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB,
            0xC0, 0xA8, 0x00, 0x01, 0xCD, 0xEF, 0x01, 0x23, 0x45, 0x67, 0x01, 0x02, 0x03, 0x04,
        ]);
        let chain = standard().decode_chain(frame(data)).unwrap();

        assert_eq!(chain.len(), 2);
        assert_eq!(chain.layers[0].name(), "ethernet");
        assert_eq!(chain.layers[1].name(), "arp");
    }

    #[test]
    fn unknown_ethertype_stops_after_ethernet() {
        let data = vec![
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0x88, 0xB5,
            0x00, 0x01,
        ];
        let registry = standard();
        let chain = registry.decode_chain(frame(data)).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(registry.metrics().dispatch_misses.get(), 1);
    }

    #[test]
    fn replacing_a_registration_wins() {
        let registry = standard();
        registry
            .register(PayloadType::raw(), Arc::new(EthernetDecoder::new()))
            .unwrap();
        let chain = registry.decode_chain(frame(vec![0u8; 14])).unwrap();
        assert_eq!(chain.len(), 1);
    }
}
