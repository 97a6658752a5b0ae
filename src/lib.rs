//! # packet-decode
//!
//! Layered binary packet decoding: raw link-layer frames in, typed protocol
//! layers out.
//!
//! A captured frame enters the Ethernet decoder; its EtherType selects the
//! next decoder (ARP, IPv4 or IPv6), whose own next-payload field selects the
//! one after that, until no registered decoder matches. Every decode call is
//! a pure function of its input buffer: malformed or truncated data yields a
//! partially populated layer, never a panic and never a hard failure of the
//! shared decoding path.
//!
//! ## Example
//! ```rust
//! use packet_decode::config::DecodeConfig;
//! use packet_decode::core::frame::{PortId, RawFrame};
//! use packet_decode::protocol::registry::DecoderRegistry;
//!
//! let registry = DecoderRegistry::standard(&DecodeConfig::default())?;
//! let frame = RawFrame::new(
//!     vec![
//!         0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // destination MAC
//!         0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, // source MAC
//!         0x08, 0x06, // EtherType: ARP
//!         0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01, // ARP header
//!         0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 192, 168, 0, 1,
//!         0xCD, 0xEF, 0x01, 0x23, 0x45, 0x67, 1, 2, 3, 4,
//!     ],
//!     PortId::new("openflow:1:2"),
//! );
//! let chain = registry.decode_chain(frame)?;
//! assert_eq!(chain.len(), 2); // ethernet, arp
//! # Ok::<(), packet_decode::error::DecodeError>(())
//! ```
//!
//! ## Modules
//! - [`core`]: the bit-field cursor and the frame/chain data model
//! - [`protocol`]: the Ethernet, ARP, IPv4 and IPv6 decoders and the registry
//! - [`config`]: decoder configuration (TOML/env)
//! - [`error`]: the decode error taxonomy
//! - [`utils`]: address rendering, logging setup, metrics

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod utils;

pub use config::DecodeConfig;
pub use core::frame::{
    DecodedLayer, LayerInput, PacketChain, PayloadType, PortId, ProtocolFamily, RawFrame,
};
pub use error::{DecodeError, Result};
pub use protocol::registry::{Decoder, DecoderRegistry};
