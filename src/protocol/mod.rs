//! # Protocol Decoders
//!
//! One decoder per protocol, plus the registry that chains them.
//!
//! Each decoder consumes a [`crate::core::frame::LayerInput`] and produces a
//! single [`crate::core::frame::DecodedLayer`]; none of them knows what came
//! before or what comes next. The [`registry::DecoderRegistry`] owns that
//! composition, keyed by `{protocol family, numeric sub-type}`.
//!
//! ## Decoders
//! - **Ethernet**: MACs, 802.1Q/QinQ tags, EtherType/length discriminator
//! - **ARP**: length-driven address fields rendered as text
//! - **IPv4**: fixed header, options run, protocol dispatch key
//! - **IPv6**: base header plus the extension-header chain walk

pub mod arp;
pub mod ethernet;
pub mod ipv4;
pub mod ipv6;
pub mod registry;
pub mod types;
