#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! End-to-end chain decoding through the standard registry:
//! Ethernet → ARP / IPv4 / IPv6, with and without VLAN tagging.

use packet_decode::config::DecodeConfig;
use packet_decode::core::frame::{DecodedLayer, PortId, ProtocolFamily, RawFrame};
use packet_decode::protocol::registry::DecoderRegistry;
use packet_decode::protocol::types::{ArpOperation, IpProtocol};

fn registry() -> DecoderRegistry {
    DecoderRegistry::standard(&DecodeConfig::default()).unwrap()
}

fn frame(data: Vec<u8>) -> RawFrame {
    RawFrame::new(data, PortId::new("openflow:1:2"))
}

fn eth_header(ethertype: u16) -> Vec<u8> {
    let mut hdr = vec![
        0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // dst
        0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, // src
    ];
    hdr.extend_from_slice(&ethertype.to_be_bytes());
    hdr
}

fn ipv4_header(protocol: u8, payload: &[u8]) -> Vec<u8> {
    let total = 20 + payload.len() as u16;
    let mut hdr = vec![0x45, 0x00];
    hdr.extend_from_slice(&total.to_be_bytes());
    hdr.extend_from_slice(&[0xAB, 0xCD, 0x40, 0x00, 0x40, protocol, 0x00, 0x00]);
    hdr.extend_from_slice(&[10, 0, 0, 1]);
    hdr.extend_from_slice(&[10, 0, 0, 2]);
    hdr.extend_from_slice(payload);
    hdr
}

// ============================================================================
// ARP CHAINS
// ============================================================================

#[test]
fn test_ethernet_arp_chain() {
    let mut data = eth_header(0x0806);
    data.extend_from_slice(&[
        0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01, // ethernet/ipv4 request
        0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 192, 168, 0, 1, // sender
        0xCD, 0xEF, 0x01, 0x23, 0x45, 0x67, 1, 2, 3, 4, // target
    ]);
    let chain = registry().decode_chain(frame(data)).unwrap();

    assert_eq!(chain.len(), 2);
    let DecodedLayer::Ethernet(eth) = &chain.layers[0] else {
        panic!("expected ethernet first");
    };
    assert_eq!(eth.ethertype, Some(0x0806));

    let DecodedLayer::Arp(arp) = &chain.layers[1] else {
        panic!("expected arp second");
    };
    assert_eq!(arp.operation, Some(ArpOperation::Request));
    assert_eq!(arp.source_hardware_address.as_deref(), Some("01:23:45:67:89:ab"));
    assert_eq!(arp.source_protocol_address.as_deref(), Some("192.168.0.1"));
    assert_eq!(arp.destination_hardware_address.as_deref(), Some("cd:ef:01:23:45:67"));
    assert_eq!(arp.destination_protocol_address.as_deref(), Some("1.2.3.4"));
    // ARP is terminal.
    assert_eq!(chain.layers[1].next_payload_type(), None);
}

// ============================================================================
// IPV4 CHAINS
// ============================================================================

#[test]
fn test_ethernet_ipv4_chain_leaves_transport_undecoded() {
    let udp = [0x12, 0x34, 0x00, 0x35, 0x00, 0x08, 0x00, 0x00];
    let mut data = eth_header(0x0800);
    data.extend_from_slice(&ipv4_header(17, &udp));
    let chain = registry().decode_chain(frame(data)).unwrap();

    assert_eq!(chain.len(), 2);
    let DecodedLayer::Ipv4(ip) = &chain.layers[1] else {
        panic!("expected ipv4 second");
    };
    assert_eq!(ip.protocol, Some(IpProtocol::Udp));
    assert_eq!(&ip.payload[..], &udp);
    // No UDP decoder registered: the chain stops with the key declared.
    assert_eq!(
        chain.layers[1].next_payload_type().unwrap().family,
        ProtocolFamily::Ipv4
    );
}

#[test]
fn test_qinq_ipv4_chain() {
    let mut data = vec![
        0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB,
        0x91, 0x00, 0x20, 0x64, // outer: QinQ, vid 100
        0x81, 0x00, 0x40, 0xC8, // inner: 802.1Q, vid 200
        0x08, 0x00, // IPv4
    ];
    data.extend_from_slice(&ipv4_header(6, &[0xAA]));
    let chain = registry().decode_chain(frame(data)).unwrap();

    assert_eq!(chain.len(), 2);
    let DecodedLayer::Ethernet(eth) = &chain.layers[0] else {
        panic!("expected ethernet first");
    };
    assert_eq!(eth.vlan_tags.len(), 2);
    assert_eq!(eth.vlan_tags[0].vlan_id, 100);
    assert_eq!(eth.vlan_tags[1].vlan_id, 200);

    let DecodedLayer::Ipv4(ip) = &chain.layers[1] else {
        panic!("expected ipv4 second");
    };
    assert_eq!(ip.protocol, Some(IpProtocol::Tcp));
}

// ============================================================================
// IPV6 CHAINS
// ============================================================================

#[test]
fn test_tagged_ipv6_chain_with_extension_headers() {
    let mut data = vec![
        0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB,
        0x81, 0x00, 0xE0, 0x0A, // 802.1Q: prio 7, vid 10
        0x86, 0xDD, // IPv6
    ];
    // Base header, next-header hop-by-hop.
    data.extend_from_slice(&[0x60, 0x00, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x40]);
    data.extend_from_slice(&[0; 15]);
    data.push(1); // src ::1
    data.extend_from_slice(&[0; 15]);
    data.push(2); // dst ::2
    // Hop-by-hop announcing UDP.
    data.extend_from_slice(&[17, 0, 0, 0, 0, 0, 0, 0]);
    data.extend_from_slice(&[0xCA, 0xFE]);
    let chain = registry().decode_chain(frame(data)).unwrap();

    assert_eq!(chain.len(), 2);
    let DecodedLayer::Ipv6(ip) = &chain.layers[1] else {
        panic!("expected ipv6 second");
    };
    assert_eq!(ip.extension_headers.len(), 1);
    assert_eq!(
        ip.extension_headers[0].header_type,
        IpProtocol::HopByHopOptions
    );
    assert_eq!(ip.next_header, Some(IpProtocol::Udp));
    assert_eq!(&ip.payload[..], &[0xCA, 0xFE]);
}

// ============================================================================
// CHAIN PROPERTIES
// ============================================================================

#[test]
fn test_decoding_is_idempotent() {
    let mut data = eth_header(0x0800);
    data.extend_from_slice(&ipv4_header(6, &[1, 2, 3, 4]));
    let registry = registry();

    let first = registry.decode_chain(frame(data.clone())).unwrap();
    let second = registry.decode_chain(frame(data)).unwrap();
    assert_eq!(first.layers, second.layers);
}

#[test]
fn test_truncated_frame_still_yields_partial_chain() {
    let mut data = eth_header(0x0800);
    data.extend_from_slice(&ipv4_header(17, &[])[..8]);
    let chain = registry().decode_chain(frame(data)).unwrap();

    // Ethernet decoded fully, IPv4 partially; neither failure killed the chain.
    assert_eq!(chain.len(), 2);
    let DecodedLayer::Ipv4(ip) = &chain.layers[1] else {
        panic!("expected ipv4 second");
    };
    assert_eq!(ip.version, Some(4));
    assert_eq!(ip.source, None);
}

#[test]
fn test_metrics_reflect_decoded_layers() {
    let registry = registry();
    let mut data = eth_header(0x0800);
    data.extend_from_slice(&ipv4_header(6, &[]));
    registry.decode_chain(frame(data.clone())).unwrap();
    registry.decode_chain(frame(data)).unwrap();

    let snapshot = registry.metrics().snapshot();
    assert_eq!(snapshot.frames_total, 2);
    assert_eq!(snapshot.layers_ethernet, 2);
    assert_eq!(snapshot.layers_ipv4, 2);
    assert_eq!(snapshot.layers_arp, 0);
}

#[test]
fn test_payload_views_share_the_frame_buffer() {
    let mut data = eth_header(0x0800);
    data.extend_from_slice(&ipv4_header(17, &[0xAA, 0xBB, 0xCC]));
    let chain = registry().decode_chain(frame(data)).unwrap();

    let raw_range = chain.raw.data.as_ptr() as usize..chain.raw.data.as_ptr() as usize + chain.raw.data.len();
    for layer in &chain.layers {
        let payload = layer.payload();
        assert!(raw_range.contains(&(payload.as_ptr() as usize)), "payload for {} was copied", layer.name());
    }
}
