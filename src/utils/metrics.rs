//! # Observability and Metrics
//!
//! Decode counters for monitoring pipeline health.
//!
//! Uses atomic counters for thread-safe collection; decoders stay pure, so
//! only the registry records into these.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use crate::core::frame::DecodedLayer;

/// A monotonically increasing event counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters for the decoding pipeline.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Raw frames entering the pipeline.
    pub frames_total: Counter,
    /// Decoded Ethernet layers.
    pub layers_ethernet: Counter,
    /// Decoded ARP layers.
    pub layers_arp: Counter,
    /// Decoded IPv4 layers.
    pub layers_ipv4: Counter,
    /// Decoded IPv6 layers.
    pub layers_ipv6: Counter,
    /// Lookups that found no willing decoder for a payload-type key.
    pub dispatch_misses: Counter,
    /// Decoders that rejected their input outright.
    pub decode_errors: Counter,
}

/// Point-in-time copy of all counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub frames_total: u64,
    pub layers_ethernet: u64,
    pub layers_arp: u64,
    pub layers_ipv4: u64,
    pub layers_ipv6: u64,
    pub dispatch_misses: u64,
    pub decode_errors: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump the per-protocol counter for a freshly decoded layer.
    pub fn record_layer(&self, layer: &DecodedLayer) {
        match layer {
            DecodedLayer::Ethernet(_) => self.layers_ethernet.increment(),
            DecodedLayer::Arp(_) => self.layers_arp.increment(),
            DecodedLayer::Ipv4(_) => self.layers_ipv4.increment(),
            DecodedLayer::Ipv6(_) => self.layers_ipv6.increment(),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_total: self.frames_total.get(),
            layers_ethernet: self.layers_ethernet.get(),
            layers_arp: self.layers_arp.get(),
            layers_ipv4: self.layers_ipv4.get(),
            layers_ipv6: self.layers_ipv6.get(),
            dispatch_misses: self.dispatch_misses.get(),
            decode_errors: self.decode_errors.get(),
        }
    }

    /// Emit all counters through the logging layer.
    pub fn log_summary(&self) {
        let s = self.snapshot();
        info!(
            frames = s.frames_total,
            ethernet = s.layers_ethernet,
            arp = s.layers_arp,
            ipv4 = s.layers_ipv4,
            ipv6 = s.layers_ipv6,
            dispatch_misses = s.dispatch_misses,
            decode_errors = s.decode_errors,
            "decode metrics"
        );
    }
}
