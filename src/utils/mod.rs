//! # Utility Modules
//!
//! Supporting utilities for address rendering, logging and observability.
//!
//! ## Components
//! - **Addr**: MAC and IP textual rendering for decoded fields
//! - **Logging**: structured logging configuration
//! - **Metrics**: thread-safe decode counters

pub mod addr;
pub mod logging;
pub mod metrics;

// Re-export the types decoded layers expose directly.
pub use addr::MacAddr;
pub use metrics::{Metrics, MetricsSnapshot};
