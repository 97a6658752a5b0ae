//! # Error Types
//!
//! Error handling for the packet decoding pipeline.
//!
//! This module defines all error variants that can occur while pulling fields
//! out of a raw frame, from out-of-range bit reads to malformed address bytes.
//!
//! ## Error Categories
//! - **Buffer Errors**: a requested bit range exceeds the available data
//! - **Value Errors**: a wire value has no match in a known-value enumeration
//! - **Address Errors**: address bytes cannot be rendered into textual form
//! - **Contract Errors**: a decoder was handed a layer it does not understand
//!
//! The first three categories are caught *inside* each decoder: the decoder
//! logs the condition and returns a best-effort, partially populated layer.
//! Only [`DecodeError::InputTypeMismatch`] escapes to the caller, since it
//! indicates the registry dispatched the wrong decoder.
//!
//! All errors implement `std::error::Error` for interoperability.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// DecodeError is the primary error type for all decoding operations.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodeError {
    #[error("truncated buffer: requested {width} bits at bit offset {offset}, but only {available} bits available")]
    TruncatedBuffer {
        offset: usize,
        width: usize,
        available: usize,
    },

    #[error("unrecognized {field} value: {value:#x}")]
    UnrecognizedType { field: &'static str, value: u64 },

    #[error("address format error: {0}")]
    AddressFormat(String),

    #[error("input type mismatch: decoder for {expected} received {actual}")]
    InputTypeMismatch {
        expected: &'static str,
        actual: String,
    },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("registry lock poisoned")]
    LockPoisoned,
}

/// Type alias for Results using DecodeError
pub type Result<T> = std::result::Result<T, DecodeError>;
