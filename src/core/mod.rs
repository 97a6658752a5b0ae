//! # Core Decoding Components
//!
//! The bit-field primitive and the data model shared by every decoder.
//!
//! ## Components
//! - **Bits**: [`bits::BitCursor`], the single home for non-byte-aligned
//!   field extraction
//! - **Frame**: raw frames, payload-type keys, decoded layers and chains
//!
//! ## Safety
//! - No read ever indexes past the declared buffer length; out-of-range
//!   requests fail with `TruncatedBuffer` instead
//! - Payloads are non-owning views into the caller's buffer

pub mod bits;
pub mod frame;
