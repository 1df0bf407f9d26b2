//! Decoder for the digitizer's I2C HID-style reports.
//!
//! Two fixed 22-byte reports are understood: the feature query answered once
//! at startup, and the per-sample pen report polled afterwards. Which optional
//! fields of the pen report are meaningful depends on the [`Generation`]
//! learned from the query, so [`negotiate_features`] must succeed before any
//! [`decode_sample`] call.

pub mod features;
pub mod report;

pub use features::{DeviceFeatures, FeatureSupport, Generation, negotiate_features};
pub use report::{Decoded, DecoderSession, decode_sample};

/// Size of both the query report and the pen report.
pub const REPORT_SIZE: usize = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("expected a {expected}-byte report, got {actual} bytes")]
    WrongLength { expected: usize, actual: usize },
}

pub(crate) fn check_len(bytes: &[u8]) -> Result<&[u8; REPORT_SIZE], DecodeError> {
    bytes.try_into().map_err(|_| DecodeError::WrongLength {
        expected: REPORT_SIZE,
        actual: bytes.len(),
    })
}

#[inline]
pub(crate) fn u16_le(buf: &[u8; REPORT_SIZE], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

#[inline]
pub(crate) fn i16_le(buf: &[u8; REPORT_SIZE], at: usize) -> i16 {
    i16::from_le_bytes([buf[at], buf[at + 1]])
}
