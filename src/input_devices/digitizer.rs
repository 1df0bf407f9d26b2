use std::fmt::Write as _;

use super::{Transport, TransportError};
use crate::tablet_driver::{
    DecodeError, Decoded, DecoderSession, DeviceFeatures, REPORT_SIZE, decode_sample,
    negotiate_features,
};

const COMMAND_LSB: u8 = 0x04;
const COMMAND_MSB: u8 = 0x00;
const DATA_LSB: u8 = 0x05;
const DATA_MSB: u8 = 0x00;
const REPORT_FEATURE: u8 = 0x30;
const QUERY_REPORT: u8 = 0x03;
const OPCODE_GET_REPORT: u8 = 0x02;

/// GET_REPORT(feature, query) written to the command register, answered
/// through the data register.
pub const QUERY_COMMAND: [u8; 6] = [
    COMMAND_LSB,
    COMMAND_MSB,
    REPORT_FEATURE | QUERY_REPORT,
    OPCODE_GET_REPORT,
    DATA_LSB,
    DATA_MSB,
];

#[derive(Debug, thiserror::Error)]
pub enum DigitizerError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Runs the query and sample transactions against a [`Transport`] and keeps
/// the decoder state for that link.
pub struct Digitizer<T> {
    transport: T,
    session: DecoderSession,
}

impl<T: Transport> Digitizer<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            session: DecoderSession::new(),
        }
    }

    pub fn query_features(&mut self) -> Result<DeviceFeatures, DigitizerError> {
        let written = self.transport.write(&QUERY_COMMAND)?;
        if written != QUERY_COMMAND.len() {
            return Err(TransportError::Short {
                op: "write",
                expected: QUERY_COMMAND.len(),
                actual: written,
            }
            .into());
        }

        let (report, len) = self.read_report()?;
        let features = negotiate_features(&report[..len])?;
        tracing::info!(
            "digitizer: x_max={} y_max={} pressure_max={} fw={:#06x} distance_max={} tilt=({}, {}) generation={:?}",
            features.x_max,
            features.y_max,
            features.pressure_max,
            features.fw_version,
            features.distance_max,
            features.tilt_x_max,
            features.tilt_y_max,
            features.generation,
        );
        Ok(features)
    }

    pub fn read_sample(&mut self, features: &DeviceFeatures) -> Result<Decoded, DigitizerError> {
        let (report, len) = self.read_report()?;
        Ok(decode_sample(&report[..len], features, &mut self.session)?)
    }

    pub fn session(&self) -> &DecoderSession {
        &self.session
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// One report transfer. A short transfer is handed on as-is so the
    /// decoder rejects it as a malformed packet.
    fn read_report(&mut self) -> Result<([u8; REPORT_SIZE], usize), TransportError> {
        let mut report = [0u8; REPORT_SIZE];
        let read = self.transport.read(&mut report)?;
        tracing::trace!("report: {}", hex(&report[..read]));
        Ok((report, read))
    }
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{b:02x}");
    }
    out
}
