pub mod digitizer;
pub mod i2c;

pub use digitizer::{Digitizer, QUERY_COMMAND};
pub use i2c::I2cTransport;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot bind i2c address {address:#04x}: {source}")]
    Address { address: u16, source: nix::Error },
    #[error("read failed: {0}")]
    Read(#[source] std::io::Error),
    #[error("write failed: {0}")]
    Write(#[source] std::io::Error),
    #[error("short {op}: {actual} of {expected} bytes")]
    Short {
        op: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Byte-oriented duplex link to the digitizer.
pub trait Transport: Send {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, TransportError>;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;
}
