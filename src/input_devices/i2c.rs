use std::fs::File;
use std::io::{Read, Write};
use std::os::fd::AsRawFd;
use std::path::Path;

use super::{Transport, TransportError};

// I2C_SLAVE from linux/i2c-dev.h
nix::ioctl_write_int_bad!(i2c_set_slave, 0x0703);

/// A Linux `i2c-dev` node bound to one slave address.
///
/// The descriptor is closed when the transport is dropped.
#[derive(Debug)]
pub struct I2cTransport {
    file: File,
    address: u16,
}

impl I2cTransport {
    pub fn open(path: &Path, address: u16) -> Result<Self, TransportError> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| TransportError::Open {
                path: path.display().to_string(),
                source,
            })?;

        // SAFETY: the descriptor is owned by `file` and stays open for the call.
        unsafe { i2c_set_slave(file.as_raw_fd(), i32::from(address)) }
            .map_err(|source| TransportError::Address { address, source })?;

        tracing::debug!("opened {} at address {address:#04x}", path.display());
        Ok(Self { file, address })
    }

    pub fn address(&self) -> u16 {
        self.address
    }
}

impl Transport for I2cTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, TransportError> {
        self.file.write(bytes).map_err(TransportError::Write)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.file.read(buf).map_err(TransportError::Read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_node_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = I2cTransport::open(&dir.path().join("i2c-99"), 9).unwrap_err();
        assert!(matches!(err, TransportError::Open { .. }));
    }

    #[test]
    fn regular_file_rejects_slave_ioctl() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = I2cTransport::open(file.path(), 0x0a).unwrap_err();
        assert!(matches!(err, TransportError::Address { address: 0x0a, .. }));
    }
}
