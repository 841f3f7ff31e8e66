//! Error types for it8951-core

use thiserror::Error;

/// Core error type
///
/// Errors are never retried or rolled back by this crate. When an operation
/// fails halfway (a chunked memory write, a multi-block erase), the device
/// state beyond the last successful command is unknown.
#[derive(Debug, Error)]
pub enum Error {
    /// Identity handshake returned a signature we do not support
    #[error("unsupported device signature 0x{signature:08X} (maybe wrong /dev/sgX)")]
    UnsupportedDevice {
        /// Signature reported by the device
        signature: u32,
    },

    /// Device I/O failed
    #[error("transport error: {0}")]
    Transport(#[source] std::io::Error),

    /// Flash address is not aligned on an erase block
    #[error("address 0x{addr:08X} is not aligned on block size ({block_size} bytes)")]
    MisalignedAddress {
        /// Offending address
        addr: u32,
        /// Erase block size
        block_size: u32,
    },

    /// Requested region exceeds the device capacity
    #[error("region 0x{addr:08X}+{len} is beyond the end of the device (0x{limit:08X})")]
    OutOfRange {
        /// Start address
        addr: u32,
        /// Length in bytes
        len: usize,
        /// Device capacity in bytes
        limit: u64,
    },

    /// Readback after a flash write did not match
    #[error("corruption detected on SPI flash at 0x{addr:08X}")]
    VerificationFailed {
        /// First address that differs
        addr: u32,
    },

    /// An argument cannot be encoded or makes no sense for the device
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Image decoding failed
    #[error("image: {0}")]
    Image(String),

    /// Firmware layout detection or update failed
    #[error("firmware: {0}")]
    Firmware(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Transport(e)
    }
}

/// Result type alias using the core Error type
pub type Result<T> = std::result::Result<T, Error>;
