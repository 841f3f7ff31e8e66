//! Error types for SCSI generic operations

use thiserror::Error;

/// SCSI generic specific errors
#[derive(Debug, Error)]
pub enum ScsiGenericError {
    /// Failed to open device
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The SG_IO ioctl itself failed
    #[error("SG_IO ioctl failed: {0}")]
    IoctlFailed(#[source] std::io::Error),

    /// The command completed with an error status
    #[error(
        "command 0x{opcode:02x} failed: status=0x{status:02x} host_status=0x{host_status:04x} \
         driver_status=0x{driver_status:04x}"
    )]
    CommandFailed {
        opcode: u8,
        status: u8,
        host_status: u16,
        driver_status: u16,
    },

    /// Data buffer does not fit the SG_IO length field
    #[error("data phase of {0} bytes is too large")]
    BufferTooLarge(usize),
}

impl From<ScsiGenericError> for it8951_core::Error {
    fn from(e: ScsiGenericError) -> Self {
        match e {
            ScsiGenericError::OpenFailed { path, source } => it8951_core::Error::Transport(
                std::io::Error::new(source.kind(), format!("{}: {}", path, source)),
            ),
            ScsiGenericError::IoctlFailed(source) => it8951_core::Error::Transport(source),
            other => it8951_core::Error::Transport(std::io::Error::other(other)),
        }
    }
}

/// Result type for SCSI generic operations
pub type Result<T> = std::result::Result<T, ScsiGenericError>;
