//! it8951-sg - Linux SCSI generic transport
//!
//! IT8951 boards show up as a USB mass storage device. The controller's
//! vendor commands are sent through the SCSI generic node of that device
//! (`/dev/sgN`) with the `SG_IO` ioctl.
//!
//! # Example
//!
//! ```no_run
//! let channel = it8951_sg::open_device("/dev/sg2")?;
//! println!("{}", channel.identity());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with SCSI generic support (`CONFIG_CHR_DEV_SG`)
//! - Read/write access to the `/dev/sgN` node (usually the `disk` group)

pub mod device;
pub mod error;

pub use device::ScsiGeneric;
pub use error::{Result, ScsiGenericError};

use it8951_core::Channel;

/// Open `/dev/sgN` and run the identity handshake
///
/// The device is closed again if the handshake fails.
pub fn open_device(path: &str) -> it8951_core::Result<Channel<ScsiGeneric>> {
    let transport = ScsiGeneric::open(path)?;
    Channel::open(transport)
}
