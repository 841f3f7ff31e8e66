//! CLI command implementations
//!
//! Every command opens its own channel, so the device handshake runs once per
//! invocation. Commands that touch the SPI flash share the image memory
//! address resolution and flash geometry loading below.

pub mod display;
pub mod flash;
pub mod fw;
pub mod memory;
pub mod pmic;
mod progress;

use crate::devices::{self, DeviceChannel};
use it8951_core::flash::FlashGeometry;
use std::path::Path;

pub use progress::IndicatifProgress;

/// Result type shared by all commands
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Open a device, returning the channel and the effective image memory address
///
/// An address of 0 selects the address reported by the device.
pub fn open(name: &str, memaddr: u32) -> Result<(DeviceChannel, u32), Box<dyn std::error::Error>> {
    let chan = devices::open_device(name)?;
    let memaddr = resolve_memaddr(chan.identity().memaddr, memaddr);
    log::debug!("Using image memory @0x{:08x}", memaddr);
    Ok((chan, memaddr))
}

fn resolve_memaddr(device_default: u32, requested: u32) -> u32 {
    if requested == 0 {
        device_default
    } else {
        requested
    }
}

/// Load the flash geometry from a TOML file, or use the default one
pub fn load_geometry(path: Option<&Path>) -> Result<FlashGeometry, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let geometry = FlashGeometry::from_toml_file(path)?;
            log::info!(
                "Loaded flash geometry from {}: {} x {} bytes",
                path.display(),
                geometry.block_count(),
                geometry.block_size()
            );
            Ok(geometry)
        }
        None => Ok(FlashGeometry::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_memaddr() {
        assert_eq!(resolve_memaddr(0x1236E0, 0), 0x1236E0);
        assert_eq!(resolve_memaddr(0x1236E0, 0x200000), 0x200000);
        assert_eq!(resolve_memaddr(0x1236E0, 1), 1);
    }

    #[test]
    fn test_default_geometry() {
        let geometry = load_geometry(None).unwrap();
        assert_eq!(geometry, FlashGeometry::default());
    }
}
