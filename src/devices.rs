//! Device registration and dispatch
//!
//! Backends are feature-gated. A device argument is either the name of a
//! built-in backend or, with the `sg` feature, a SCSI generic node path.

use it8951_core::transport::Transport;
use it8951_core::Channel;

/// Channel over whichever backend the user selected
pub type DeviceChannel = Channel<Box<dyn Transport>>;

/// Information about a device backend
pub struct DeviceInfo {
    /// Name or path form used for matching
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
}

/// Get information about all available backends (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_devices() -> Vec<DeviceInfo> {
    let mut devices = Vec::new();

    #[cfg(feature = "sg")]
    devices.push(DeviceInfo {
        name: "/dev/sgN",
        description: "USB attached controller through Linux SCSI generic",
    });

    #[cfg(feature = "dummy")]
    devices.push(DeviceInfo {
        name: "dummy",
        description: "In-memory controller emulator for testing (dummy[:WxH])",
    });

    devices
}

/// Generate a short list of backend names for CLI help
pub fn device_names_short() -> String {
    let devices = available_devices();
    if devices.is_empty() {
        return "none, recompile with backend features enabled".to_string();
    }
    let names: Vec<&str> = devices.iter().map(|d| d.name).collect();
    names.join(", ")
}

/// Parse the `dummy[:WxH]` form
#[cfg_attr(not(feature = "dummy"), allow(dead_code))]
fn parse_dummy(name: &str) -> Option<Result<(u32, u32), String>> {
    let rest = name.strip_prefix("dummy")?;
    if rest.is_empty() {
        return Some(Ok((0, 0)));
    }
    let panel = rest.strip_prefix(':')?;
    let parsed = panel
        .split_once(['x', 'X'])
        .and_then(|(w, h)| Some((w.parse::<u32>().ok()?, h.parse::<u32>().ok()?)))
        .ok_or_else(|| format!("Invalid dummy panel size '{}', expected WxH", panel));
    Some(parsed)
}

/// Open a device and run the identity handshake
pub fn open_device(name: &str) -> Result<DeviceChannel, Box<dyn std::error::Error>> {
    #[cfg(feature = "dummy")]
    if let Some(panel) = parse_dummy(name) {
        return open_dummy(panel?);
    }

    open_path(name)
}

#[cfg(feature = "dummy")]
fn open_dummy(panel: (u32, u32)) -> Result<DeviceChannel, Box<dyn std::error::Error>> {
    use it8951_dummy::{DummyConfig, DummyController};

    let config = match panel {
        (0, 0) => DummyConfig::default(),
        (w, h) => DummyConfig::with_panel(w, h),
    };
    log::info!("Using dummy controller ({}x{})", config.width, config.height);
    Ok(Channel::open(DummyController::new(config))?.boxed())
}

#[cfg(feature = "sg")]
fn open_path(path: &str) -> Result<DeviceChannel, Box<dyn std::error::Error>> {
    Ok(it8951_sg::open_device(path)?.boxed())
}

#[cfg(not(feature = "sg"))]
fn open_path(name: &str) -> Result<DeviceChannel, Box<dyn std::error::Error>> {
    Err(format!(
        "Unknown device '{}'. Available: {}",
        name,
        device_names_short()
    )
    .into())
}
