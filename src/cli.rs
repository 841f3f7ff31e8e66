//! CLI argument parsing

use crate::devices;
use clap::{Parser, Subcommand, ValueEnum};
use it8951_core::display::Zone;
use it8951_core::protocol::waveform;
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Generate dynamic help text for the device argument
fn device_help() -> String {
    format!(
        "Device to use: SCSI generic node (e.g. /dev/sg2) [or: {}]",
        devices::device_names_short()
    )
}

#[derive(Parser)]
#[command(name = "it8951")]
#[command(author, version, about = "IT8951 e-paper controller tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Flash geometry file (TOML format, [flash] table)
    #[arg(long, global = true)]
    pub flash_config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Device options shared across commands
#[derive(clap::Args, Debug, Clone)]
pub struct DeviceArgs {
    #[arg(short, long, help = device_help())]
    pub device: String,

    /// Image memory address or buffer index (0 = device default)
    #[arg(short, long, value_parser = parse_hex_u32, default_value = "0")]
    pub memaddr: u32,
}

/// Power rail state
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PowerState {
    On,
    Off,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display device information
    Info {
        #[command(flatten)]
        device: DeviceArgs,
    },

    /// Clear the screen (or a zone of it)
    Clear {
        #[command(flatten)]
        device: DeviceArgs,

        /// Zone as XxY or XxYxWxH
        zone: Option<Zone>,
    },

    /// Display an image memory area
    Display {
        #[command(flatten)]
        device: DeviceArgs,

        /// Zone as XxY or XxYxWxH
        zone: Option<Zone>,

        /// Waveform mode
        #[arg(short, long, default_value_t = waveform::GC16)]
        waveform: u32,
    },

    /// Load an image into an image memory area
    Load {
        #[command(flatten)]
        device: DeviceArgs,

        /// PGM file or monochrome image spec (WxHxC)
        image: String,

        /// Zone as XxY or XxYxWxH
        zone: Option<Zone>,
    },

    /// Image memory operations
    #[command(subcommand)]
    Mem(MemCommands),

    /// Get or set VCOM (in mV)
    Vcom {
        #[command(flatten)]
        device: DeviceArgs,

        /// New VCOM value in mV
        vcom: Option<u16>,
    },

    /// Set power state
    Power {
        #[command(flatten)]
        device: DeviceArgs,

        #[arg(value_enum)]
        state: PowerState,
    },

    /// SPI flash operations
    #[command(subcommand)]
    Flash(FlashCommands),

    /// Firmware and boot screen operations
    #[command(subcommand)]
    Fw(FwCommands),
}

/// Image memory subcommands
#[derive(Subcommand)]
pub enum MemCommands {
    /// Write an image into memory
    Write {
        #[command(flatten)]
        device: DeviceArgs,

        /// PGM file or monochrome image spec (WxHxC)
        image: String,
    },

    /// Fast write an image into memory
    Fwrite {
        #[command(flatten)]
        device: DeviceArgs,

        /// PGM file or monochrome image spec (WxHxC)
        image: String,
    },

    /// Read one screen worth of memory and store it into a file
    Read {
        #[command(flatten)]
        device: DeviceArgs,

        /// Output file
        output: PathBuf,

        /// Save as a PGM image instead of raw bytes
        #[arg(long)]
        pgm: bool,
    },
}

/// SPI flash subcommands
#[derive(Subcommand)]
pub enum FlashCommands {
    /// Erase flash at the given block-aligned address
    Erase {
        #[command(flatten)]
        device: DeviceArgs,

        /// Flash address (hex or decimal)
        #[arg(value_parser = parse_hex_u32)]
        addr: u32,

        /// Number of bytes, rounded up to whole blocks
        #[arg(value_parser = parse_hex_u32)]
        size: u32,
    },

    /// Copy data from a flash address to a file
    Read {
        #[command(flatten)]
        device: DeviceArgs,

        /// Flash address (hex or decimal)
        #[arg(value_parser = parse_hex_u32)]
        addr: u32,

        /// Output file
        output: PathBuf,

        /// Number of bytes (0 or omitted = up to the end of the flash)
        #[arg(value_parser = parse_hex_u32)]
        size: Option<u32>,
    },

    /// Copy data from a file to a flash address (verified)
    Write {
        #[command(flatten)]
        device: DeviceArgs,

        /// Input file
        input: PathBuf,

        /// Flash address (hex or decimal)
        #[arg(value_parser = parse_hex_u32)]
        addr: u32,

        /// Number of bytes (0 or omitted = whole file)
        #[arg(value_parser = parse_hex_u32)]
        size: Option<u32>,
    },
}

/// Firmware subcommands
#[derive(Subcommand)]
pub enum FwCommands {
    /// Print firmware version and flash layout
    Info {
        #[command(flatten)]
        device: DeviceArgs,
    },

    /// Write a firmware image in SPI flash
    WriteFw {
        #[command(flatten)]
        device: DeviceArgs,

        /// Firmware file
        input: PathBuf,
    },

    /// Write a boot screen image at the given index in SPI flash
    WriteBs {
        #[command(flatten)]
        device: DeviceArgs,

        /// PGM file or monochrome image spec (WxHxC)
        image: String,

        /// Boot screen index (see `fw info`)
        index: usize,
    },

    /// Set the active boot screen image
    EnableBs {
        #[command(flatten)]
        device: DeviceArgs,

        /// Boot screen index (see `fw info`)
        index: usize,
    },
}
