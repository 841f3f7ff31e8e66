//! it8951 - IT8951 e-paper controller tool
//!
//! Drives IT8951 based e-paper boards over their USB mass storage interface:
//! loading images into the controller's memory, refreshing the panel,
//! controlling the PMIC, and programming the controller's SPI flash
//! (firmware and boot screens).
//!
//! # Architecture
//!
//! Every command opens a [`it8951_core::Channel`] over a boxed
//! [`it8951_core::transport::Transport`]:
//! - **SCSI generic** (`/dev/sgN`) - the real hardware, Linux only
//! - **dummy** - an in-memory emulator, handy for trying commands out
//!
//! Flash commands layer a [`it8951_core::flash::FlashProgrammer`] on top of
//! the channel, using the controller's image memory as a bridge buffer.

mod cli;
mod commands;
mod devices;

use clap::Parser;
use cli::{Cli, Commands, DeviceArgs, FlashCommands, FwCommands, MemCommands, PowerState};
use commands::{display, flash, fw, memory, pmic, CommandResult};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG still wins over the verbosity flags
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level(cli.verbose).as_str()),
    )
    .init();

    run(cli)
}

/// Log filter selected by the number of `-v` flags
fn log_level(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn run(cli: Cli) -> CommandResult {
    let flash_config = cli.flash_config;

    match cli.command {
        Commands::Info { device } => {
            let (chan, _) = open(&device)?;
            display::run_info(&chan)
        }
        Commands::Clear { device, zone } => {
            let (mut chan, memaddr) = open(&device)?;
            display::run_clear(&mut chan, memaddr, zone)
        }
        Commands::Display {
            device,
            zone,
            waveform,
        } => {
            let (mut chan, memaddr) = open(&device)?;
            display::run_display(&mut chan, memaddr, waveform, zone)
        }
        Commands::Load {
            device,
            image,
            zone,
        } => {
            let (mut chan, memaddr) = open(&device)?;
            display::run_load(&mut chan, memaddr, &image, zone)
        }
        Commands::Mem(cmd) => match cmd {
            MemCommands::Write { device, image } => {
                let (mut chan, memaddr) = open(&device)?;
                memory::run_write(&mut chan, memaddr, &image, false)
            }
            MemCommands::Fwrite { device, image } => {
                let (mut chan, memaddr) = open(&device)?;
                memory::run_write(&mut chan, memaddr, &image, true)
            }
            MemCommands::Read {
                device,
                output,
                pgm,
            } => {
                let (mut chan, memaddr) = open(&device)?;
                memory::run_read(&mut chan, memaddr, &output, pgm)
            }
        },
        Commands::Vcom { device, vcom } => {
            let (mut chan, _) = open(&device)?;
            pmic::run_vcom(&mut chan, vcom)
        }
        Commands::Power { device, state } => {
            let (mut chan, _) = open(&device)?;
            pmic::run_power(&mut chan, state == PowerState::On)
        }
        Commands::Flash(cmd) => {
            let geometry = commands::load_geometry(flash_config.as_deref())?;
            match cmd {
                FlashCommands::Erase { device, addr, size } => {
                    let (mut chan, memaddr) = open(&device)?;
                    flash::run_erase(&mut chan, memaddr, geometry, addr, size)
                }
                FlashCommands::Read {
                    device,
                    addr,
                    output,
                    size,
                } => {
                    let (mut chan, memaddr) = open(&device)?;
                    flash::run_read(&mut chan, memaddr, geometry, addr, &output, size)
                }
                FlashCommands::Write {
                    device,
                    input,
                    addr,
                    size,
                } => {
                    let (mut chan, memaddr) = open(&device)?;
                    flash::run_write(&mut chan, memaddr, geometry, &input, addr, size)
                }
            }
        }
        Commands::Fw(cmd) => {
            let geometry = commands::load_geometry(flash_config.as_deref())?;
            match cmd {
                FwCommands::Info { device } => {
                    let (mut chan, memaddr) = open(&device)?;
                    fw::run_info(&mut chan, memaddr, geometry)
                }
                FwCommands::WriteFw { device, input } => {
                    let (mut chan, memaddr) = open(&device)?;
                    fw::run_write_fw(&mut chan, memaddr, geometry, &input)
                }
                FwCommands::WriteBs {
                    device,
                    image,
                    index,
                } => {
                    let (mut chan, memaddr) = open(&device)?;
                    fw::run_write_bs(&mut chan, memaddr, geometry, &image, index)
                }
                FwCommands::EnableBs { device, index } => {
                    let (mut chan, memaddr) = open(&device)?;
                    fw::run_enable_bs(&mut chan, memaddr, geometry, index)
                }
            }
        }
    }
}

fn open(
    device: &DeviceArgs,
) -> Result<(devices::DeviceChannel, u32), Box<dyn std::error::Error>> {
    commands::open(&device.device, device.memaddr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn test_log_level_from_verbosity() {
        assert_eq!(log_level(0), LevelFilter::Info);
        assert_eq!(log_level(1), LevelFilter::Debug);
        assert_eq!(log_level(2), LevelFilter::Trace);
        assert_eq!(log_level(5), LevelFilter::Trace);
    }

    #[test]
    fn test_debug_filter_enables_debug_records() {
        let logger = env_logger::Builder::new()
            .parse_filters(log_level(1).as_str())
            .build();
        assert_eq!(logger.filter(), LevelFilter::Debug);
        let record = log::Metadata::builder()
            .level(log::Level::Debug)
            .target("it8951_core::channel")
            .build();
        assert!(log::Log::enabled(&logger, &record));
    }
}
