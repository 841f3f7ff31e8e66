//! it8951-core - Command protocol and flash programming engine for IT8951
//!
//! The ITE IT8951 e-paper controller is only reachable through vendor SCSI
//! commands. This crate encodes those commands, moves data in and out of the
//! controller's image memory, drives panel refreshes and the PMIC, and
//! programs the controller's SPI flash through the image-memory bridge.
//!
//! The crate does not talk to hardware itself: every operation goes through
//! the [`transport::Transport`] trait, implemented by `it8951-sg` for Linux
//! SCSI generic devices and by `it8951-dummy` for an in-memory emulator.
//!
//! # Example
//!
//! ```ignore
//! use it8951_core::channel::Channel;
//! use it8951_core::flash::{FlashGeometry, FlashProgrammer};
//! use it8951_core::transport::Transport;
//!
//! fn dump_first_block<T: Transport>(transport: T) -> it8951_core::Result<Vec<u8>> {
//!     let mut channel = Channel::open(transport)?;
//!     let memaddr = channel.identity().memaddr;
//!     let mut flash = FlashProgrammer::new(&mut channel, FlashGeometry::default(), memaddr);
//!     let mut buf = vec![0u8; 64 * 1024];
//!     flash.read(0, &mut buf)?;
//!     Ok(buf)
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod channel;
pub mod display;
pub mod error;
pub mod firmware;
pub mod flash;
pub mod image;
pub mod memory;
pub mod pmic;
pub mod protocol;
pub mod transport;

pub use channel::Channel;
pub use error::{Error, Result};
