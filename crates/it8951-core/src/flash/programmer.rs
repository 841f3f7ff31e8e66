//! SPI flash programming through the controller
//!
//! The controller has no direct path between the host and its SPI flash:
//! every byte goes through image memory, one panel-sized chunk at a time.

use log::{debug, info};
use zerocopy::IntoBytes;

use super::{FlashGeometry, FlashProgress, NoProgress};
use crate::channel::Channel;
use crate::error::{Error, Result};
use crate::memory;
use crate::protocol::args::{EraseArgs, FlashDataArgs};
use crate::protocol::Command;
use crate::transport::{DataPhase, Transport};

/// Erase, read and write the controller's SPI flash
///
/// Nothing is rolled back on failure: an error in the middle of an erase or
/// a write leaves the flash in an unknown state past the last completed
/// command.
pub struct FlashProgrammer<'a, T: Transport> {
    chan: &'a mut Channel<T>,
    geometry: FlashGeometry,
    memaddr: u32,
}

impl<'a, T: Transport> FlashProgrammer<'a, T> {
    /// Program through `chan`, using the image memory at `memaddr` as bridge
    pub fn new(chan: &'a mut Channel<T>, geometry: FlashGeometry, memaddr: u32) -> Self {
        Self {
            chan,
            geometry,
            memaddr,
        }
    }

    /// Flash geometry in use
    pub fn geometry(&self) -> &FlashGeometry {
        &self.geometry
    }

    /// Panel dimensions of the underlying device
    pub fn panel(&self) -> (u32, u32) {
        let id = self.chan.identity();
        (id.width, id.height)
    }

    /// Bytes moved per bridge round trip
    fn bridge_size(&self) -> Result<usize> {
        match self.chan.identity().panel_size() {
            0 => Err(Error::InvalidArgument(
                "panel reports a zero-sized image buffer".into(),
            )),
            size => Ok(size),
        }
    }

    fn check_range(&self, addr: u32, len: usize) -> Result<()> {
        let limit = self.geometry.total_size();
        if addr as u64 + len as u64 > limit {
            return Err(Error::OutOfRange { addr, len, limit });
        }
        Ok(())
    }

    /// Erase `size` bytes starting at block-aligned `addr`
    ///
    /// The size is rounded up to whole blocks.
    pub fn erase(&mut self, addr: u32, size: usize) -> Result<()> {
        self.erase_with_progress(addr, size, &mut NoProgress)
    }

    /// Erase with progress reporting
    pub fn erase_with_progress(
        &mut self,
        addr: u32,
        size: usize,
        progress: &mut dyn FlashProgress,
    ) -> Result<()> {
        self.erase_blocks(addr, size, progress)?;
        progress.complete();
        Ok(())
    }

    fn erase_blocks(
        &mut self,
        addr: u32,
        size: usize,
        progress: &mut dyn FlashProgress,
    ) -> Result<()> {
        let block_size = self.geometry.block_size();
        if !self.geometry.is_aligned(addr as u64) {
            return Err(Error::MisalignedAddress { addr, block_size });
        }

        let blocks = self.geometry.blocks_for(size as u64) as usize;
        let erase_len = blocks * block_size as usize;
        self.check_range(addr, erase_len)?;

        info!("Erasing SPI flash @0x{:08x} ({} bytes)", addr, erase_len);
        progress.erasing(blocks, erase_len);

        for block in 0..blocks {
            let sfaddr = addr + (block as u32) * block_size;
            debug!("erase block {} @0x{:08x} ({} bytes)", block, sfaddr, block_size);

            let args = EraseArgs::new(sfaddr, block_size);
            self.chan
                .submit(&Command::FlashErase, DataPhase::ToDevice(args.as_bytes()))?;
            progress.erase_progress(block + 1, (block + 1) * block_size as usize);
        }
        Ok(())
    }

    /// Fill `buf` with flash contents starting at `addr`
    pub fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        self.read_with_progress(addr, buf, &mut NoProgress)
    }

    /// Read `len` bytes into a new buffer
    pub fn read_vec(&mut self, addr: u32, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read(addr, &mut buf)?;
        Ok(buf)
    }

    /// Read with progress reporting
    pub fn read_with_progress(
        &mut self,
        addr: u32,
        buf: &mut [u8],
        progress: &mut dyn FlashProgress,
    ) -> Result<()> {
        self.read_chunks(addr, buf, progress)?;
        progress.complete();
        Ok(())
    }

    fn read_chunks(
        &mut self,
        addr: u32,
        buf: &mut [u8],
        progress: &mut dyn FlashProgress,
    ) -> Result<()> {
        self.check_range(addr, buf.len())?;
        let bridge = self.bridge_size()?;

        info!("Reading SPI flash @0x{:08x} ({} bytes)", addr, buf.len());
        progress.reading(buf.len());

        let mut done = 0usize;
        for chunk in buf.chunks_mut(bridge) {
            self.read_bridged(addr + done as u32, chunk)?;
            done += chunk.len();
            progress.read_progress(done);
        }
        Ok(())
    }

    /// One flash to image memory to host round trip
    fn read_bridged(&mut self, sfaddr: u32, chunk: &mut [u8]) -> Result<()> {
        debug!(
            "read from SPI flash @0x{:08x} to memory @0x{:08x} ({} bytes)",
            sfaddr,
            self.memaddr,
            chunk.len()
        );

        let args = FlashDataArgs::new(sfaddr, self.memaddr, chunk.len() as u32);
        self.chan
            .submit(&Command::FlashRead, DataPhase::ToDevice(args.as_bytes()))?;
        memory::read(self.chan, self.memaddr, chunk)
    }

    /// Write `data` at `addr`, optionally reading it back
    ///
    /// Unaligned writes read the surrounding blocks first and rewrite the
    /// whole block-aligned range, so bytes outside `addr..addr + len` keep
    /// their previous contents.
    pub fn write(&mut self, addr: u32, data: &[u8], verify: bool) -> Result<()> {
        self.write_with_progress(addr, data, verify, &mut NoProgress)
    }

    /// Write with progress reporting
    pub fn write_with_progress(
        &mut self,
        addr: u32,
        data: &[u8],
        verify: bool,
        progress: &mut dyn FlashProgress,
    ) -> Result<()> {
        self.check_range(addr, data.len())?;
        if data.is_empty() {
            progress.complete();
            return Ok(());
        }

        info!("Writing SPI flash @0x{:08x} ({} bytes)", addr, data.len());

        let end = addr as u64 + data.len() as u64;
        let start = self.geometry.align_down(addr as u64);
        let aligned_end = self.geometry.align_up(end);

        if start == addr as u64 && aligned_end == end {
            self.write_aligned(addr, data, verify, progress)?;
        } else {
            let size = (aligned_end - start) as usize;
            let offset = (addr as u64 - start) as usize;
            info!(
                "Aligning I/O on block size: 0x{:08x}-0x{:08x} ({} bytes)",
                start, aligned_end, size
            );

            let start = start as u32;
            let mut merged = vec![0u8; size];
            self.read_chunks(start, &mut merged, progress)?;
            merged[offset..offset + data.len()].copy_from_slice(data);
            self.write_aligned(start, &merged, verify, progress)?;
        }

        progress.complete();
        Ok(())
    }

    /// Erase then program a block-aligned range
    fn write_aligned(
        &mut self,
        addr: u32,
        data: &[u8],
        verify: bool,
        progress: &mut dyn FlashProgress,
    ) -> Result<()> {
        let bridge = self.bridge_size()?;
        self.erase_blocks(addr, data.len(), progress)?;

        progress.writing(data.len());
        let mut done = 0usize;
        for chunk in data.chunks(bridge) {
            let sfaddr = addr + done as u32;
            debug!(
                "write from memory @0x{:08x} to SPI flash @0x{:08x} ({} bytes)",
                self.memaddr,
                sfaddr,
                chunk.len()
            );

            memory::write(self.chan, self.memaddr, chunk, false)?;
            let args = FlashDataArgs::new(sfaddr, self.memaddr, chunk.len() as u32);
            self.chan
                .submit(&Command::FlashWrite, DataPhase::ToDevice(args.as_bytes()))?;

            done += chunk.len();
            progress.write_progress(done);
        }

        if verify {
            self.compare(addr, data, progress)?;
        }
        Ok(())
    }

    /// Read flash back and compare it with `expected`
    pub fn verify(&mut self, addr: u32, expected: &[u8]) -> Result<()> {
        self.verify_with_progress(addr, expected, &mut NoProgress)
    }

    /// Verify with progress reporting
    pub fn verify_with_progress(
        &mut self,
        addr: u32,
        expected: &[u8],
        progress: &mut dyn FlashProgress,
    ) -> Result<()> {
        self.compare(addr, expected, progress)?;
        progress.complete();
        Ok(())
    }

    fn compare(
        &mut self,
        addr: u32,
        expected: &[u8],
        progress: &mut dyn FlashProgress,
    ) -> Result<()> {
        info!("Verifying SPI flash @0x{:08x} ({} bytes)", addr, expected.len());
        self.check_range(addr, expected.len())?;
        let bridge = self.bridge_size()?;

        progress.verifying(expected.len());
        let mut actual = vec![0u8; bridge.min(expected.len())];
        let mut done = 0usize;
        for chunk in expected.chunks(bridge) {
            let sfaddr = addr + done as u32;
            let actual = &mut actual[..chunk.len()];
            self.read_bridged(sfaddr, actual)?;
            if let Some(pos) = actual.iter().zip(chunk).position(|(a, e)| a != e) {
                return Err(Error::VerificationFailed {
                    addr: sfaddr + pos as u32,
                });
            }
            done += chunk.len();
            progress.verify_progress(done);
        }

        info!("Verification successful");
        Ok(())
    }
}
