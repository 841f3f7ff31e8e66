//! Image memory transfers
//!
//! Memory read/write descriptors carry a 16-bit length, so transfers are
//! split into chunks of at most [`MAX_TRANSFER_LEN`] bytes. A failure aborts
//! the transfer; chunks already sent stay written.

use log::debug;

use crate::channel::Channel;
use crate::error::Result;
use crate::protocol::{Command, MAX_TRANSFER_LEN};
use crate::transport::{DataPhase, Transport};

/// Read `buf.len()` bytes of image memory starting at `addr`
pub fn read<T: Transport>(chan: &mut Channel<T>, addr: u32, buf: &mut [u8]) -> Result<()> {
    let mut offset = 0usize;
    for chunk in buf.chunks_mut(MAX_TRANSFER_LEN) {
        let chunk_addr = chunk_address(addr, offset)?;
        debug!("read memory 0x{:08x} ({} bytes)", chunk_addr, chunk.len());

        let cmd = Command::read_memory(chunk_addr, chunk.len())?;
        offset += chunk.len();
        chan.submit(&cmd, DataPhase::FromDevice(chunk))?;
    }
    Ok(())
}

/// Read `len` bytes of image memory into a new buffer
pub fn read_vec<T: Transport>(chan: &mut Channel<T>, addr: u32, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    read(chan, addr, &mut buf)?;
    Ok(buf)
}

/// Write `data` to image memory starting at `addr`
///
/// `fast` selects the fast write opcode.
pub fn write<T: Transport>(
    chan: &mut Channel<T>,
    addr: u32,
    data: &[u8],
    fast: bool,
) -> Result<()> {
    let mut offset = 0usize;
    for chunk in data.chunks(MAX_TRANSFER_LEN) {
        let chunk_addr = chunk_address(addr, offset)?;
        debug!(
            "{}write memory 0x{:08x} ({} bytes)",
            if fast { "fast " } else { "" },
            chunk_addr,
            chunk.len()
        );

        let cmd = Command::write_memory(chunk_addr, chunk.len(), fast)?;
        chan.submit(&cmd, DataPhase::ToDevice(chunk))?;
        offset += chunk.len();
    }
    Ok(())
}

fn chunk_address(addr: u32, offset: usize) -> Result<u32> {
    u32::try_from(addr as u64 + offset as u64).map_err(|_| crate::Error::OutOfRange {
        addr,
        len: offset,
        limit: u32::MAX as u64 + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::tests::MockTransport;
    use crate::protocol::opcodes;

    fn channel() -> Channel<MockTransport> {
        Channel::open(MockTransport::new(1200, 825)).unwrap()
    }

    fn chunk_headers(chan: &mut Channel<MockTransport>) -> Vec<(u32, u16)> {
        chan.transport_mut()
            .log
            .iter()
            .skip(1)
            .map(|(cdb, _)| {
                (
                    u32::from_be_bytes([cdb[2], cdb[3], cdb[4], cdb[5]]),
                    u16::from_be_bytes([cdb[7], cdb[8]]),
                )
            })
            .collect()
    }

    #[test]
    fn test_write_single_chunk_at_limit() {
        let mut chan = channel();
        write(&mut chan, 0x1000, &vec![1u8; 65535], false).unwrap();
        assert_eq!(chunk_headers(&mut chan), vec![(0x1000, 65535)]);
    }

    #[test]
    fn test_write_splits_past_limit() {
        let mut chan = channel();
        write(&mut chan, 0x1000, &vec![1u8; 65536], false).unwrap();
        assert_eq!(
            chunk_headers(&mut chan),
            vec![(0x1000, 65535), (0x1000 + 65535, 1)]
        );
    }

    #[test]
    fn test_write_two_full_chunks_plus_remainder() {
        let mut chan = channel();
        write(&mut chan, 0, &vec![1u8; 131071], false).unwrap();
        assert_eq!(
            chunk_headers(&mut chan),
            vec![(0, 65535), (65535, 65535), (131070, 1)]
        );
    }

    #[test]
    fn test_write_payload_and_opcode() {
        let mut chan = channel();
        write(&mut chan, 0x20, &[1, 2, 3], true).unwrap();
        let transport = chan.into_inner();
        assert_eq!(transport.opcodes(), vec![opcodes::FAST_WRITE_MEM]);
        assert_eq!(transport.log[1].1, vec![1, 2, 3]);
    }

    #[test]
    fn test_read_chunks() {
        let mut chan = channel();
        let data = read_vec(&mut chan, 0x100, 70000).unwrap();
        assert_eq!(data.len(), 70000);
        assert!(data.iter().all(|&b| b == 0xA5));
        assert_eq!(
            chunk_headers(&mut chan),
            vec![(0x100, 65535), (0x100 + 65535, (70000u32 - 65535) as u16)]
        );
        assert_eq!(
            chan.transport_mut().opcodes(),
            vec![opcodes::READ_MEM, opcodes::READ_MEM]
        );
    }

    #[test]
    fn test_read_empty_sends_nothing() {
        let mut chan = channel();
        let data = read_vec(&mut chan, 0x100, 0).unwrap();
        assert!(data.is_empty());
        assert!(chan.transport_mut().opcodes().is_empty());
    }
}
