//! Transport abstraction
//!
//! A transport delivers one 16-byte descriptor plus an optional data phase
//! to the controller and waits for completion. The Linux SCSI generic
//! backend lives in `it8951-sg`; the in-memory emulator in `it8951-dummy`.

use crate::error::Result;
use crate::protocol::CDB_LEN;

/// Direction of a command's data phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// No data phase
    None,
    /// Host to controller
    ToDevice,
    /// Controller to host
    FromDevice,
}

/// Data phase buffer handed to a transport
#[derive(Debug)]
pub enum DataPhase<'a> {
    /// No data
    None,
    /// Bytes sent to the controller
    ToDevice(&'a [u8]),
    /// Buffer filled by the controller
    FromDevice(&'a mut [u8]),
}

impl DataPhase<'_> {
    /// Direction of this data phase
    pub fn direction(&self) -> Direction {
        match self {
            DataPhase::None => Direction::None,
            DataPhase::ToDevice(_) => Direction::ToDevice,
            DataPhase::FromDevice(_) => Direction::FromDevice,
        }
    }

    /// Length of the data buffer
    pub fn len(&self) -> usize {
        match self {
            DataPhase::None => 0,
            DataPhase::ToDevice(data) => data.len(),
            DataPhase::FromDevice(buf) => buf.len(),
        }
    }

    /// True when there is no data to move
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Something that can execute one IT8951 command
///
/// Implementations block until the controller has completed the command.
/// There is no timeout and no retry at this level. Any failure, including a
/// non-zero SCSI status, is reported as [`crate::Error::Transport`].
pub trait Transport {
    /// Execute one descriptor with its data phase
    fn submit(&mut self, cdb: &[u8; CDB_LEN], data: DataPhase<'_>) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn submit(&mut self, cdb: &[u8; CDB_LEN], data: DataPhase<'_>) -> Result<()> {
        (**self).submit(cdb, data)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn submit(&mut self, cdb: &[u8; CDB_LEN], data: DataPhase<'_>) -> Result<()> {
        (**self).submit(cdb, data)
    }
}
