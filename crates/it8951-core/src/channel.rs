//! An open, identified connection to an IT8951 controller

use log::{debug, info};

use crate::error::{Error, Result};
use crate::protocol::identity::IDENTITY_LEN;
use crate::protocol::{hex_dump, Command, DeviceIdentity};
use crate::transport::{DataPhase, Transport};

/// Transport plus the identity read at open time
///
/// Every other operation of this crate borrows a channel mutably, so a
/// channel is used by a single thread at a time and commands never overlap.
pub struct Channel<T: Transport> {
    transport: T,
    identity: DeviceIdentity,
}

impl<T: Transport> Channel<T> {
    /// Run the identity handshake and check the device signature
    pub fn open(mut transport: T) -> Result<Self> {
        let mut raw = [0u8; IDENTITY_LEN];
        let cmd = Command::GetSys;
        transport.submit(&cmd.encode(), DataPhase::FromDevice(&mut raw))?;

        let identity = DeviceIdentity::parse(&raw)?;
        identity.check_signature()?;

        info!(
            "Found IT8951 controller (version 0x{:08x}), panel {}x{}, image memory at 0x{:08x}",
            identity.version, identity.width, identity.height, identity.memaddr
        );
        debug!("{:?}", identity);

        Ok(Self {
            transport,
            identity,
        })
    }

    /// Identity reported by the controller
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Send one command with its data phase
    pub fn submit(&mut self, cmd: &Command, data: DataPhase<'_>) -> Result<()> {
        let cdb = cmd.encode();

        if !data.is_empty() && data.direction() != cmd.direction() {
            return Err(Error::InvalidArgument(format!(
                "{} expects a {:?} data phase, got {:?}",
                cmd.name(),
                cmd.direction(),
                data.direction()
            )));
        }

        debug!(
            "{}: cdb [{}] data {} bytes {:?}",
            cmd.name(),
            hex_dump(&cdb),
            data.len(),
            data.direction()
        );
        self.transport.submit(&cdb, data)
    }

    /// Borrow the underlying transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the transport
    pub fn into_inner(self) -> T {
        self.transport
    }
}

impl<T: Transport + 'static> Channel<T> {
    /// Hide the transport type, keeping the identity read at open time
    pub fn boxed(self) -> Channel<Box<dyn Transport>> {
        Channel {
            transport: Box::new(self.transport),
            identity: self.identity,
        }
    }
}
