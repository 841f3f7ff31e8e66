//! SCSI generic device implementation
//!
//! This module provides the `ScsiGeneric` struct that implements the
//! `Transport` trait on top of the Linux `SG_IO` ioctl.

use crate::error::{Result, ScsiGenericError};

use it8951_core::protocol::{hex_dump, CDB_LEN, OPCODE_OFFSET};
use it8951_core::transport::{DataPhase, Transport};

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// Size of the sense buffer handed to the kernel
const SENSE_LEN: usize = 32;

/// Linux sg ioctl constants
mod ioctl {
    use nix::ioctl_readwrite_bad;

    /// SG_IO request number (scsi/sg.h)
    const SG_IO: libc::c_ulong = 0x2285;

    ioctl_readwrite_bad!(sg_io, SG_IO, super::SgIoHdr);
}

// Values from scsi/sg.h
const SG_INTERFACE_ID: libc::c_int = b'S' as libc::c_int;
const SG_FLAG_LUN_INHIBIT: libc::c_uint = 2;
const SG_DXFER_NONE: libc::c_int = -1;
const SG_DXFER_TO_DEV: libc::c_int = -2;
const SG_DXFER_FROM_DEV: libc::c_int = -3;

/// Never time out: the controller may take seconds to erase or refresh
const SG_TIMEOUT_NONE: libc::c_uint = libc::c_uint::MAX;

/// Request header for the SG_IO ioctl
/// This must match the kernel's struct sg_io_hdr layout
#[repr(C)]
#[derive(Debug)]
pub(crate) struct SgIoHdr {
    interface_id: libc::c_int,
    dxfer_direction: libc::c_int,
    cmd_len: libc::c_uchar,
    mx_sb_len: libc::c_uchar,
    iovec_count: libc::c_ushort,
    dxfer_len: libc::c_uint,
    dxferp: *mut libc::c_void,
    cmdp: *const libc::c_uchar,
    sbp: *mut libc::c_uchar,
    timeout: libc::c_uint,
    flags: libc::c_uint,
    pack_id: libc::c_int,
    usr_ptr: *mut libc::c_void,
    status: libc::c_uchar,
    masked_status: libc::c_uchar,
    msg_status: libc::c_uchar,
    sb_len_wr: libc::c_uchar,
    host_status: libc::c_ushort,
    driver_status: libc::c_ushort,
    resid: libc::c_int,
    duration: libc::c_uint,
    info: libc::c_uint,
}

impl SgIoHdr {
    fn new(cdb: &[u8; CDB_LEN], sense: &mut [u8; SENSE_LEN]) -> Self {
        Self {
            interface_id: SG_INTERFACE_ID,
            dxfer_direction: SG_DXFER_NONE,
            cmd_len: CDB_LEN as libc::c_uchar,
            mx_sb_len: SENSE_LEN as libc::c_uchar,
            iovec_count: 0,
            dxfer_len: 0,
            dxferp: std::ptr::null_mut(),
            cmdp: cdb.as_ptr(),
            sbp: sense.as_mut_ptr(),
            timeout: SG_TIMEOUT_NONE,
            flags: SG_FLAG_LUN_INHIBIT,
            pack_id: 0,
            usr_ptr: std::ptr::null_mut(),
            status: 0,
            masked_status: 0,
            msg_status: 0,
            sb_len_wr: 0,
            host_status: 0,
            driver_status: 0,
            resid: 0,
            duration: 0,
            info: 0,
        }
    }
}

/// IT8951 transport over a Linux SCSI generic device (`/dev/sgN`)
///
/// The device file is closed when the value is dropped.
pub struct ScsiGeneric {
    file: File,
    path: String,
}

impl ScsiGeneric {
    /// Open a SCSI generic device for read/write
    pub fn open(path: &str) -> Result<Self> {
        log::info!("Opening ITE device: {}", path);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| ScsiGenericError::OpenFailed {
                path: path.to_string(),
                source: e,
            })?;

        Ok(Self {
            file,
            path: path.to_string(),
        })
    }

    /// Device path
    pub fn path(&self) -> &str {
        &self.path
    }

    fn sg_io(&mut self, cdb: &[u8; CDB_LEN], data: DataPhase<'_>) -> Result<()> {
        let mut sense = [0u8; SENSE_LEN];
        let mut hdr = SgIoHdr::new(cdb, &mut sense);

        let (direction, ptr, len) = match data {
            DataPhase::None => (SG_DXFER_NONE, std::ptr::null_mut(), 0),
            DataPhase::ToDevice(buf) => (
                SG_DXFER_TO_DEV,
                buf.as_ptr() as *mut libc::c_void,
                buf.len(),
            ),
            DataPhase::FromDevice(buf) => (
                SG_DXFER_FROM_DEV,
                buf.as_mut_ptr() as *mut libc::c_void,
                buf.len(),
            ),
        };
        hdr.dxfer_direction = direction;
        hdr.dxferp = ptr;
        hdr.dxfer_len =
            libc::c_uint::try_from(len).map_err(|_| ScsiGenericError::BufferTooLarge(len))?;

        // SAFETY: every pointer in `hdr` refers to a buffer that outlives the
        // call, and `dxfer_len`/`mx_sb_len` match the buffers' lengths.
        unsafe { ioctl::sg_io(self.file.as_raw_fd(), &mut hdr) }.map_err(|e| {
            ScsiGenericError::IoctlFailed(std::io::Error::from_raw_os_error(e as i32))
        })?;

        if hdr.status != 0 || hdr.host_status != 0 || hdr.driver_status != 0 {
            let sense_len = (hdr.sb_len_wr as usize).min(SENSE_LEN);
            if sense_len > 0 {
                log::debug!(
                    "{}: sense data: {}",
                    self.path(),
                    hex_dump(&sense[..sense_len])
                );
            }
            return Err(ScsiGenericError::CommandFailed {
                opcode: cdb[OPCODE_OFFSET],
                status: hdr.status,
                host_status: hdr.host_status,
                driver_status: hdr.driver_status,
            });
        }

        if hdr.resid != 0 {
            log::debug!("sg: residual count {} bytes", hdr.resid);
        }
        Ok(())
    }
}

impl Transport for ScsiGeneric {
    fn submit(&mut self, cdb: &[u8; CDB_LEN], data: DataPhase<'_>) -> it8951_core::Result<()> {
        self.sg_io(cdb, data).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size_matches_kernel() {
        #[cfg(target_pointer_width = "64")]
        assert_eq!(std::mem::size_of::<SgIoHdr>(), 88);
        #[cfg(target_pointer_width = "32")]
        assert_eq!(std::mem::size_of::<SgIoHdr>(), 64);
    }

    #[test]
    fn test_header_defaults() {
        let cdb = [0u8; CDB_LEN];
        let mut sense = [0u8; SENSE_LEN];
        let hdr = SgIoHdr::new(&cdb, &mut sense);
        assert_eq!(hdr.interface_id, 'S' as i32);
        assert_eq!(hdr.flags, SG_FLAG_LUN_INHIBIT);
        assert_eq!(hdr.cmd_len, 16);
        assert_eq!(hdr.mx_sb_len, 32);
        assert_eq!(hdr.timeout, u32::MAX);
    }

    #[test]
    fn test_open_keeps_path() {
        let dev = ScsiGeneric::open("/dev/null").unwrap();
        assert_eq!(dev.path(), "/dev/null");
    }

    #[test]
    fn test_open_missing_device() {
        let result = ScsiGeneric::open("/nonexistent/sg99");
        assert!(matches!(result, Err(ScsiGenericError::OpenFailed { .. })));
    }
}
