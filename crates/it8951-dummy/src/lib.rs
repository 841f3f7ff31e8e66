//! it8951-dummy - In-memory IT8951 controller emulator
//!
//! This crate provides a transport that behaves like an IT8951 controller:
//! it answers the identity handshake, keeps image memory and SPI flash in
//! memory, and executes the flash bridge commands. It's useful for testing
//! and development without real hardware.

use std::io;

use it8951_core::error::{Error, Result};
use it8951_core::protocol::args::{
    DisplayAreaArgs, EraseArgs, FlashDataArgs, LoadAreaArgs, PmicResponse,
};
use it8951_core::protocol::identity::FRAME_COUNT_MODES;
use it8951_core::protocol::{opcodes, DeviceIdentity, CDB_LEN, OPCODE_OFFSET, VENDOR_MARKER};
use it8951_core::transport::{DataPhase, Transport};
use zerocopy::{FromBytes, IntoBytes};

/// Configuration for the dummy controller
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Panel width in pixels
    pub width: u32,
    /// Panel height in pixels
    pub height: u32,
    /// Address of image buffer 0
    pub memaddr: u32,
    /// Size of the image memory in bytes
    pub memory_size: usize,
    /// SPI flash size in bytes
    pub flash_size: usize,
    /// Number of image buffers reported
    pub buf_num: u32,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 825,
            memaddr: 0x0012_36E0,
            memory_size: 16 * 1024 * 1024,
            flash_size: 4 * 1024 * 1024,
            buf_num: 1,
        }
    }
}

impl DummyConfig {
    /// Default configuration with another panel size
    pub fn with_panel(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }
}

/// Last display refresh requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRecord {
    /// Encoded memory argument
    pub memaddr: u32,
    /// Waveform mode
    pub mode: u32,
    /// Zone origin and size: x, y, width, height
    pub zone: (u32, u32, u32, u32),
}

/// Emulated IT8951 controller
pub struct DummyController {
    config: DummyConfig,
    memory: Vec<u8>,
    flash: Vec<u8>,
    vcom: u16,
    power: bool,
    commands: Vec<u8>,
    last_display: Option<DisplayRecord>,
}

fn device_error(msg: String) -> Error {
    Error::Transport(io::Error::new(io::ErrorKind::InvalidInput, msg))
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

impl DummyController {
    /// Create a controller with erased flash and zeroed image memory
    pub fn new(config: DummyConfig) -> Self {
        let memory = vec![0; config.memory_size];
        let flash = vec![0xFF; config.flash_size];
        Self {
            config,
            memory,
            flash,
            vcom: 1500,
            power: false,
            commands: Vec::new(),
            last_display: None,
        }
    }

    /// Create a controller with the default configuration
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a controller with pre-filled flash
    pub fn with_flash(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut dev = Self::new(config);
        let len = initial_data.len().min(dev.flash.len());
        dev.flash[..len].copy_from_slice(&initial_data[..len]);
        dev
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Identity returned by the handshake
    pub fn identity(&self) -> DeviceIdentity {
        DeviceIdentity {
            std_cmd_num: 0x13,
            ext_cmd_num: 0x0C,
            signature: 0x3839_3531,
            version: 0x0001_0002,
            width: self.config.width,
            height: self.config.height,
            update_memaddr: self.config.memaddr,
            memaddr: self.config.memaddr,
            temp_seg_num: 10,
            mode: 6,
            frame_count: [0; FRAME_COUNT_MODES],
            buf_num: self.config.buf_num,
        }
    }

    /// Flash contents
    pub fn flash(&self) -> &[u8] {
        &self.flash
    }

    /// Mutable flash contents
    pub fn flash_mut(&mut self) -> &mut [u8] {
        &mut self.flash
    }

    /// Image memory contents
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Current VCOM in millivolts
    pub fn vcom(&self) -> u16 {
        self.vcom
    }

    /// Power rail state
    pub fn power(&self) -> bool {
        self.power
    }

    /// Opcodes of every command received, in order
    pub fn commands(&self) -> &[u8] {
        &self.commands
    }

    /// Number of commands received with the given opcode
    pub fn count(&self, opcode: u8) -> usize {
        self.commands.iter().filter(|&&op| op == opcode).count()
    }

    /// Forget the recorded commands
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Last display refresh
    pub fn last_display(&self) -> Option<DisplayRecord> {
        self.last_display
    }

    fn panel_size(&self) -> usize {
        self.config.width as usize * self.config.height as usize
    }

    /// Resolve a memory argument to an offset in image memory
    fn resolve(&self, arg: u32) -> Result<usize> {
        if arg & 0x8000_0000 == 0 {
            return Ok(arg as usize);
        }
        let index = (arg & !0x8000_0000) as usize;
        index
            .checked_mul(self.panel_size())
            .and_then(|offset| offset.checked_add(self.config.memaddr as usize))
            .ok_or_else(|| device_error(format!("image buffer index {} out of bounds", index)))
    }

    fn memory_range(&self, start: usize, len: usize) -> Result<std::ops::Range<usize>> {
        let end = start.checked_add(len).filter(|&end| end <= self.memory.len());
        let Some(end) = end else {
            return Err(device_error(format!(
                "image memory access 0x{:08x}+{} out of bounds",
                start, len
            )));
        };
        Ok(start..end)
    }

    fn flash_range(&self, addr: u32, len: usize) -> Result<std::ops::Range<usize>> {
        let start = addr as usize;
        let end = start + len;
        if end > self.flash.len() {
            return Err(device_error(format!(
                "SPI flash access 0x{:08x}+{} out of bounds",
                addr, len
            )));
        }
        Ok(start..end)
    }

    fn handle_get_sys(&mut self, cdb: &[u8; CDB_LEN], buf: &mut [u8]) -> Result<()> {
        if &cdb[2..6] != b"8951" {
            return Err(device_error("bad GET_SYS signature".into()));
        }
        let id = self.identity().to_bytes();
        let len = buf.len().min(id.len());
        buf[..len].copy_from_slice(&id[..len]);
        Ok(())
    }

    fn transfer_header(cdb: &[u8; CDB_LEN], data_len: usize) -> Result<u32> {
        let len = u16::from_be_bytes([cdb[7], cdb[8]]) as usize;
        if len != data_len {
            return Err(device_error(format!(
                "descriptor length {} doesn't match data phase {}",
                len, data_len
            )));
        }
        Ok(be_u32(&cdb[2..6]))
    }

    fn handle_read_mem(&mut self, cdb: &[u8; CDB_LEN], buf: &mut [u8]) -> Result<()> {
        let addr = Self::transfer_header(cdb, buf.len())?;
        let range = self.memory_range(addr as usize, buf.len())?;
        buf.copy_from_slice(&self.memory[range]);
        Ok(())
    }

    fn handle_write_mem(&mut self, cdb: &[u8; CDB_LEN], data: &[u8]) -> Result<()> {
        let addr = Self::transfer_header(cdb, data.len())?;
        let range = self.memory_range(addr as usize, data.len())?;
        self.memory[range].copy_from_slice(data);
        Ok(())
    }

    fn handle_load_area(&mut self, data: &[u8]) -> Result<()> {
        let (args, pixels) = LoadAreaArgs::read_from_prefix(data)
            .map_err(|_| device_error("short load area arguments".into()))?;
        let (x, y) = (args.x.get() as usize, args.y.get() as usize);
        let (width, height) = (args.width.get() as usize, args.height.get() as usize);
        if pixels.len() != width * height {
            return Err(device_error(format!(
                "load area of {}x{} with {} pixel bytes",
                width,
                height,
                pixels.len()
            )));
        }

        let base = self.resolve(args.memaddr.get())?;
        let stride = self.config.width as usize;
        for (row, line) in pixels.chunks(width.max(1)).enumerate() {
            let start = base + (y + row) * stride + x;
            let range = self.memory_range(start, line.len())?;
            self.memory[range].copy_from_slice(line);
        }
        Ok(())
    }

    fn handle_display_area(&mut self, data: &[u8]) -> Result<()> {
        let args = DisplayAreaArgs::read_from_bytes(data)
            .map_err(|_| device_error("bad display area arguments".into()))?;
        self.last_display = Some(DisplayRecord {
            memaddr: args.memaddr.get(),
            mode: args.mode.get(),
            zone: (
                args.x.get(),
                args.y.get(),
                args.width.get(),
                args.height.get(),
            ),
        });
        Ok(())
    }

    fn handle_erase(&mut self, data: &[u8]) -> Result<()> {
        let args = EraseArgs::read_from_bytes(data)
            .map_err(|_| device_error("bad erase arguments".into()))?;
        let range = self.flash_range(args.sfaddr.get(), args.size.get() as usize + 1)?;
        log::debug!("dummy: erase {:x?}", range);
        self.flash[range].fill(0xFF);
        Ok(())
    }

    fn handle_flash_read(&mut self, data: &[u8]) -> Result<()> {
        let args = FlashDataArgs::read_from_bytes(data)
            .map_err(|_| device_error("bad flash arguments".into()))?;
        let size = args.size.get() as usize;
        let src = self.flash_range(args.sfaddr.get(), size)?;
        let dst = self.memory_range(args.memaddr.get() as usize, size)?;
        self.memory[dst].copy_from_slice(&self.flash[src]);
        Ok(())
    }

    fn handle_flash_write(&mut self, data: &[u8]) -> Result<()> {
        let args = FlashDataArgs::read_from_bytes(data)
            .map_err(|_| device_error("bad flash arguments".into()))?;
        let size = args.size.get() as usize;
        let dst = self.flash_range(args.sfaddr.get(), size)?;
        let src = self.memory_range(args.memaddr.get() as usize, size)?;

        // Flash programming: can only change 1 -> 0
        for (byte, &new) in self.flash[dst].iter_mut().zip(&self.memory[src]) {
            *byte &= new;
        }
        Ok(())
    }

    fn handle_pmic(&mut self, cdb: &[u8; CDB_LEN], buf: &mut [u8]) -> Result<()> {
        let set_vcom = cdb[9] != 0;
        let set_power = cdb[10] != 0;
        if set_vcom {
            self.vcom = u16::from_be_bytes([cdb[7], cdb[8]]);
        }
        if set_power {
            self.power = cdb[11] != 0;
        }

        let mut resp = PmicResponse::default();
        resp.vcom.set(self.vcom);
        resp.set_vcom = set_vcom as u8;
        resp.set_pwr = set_power as u8;
        resp.pwr = self.power as u8;

        let bytes = resp.as_bytes();
        let len = buf.len().min(bytes.len());
        buf[..len].copy_from_slice(&bytes[..len]);
        Ok(())
    }
}

impl Transport for DummyController {
    fn submit(&mut self, cdb: &[u8; CDB_LEN], data: DataPhase<'_>) -> Result<()> {
        if cdb[0] != VENDOR_MARKER {
            return Err(device_error(format!("unknown command class 0x{:02x}", cdb[0])));
        }
        let opcode = cdb[OPCODE_OFFSET];
        self.commands.push(opcode);

        match (opcode, data) {
            (opcodes::GET_SYS, DataPhase::FromDevice(buf)) => self.handle_get_sys(cdb, buf),
            (opcodes::READ_MEM, DataPhase::FromDevice(buf)) => self.handle_read_mem(cdb, buf),
            (opcodes::WRITE_MEM | opcodes::FAST_WRITE_MEM, DataPhase::ToDevice(data)) => {
                self.handle_write_mem(cdb, data)
            }
            (opcodes::LOAD_IMG_AREA, DataPhase::ToDevice(data)) => self.handle_load_area(data),
            (opcodes::DISPLAY_AREA, DataPhase::ToDevice(data)) => self.handle_display_area(data),
            (opcodes::SPI_ERASE, DataPhase::ToDevice(data)) => self.handle_erase(data),
            (opcodes::SPI_READ, DataPhase::ToDevice(data)) => self.handle_flash_read(data),
            (opcodes::SPI_WRITE, DataPhase::ToDevice(data)) => self.handle_flash_write(data),
            (opcodes::PMIC_CTRL, DataPhase::FromDevice(buf)) => self.handle_pmic(cdb, buf),
            (opcode, data) => Err(device_error(format!(
                "unsupported command 0x{:02x} with {:?} data phase",
                opcode,
                data.direction()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use it8951_core::display::{self, Zone};
    use it8951_core::firmware;
    use it8951_core::flash::{FlashGeometry, FlashProgrammer};
    use it8951_core::image::Image;
    use it8951_core::protocol::{waveform, MemoryAddress};
    use it8951_core::{memory, pmic, Channel};

    fn open(config: DummyConfig) -> Channel<DummyController> {
        Channel::open(DummyController::new(config)).unwrap()
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 3) as u8).collect()
    }

    #[test]
    fn test_open_reports_panel() {
        let chan = open(DummyConfig::default());
        assert_eq!(chan.identity().width, 1200);
        assert_eq!(chan.identity().height, 825);
        assert_eq!(chan.identity().memaddr, 0x0012_36E0);
    }

    #[test]
    fn test_memory_chunking_lands_intact() {
        for (len, chunks) in [(65535, 1), (65536, 2), (131071, 3)] {
            let mut chan = open(DummyConfig::default());
            let data = pattern(len);
            memory::write(&mut chan, 0x1000, &data, false).unwrap();

            let dev = chan.transport_mut();
            assert_eq!(dev.count(opcodes::WRITE_MEM), chunks, "{} bytes", len);
            assert_eq!(&dev.memory()[0x1000..0x1000 + len], &data[..]);

            let back = memory::read_vec(&mut chan, 0x1000, len).unwrap();
            assert_eq!(back, data);
        }
    }

    #[test]
    fn test_flash_write_read_aligned() {
        let mut chan = open(DummyConfig::with_panel(256, 128));
        let data = pattern(0x20000);
        let mut flash = FlashProgrammer::new(&mut chan, FlashGeometry::default(), 0x1000);
        flash.write(0x10000, &data, true).unwrap();
        assert_eq!(flash.read_vec(0x10000, data.len()).unwrap(), data);

        let dev = chan.transport_mut();
        assert_eq!(dev.count(opcodes::SPI_ERASE), 2);
        assert_eq!(&dev.flash()[0x10000..0x30000], &data[..]);
    }

    #[test]
    fn test_flash_unaligned_write_preserves_surroundings() {
        let mut initial = vec![0u8; 0x30000];
        initial.iter_mut().enumerate().for_each(|(i, b)| *b = (i >> 8) as u8);
        let dev = DummyController::with_flash(DummyConfig::with_panel(200, 100), &initial);
        let mut chan = Channel::open(dev).unwrap();

        let data = pattern(0x12345);
        let addr = 0x0F_F00;
        FlashProgrammer::new(&mut chan, FlashGeometry::default(), 0x1000)
            .write(addr, &data, true)
            .unwrap();

        let flash = chan.transport_mut().flash();
        let addr = addr as usize;
        assert_eq!(&flash[addr..addr + data.len()], &data[..]);
        assert_eq!(&flash[..addr], &initial[..addr]);
        let end = addr + data.len();
        assert_eq!(&flash[end..0x30000], &initial[end..]);
    }

    #[test]
    fn test_flash_small_writes_round_trip() {
        let geometry = FlashGeometry::default();
        let initial = pattern(geometry.total_size() as usize);
        let dev = DummyController::with_flash(DummyConfig::with_panel(256, 128), &initial);
        let mut chan = Channel::open(dev).unwrap();
        let end = geometry.total_size() as u32;

        for (addr, len) in [(0x1_8000, 10), (end - 10, 10)] {
            let data = vec![0x5A; len];
            let mut flash = FlashProgrammer::new(&mut chan, geometry, 0x1000);
            flash.write(addr, &data, true).unwrap();

            let block = geometry.align_down(addr as u64) as u32;
            let back = flash.read_vec(block, geometry.block_size() as usize).unwrap();
            let offset = (addr - block) as usize;
            let block = block as usize;
            assert_eq!(&back[offset..offset + len], &data[..]);
            assert_eq!(&back[..offset], &initial[block..block + offset]);
            assert_eq!(
                &back[offset + len..],
                &initial[block + offset + len..block + back.len()]
            );
        }
    }

    #[test]
    fn test_buffer_index_overflow_is_rejected() {
        let mut chan = open(DummyConfig::with_panel(16, 8));
        let image = Image::monochrome(4, 4, 0xFF).unwrap();
        let mem = MemoryAddress::from_raw(0xFFFF_FFFF);
        let result = display::load_image_area(&mut chan, mem, &image, None);
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[test]
    fn test_flash_erase_one_byte() {
        let dev = DummyController::with_flash(DummyConfig::default(), &[0u8; 0x30000]);
        let mut chan = Channel::open(dev).unwrap();
        FlashProgrammer::new(&mut chan, FlashGeometry::default(), 0x1000)
            .erase(0x10000, 1)
            .unwrap();

        let dev = chan.transport_mut();
        assert_eq!(dev.count(opcodes::SPI_ERASE), 1);
        assert!(dev.flash()[0x10000..0x20000].iter().all(|&b| b == 0xFF));
        assert!(dev.flash()[0x20000..0x30000].iter().all(|&b| b == 0));
        assert_eq!(dev.flash()[0xFFFF], 0);
    }

    #[test]
    fn test_flash_out_of_range_write_sends_nothing() {
        let mut chan = open(DummyConfig::default());
        chan.transport_mut().clear_commands();
        let result = FlashProgrammer::new(&mut chan, FlashGeometry::default(), 0x1000).write(
            0x3F_0000,
            &[0u8; 0x10001],
            false,
        );
        assert!(matches!(result, Err(Error::OutOfRange { .. })));
        assert!(chan.transport_mut().commands().is_empty());
    }

    #[test]
    fn test_flash_verify_detects_corruption() {
        let mut chan = open(DummyConfig::with_panel(64, 64));
        let data = vec![0x11; 0x1000];
        FlashProgrammer::new(&mut chan, FlashGeometry::default(), 0x1000)
            .write(0, &data, false)
            .unwrap();
        chan.transport_mut().flash_mut()[0x800] = 0x10;

        let result =
            FlashProgrammer::new(&mut chan, FlashGeometry::default(), 0x1000).verify(0, &data);
        assert!(matches!(result, Err(Error::VerificationFailed { addr: 0x800 })));
    }

    #[test]
    fn test_load_and_display_area() {
        let mut chan = open(DummyConfig::with_panel(16, 8));
        let image = Image::new(4, 2, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let mem = MemoryAddress::from_raw(0);
        display::load_image_area(&mut chan, mem, &image, Some(Zone::new(2, 3, 0, 0))).unwrap();
        display::display_area(&mut chan, mem, waveform::DU, Some(Zone::new(2, 3, 4, 2))).unwrap();

        let dev = chan.transport_mut();
        let base = dev.config().memaddr as usize;
        assert_eq!(&dev.memory()[base + 3 * 16 + 2..base + 3 * 16 + 6], &[1, 2, 3, 4]);
        assert_eq!(&dev.memory()[base + 4 * 16 + 2..base + 4 * 16 + 6], &[5, 6, 7, 8]);
        assert_eq!(
            dev.last_display(),
            Some(DisplayRecord {
                memaddr: 0x8000_0000,
                mode: waveform::DU,
                zone: (2, 3, 4, 2),
            })
        );
    }

    #[test]
    fn test_pmic_set_and_query() {
        let mut chan = open(DummyConfig::default());
        let state = pmic::control(&mut chan, Some(2100), Some(true)).unwrap();
        assert_eq!(state.vcom, 2100);
        assert!(state.vcom_set && state.power_set && state.power_on);

        let state = pmic::control(&mut chan, None, None).unwrap();
        assert_eq!(state.vcom, 2100);
        assert!(!state.vcom_set && !state.power_set);
        assert!(chan.transport_mut().power());
    }

    fn firmware_image(version: &str) -> Vec<u8> {
        let mut fw = vec![0u8; 0x1000];
        let offset = firmware::VERSION_OFFSET as usize;
        fw[offset..offset + version.len()].copy_from_slice(version.as_bytes());
        fw
    }

    #[test]
    fn test_firmware_v03_boot_screens() {
        let mut initial = vec![0xFF; 0x18_0000];
        initial[..0x1000].copy_from_slice(&firmware_image("ITEEPD8951_A0100_v.0.3T"));
        initial[0x17_0000..0x17_0008].copy_from_slice(b"LOGO_\x28\x00\x00");
        let dev = DummyController::with_flash(DummyConfig::default(), &initial);
        let mut chan = Channel::open(dev).unwrap();
        let memaddr = chan.identity().memaddr;
        let mut flash = FlashProgrammer::new(&mut chan, FlashGeometry::default(), memaddr);

        let mut info = firmware::detect(&mut flash).unwrap();
        assert_eq!((info.major, info.minor), (0, 3));
        assert!(info.boot_screen_support);
        assert_eq!(info.boot_screens, vec![0x18_0000, 0x28_0000]);
        assert_eq!(info.active, Some(1));

        firmware::enable_boot_screen(&mut flash, &mut info, 0).unwrap();
        assert_eq!(info.active, Some(0));
        assert_eq!(firmware::detect(&mut flash).unwrap().active, Some(0));

        let image = Image::monochrome(1200, 825, 0x80).unwrap();
        firmware::write_boot_screen(&mut flash, &info, &image, 1).unwrap();
        assert!(firmware::enable_boot_screen(&mut flash, &mut info, 2).is_err());

        let dev = chan.transport_mut();
        assert_eq!(&dev.flash()[0x17_0000..0x17_0008], b"LOGO_\x18\x00\x00");
        assert!(dev.flash()[0x17_0008..0x18_0000].iter().all(|&b| b == 0xFF));
        assert!(dev.flash()[0x28_0000..0x28_0000 + 990_000]
            .iter()
            .all(|&b| b == 0x80));
    }

    #[test]
    fn test_firmware_v02_image_lib() {
        let config = DummyConfig::with_panel(64, 32);
        let mut initial = firmware_image("ITEEPD8951_v.0.2");
        initial.resize(0x8_0000, 0);
        let hdr = 0x4_0010;
        initial[hdr..hdr + 15].copy_from_slice(b"IT8951_ImageLib");
        initial[hdr + 32..hdr + 34].copy_from_slice(&1u16.to_be_bytes());
        initial[hdr + 50..hdr + 52].copy_from_slice(&8u16.to_be_bytes());
        initial[hdr + 52..hdr + 56].copy_from_slice(&0x200u32.to_be_bytes());
        initial[hdr + 56..hdr + 58].copy_from_slice(&64u16.to_be_bytes());
        initial[hdr + 58..hdr + 60].copy_from_slice(&32u16.to_be_bytes());

        let mut chan = Channel::open(DummyController::with_flash(config, &initial)).unwrap();
        let mut flash = FlashProgrammer::new(&mut chan, FlashGeometry::default(), 0x1000);
        let mut info = firmware::detect(&mut flash).unwrap();
        assert_eq!(info.boot_screens, vec![0x4_0210]);
        assert_eq!(info.active, Some(0));

        // single image firmware has no switch block
        assert!(firmware::enable_boot_screen(&mut flash, &mut info, 0).is_err());
    }

    #[test]
    fn test_firmware_old_version_has_no_boot_screen() {
        let dev = DummyController::with_flash(
            DummyConfig::with_panel(64, 32),
            &firmware_image("ITEEPD8951_v.0.1"),
        );
        let mut chan = Channel::open(dev).unwrap();
        let mut flash = FlashProgrammer::new(&mut chan, FlashGeometry::default(), 0x1000);
        let info = firmware::detect(&mut flash).unwrap();
        assert!(!info.boot_screen_support);

        let image = Image::monochrome(64, 32, 0).unwrap();
        assert!(matches!(
            firmware::write_boot_screen(&mut flash, &info, &image, 0),
            Err(Error::Firmware(_))
        ));
    }

    #[test]
    fn test_write_firmware() {
        let mut chan = open(DummyConfig::with_panel(128, 64));
        let fw = firmware_image("ITEEPD8951_v.0.3");
        let mut flash = FlashProgrammer::new(&mut chan, FlashGeometry::default(), 0x1000);
        firmware::write_firmware(&mut flash, &fw).unwrap();
        assert_eq!(flash.read_vec(0, fw.len()).unwrap(), fw);
    }
}
