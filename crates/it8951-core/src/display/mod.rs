//! Panel updates: loading pixels into image memory and refreshing areas

mod zone;

pub use zone::Zone;

use log::{debug, info};
use zerocopy::IntoBytes;

use crate::channel::Channel;
use crate::error::{Error, Result};
use crate::image::Image;
use crate::protocol::args::{DisplayAreaArgs, LoadAreaArgs};
use crate::protocol::{hex_dump, Command, MemoryAddress};
use crate::transport::{DataPhase, Transport};

fn panel<T: Transport>(chan: &Channel<T>) -> (u32, u32) {
    let id = chan.identity();
    (id.width, id.height)
}

/// Load an image into an image memory area
///
/// The zone is fitted to the image and the panel, then the argument block
/// and the zone's pixels travel as one transfer. Pixels are taken from the
/// top-left corner of the image.
pub fn load_image_area<T: Transport>(
    chan: &mut Channel<T>,
    mem: MemoryAddress,
    image: &Image,
    zone: Option<Zone>,
) -> Result<()> {
    info!("Loading {}x{} image", image.width(), image.height());

    let zone = Zone::sanitize(zone, panel(chan), Some((image.width(), image.height())));
    if zone.is_empty() {
        return Err(Error::InvalidArgument(format!("empty zone ({})", zone)));
    }

    let args = LoadAreaArgs::new(mem.to_arg(), &zone);
    debug!("Memory address: {:08x}", mem.to_arg());
    debug!("Data size: {}", zone.area());
    debug!("Arguments: {}", hex_dump(args.as_bytes()));

    let mut payload = Vec::with_capacity(args.as_bytes().len() + zone.area());
    payload.extend_from_slice(args.as_bytes());
    payload.extend_from_slice(&image.window(zone.width, zone.height));

    chan.submit(&Command::LoadImageArea, DataPhase::ToDevice(&payload))
}

/// Refresh a panel area from image memory using a waveform mode
pub fn display_area<T: Transport>(
    chan: &mut Channel<T>,
    mem: MemoryAddress,
    mode: u32,
    zone: Option<Zone>,
) -> Result<()> {
    info!("Display area (mode {})", mode);

    let zone = Zone::sanitize(zone, panel(chan), None);
    if zone.is_empty() {
        return Err(Error::InvalidArgument(format!("empty zone ({})", zone)));
    }

    let args = DisplayAreaArgs::new(mem.to_arg(), mode, &zone);
    debug!("Arguments: {}", hex_dump(args.as_bytes()));

    chan.submit(&Command::DisplayArea, DataPhase::ToDevice(args.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::tests::MockTransport;
    use crate::protocol::{opcodes, waveform};

    #[test]
    fn test_load_image_area_payload() {
        let mut chan = Channel::open(MockTransport::new(4, 4)).unwrap();
        let image = Image::new(3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        load_image_area(&mut chan, MemoryAddress::from_raw(0), &image, Some(Zone::new(2, 0, 0, 0)))
            .unwrap();

        let transport = chan.into_inner();
        assert_eq!(transport.opcodes(), vec![opcodes::LOAD_IMG_AREA]);
        let payload = &transport.log[1].1;
        assert_eq!(
            &payload[..20],
            &[
                0x80, 0, 0, 0, // buffer 0
                0, 0, 0, 2, // x
                0, 0, 0, 0, // y
                0, 0, 0, 2, // width clamped to the panel
                0, 0, 0, 2, // height from the image
            ]
        );
        assert_eq!(&payload[20..], &[1, 2, 4, 5]);
    }

    #[test]
    fn test_load_image_area_empty_zone() {
        let mut chan = Channel::open(MockTransport::new(4, 4)).unwrap();
        let image = Image::monochrome(2, 2, 0).unwrap();
        let zone = Some(Zone::new(9, 0, 0, 0));
        let result = load_image_area(&mut chan, MemoryAddress::from_raw(0), &image, zone);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(chan.transport_mut().opcodes().is_empty());
    }

    #[test]
    fn test_display_area_args() {
        let mut chan = Channel::open(MockTransport::new(1200, 825)).unwrap();
        let mem = MemoryAddress::from_raw(0x0012_36E0);
        display_area(&mut chan, mem, waveform::GC16, None).unwrap();

        let transport = chan.into_inner();
        assert_eq!(transport.opcodes(), vec![opcodes::DISPLAY_AREA]);
        let payload = &transport.log[1].1;
        assert_eq!(payload.len(), 28);
        assert_eq!(&payload[0..4], &[0x00, 0x12, 0x36, 0xE0]);
        assert_eq!(&payload[4..8], &[0, 0, 0, 2]);
        assert_eq!(&payload[16..20], &1200u32.to_be_bytes());
        assert_eq!(&payload[20..24], &825u32.to_be_bytes());
        assert_eq!(&payload[24..28], &[0, 0, 0, 1]);
    }
}
