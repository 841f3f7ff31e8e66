//! Raw image memory commands

use super::CommandResult;
use crate::devices::DeviceChannel;
use it8951_core::image::Image;
use it8951_core::memory;
use std::fs;
use std::path::Path;

/// Write an image's pixels at `memaddr`
pub fn run_write(chan: &mut DeviceChannel, memaddr: u32, image: &str, fast: bool) -> CommandResult {
    let image = Image::load(image)?;
    memory::write(chan, memaddr, image.pixels(), fast)?;
    println!(
        "Wrote {} bytes to memory @0x{:08x}",
        image.size(),
        memaddr
    );
    Ok(())
}

/// Read one screen worth of memory at `memaddr` into a file
pub fn run_read(chan: &mut DeviceChannel, memaddr: u32, output: &Path, pgm: bool) -> CommandResult {
    let (width, height, size) = {
        let id = chan.identity();
        (id.width, id.height, id.panel_size())
    };
    let data = memory::read_vec(chan, memaddr, size)?;

    if pgm {
        let image = Image::new(width, height, data)?;
        fs::write(output, image.to_pgm())?;
    } else {
        fs::write(output, &data)?;
    }
    println!(
        "Read {} bytes from memory @0x{:08x} into {}",
        size,
        memaddr,
        output.display()
    );
    Ok(())
}
