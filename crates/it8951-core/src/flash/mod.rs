//! SPI flash programming through the image memory bridge
//!
//! The controller cannot move flash data over the command channel directly.
//! Reads copy a flash range into image memory and then read that memory;
//! writes go the other way. The bridge holds one full-panel image, so every
//! transfer is cut into `width * height` byte chunks.

mod geometry;
mod progress;
mod programmer;

pub use geometry::FlashGeometry;
pub use progress::{FlashProgress, NoProgress};
pub use programmer::FlashProgrammer;
