//! 8-bit grayscale images
//!
//! Images come either from a binary PGM (`P5`) file or from a `WxHxC`
//! string describing a monochrome image of color `C`.

use std::path::Path;

use log::info;

use crate::error::{Error, Result};

/// Largest image accepted, in pixels
pub const MAX_IMAGE_PIXELS: usize = 2048 * 2048;

/// 8bpp image, one byte per pixel, row by row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    max_value: u8,
    pixels: Vec<u8>,
}

impl Image {
    /// Wrap a pixel buffer of exactly `width * height` bytes
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let size = checked_size(width, height)?;
        if pixels.len() != size {
            return Err(Error::Image(format!(
                "{} bytes of pixels for a {}x{} image",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            max_value: u8::MAX,
            pixels,
        })
    }

    /// Image filled with a single gray level
    pub fn monochrome(width: u32, height: u32, color: u8) -> Result<Self> {
        info!("Building monochrome image {}x{} (color={})", width, height, color);
        let size = checked_size(width, height)?;
        Ok(Self {
            width,
            height,
            max_value: color,
            pixels: vec![color; size],
        })
    }

    /// Parse a `WxHxC` monochrome image string
    ///
    /// Returns `None` when `spec` does not have that shape, so the caller
    /// can treat it as a file name.
    pub fn parse_spec(spec: &str) -> Option<Result<Self>> {
        let mut parts = spec.split('x');
        let width = parts.next()?.parse::<u32>().ok()?;
        let height = parts.next()?.parse::<u32>().ok()?;
        let color = parts.next()?.parse::<u8>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::monochrome(width, height, color))
    }

    /// Load a `WxHxC` image string or a PGM file
    pub fn load(name: &str) -> Result<Self> {
        if let Some(image) = Self::parse_spec(name) {
            return image;
        }
        Self::from_file(name)
    }

    /// Read and decode a PGM file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading image from {}", path.display());
        let bytes = std::fs::read(path)
            .map_err(|e| Error::Image(format!("failed to read {}: {}", path.display(), e)))?;
        let image = Self::from_pgm(&bytes)?;
        info!(
            "Found PGM image {}x{} (maxval={})",
            image.width, image.height, image.max_value
        );
        Ok(image)
    }

    /// Decode a binary PGM (`P5`) image with 8-bit samples
    pub fn from_pgm(bytes: &[u8]) -> Result<Self> {
        let mut header = PgmHeader::new(bytes);

        let magic = header.token()?;
        if magic != b"P5" {
            return Err(Error::Image("not a binary PGM file (P5)".into()));
        }
        let width = header.number("width")?;
        let height = header.number("height")?;
        let max_value = header.number("maxval")?;
        if max_value > u8::MAX as u32 {
            return Err(Error::Image(format!(
                "maxval {} needs 16-bit samples, only 8-bit is supported",
                max_value
            )));
        }

        let size = checked_size(width, height)?;
        let payload = header.payload()?;
        if payload.len() != size {
            return Err(Error::Image(format!(
                "read {} bytes, expected {} bytes ({}x{})",
                payload.len(),
                size,
                width,
                height
            )));
        }

        Ok(Self {
            width,
            height,
            max_value: max_value as u8,
            pixels: payload.to_vec(),
        })
    }

    /// Encode as binary PGM with maxval 255
    pub fn to_pgm(&self) -> Vec<u8> {
        let mut out = format!("P5\n{} {}\n255\n", self.width, self.height).into_bytes();
        out.extend_from_slice(&self.pixels);
        out
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Maximum gray value
    pub fn max_value(&self) -> u8 {
        self.max_value
    }

    /// Pixel bytes
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of bytes in the image
    pub fn size(&self) -> usize {
        self.pixels.len()
    }

    /// Top-left `width x height` window, row by row
    pub fn window(&self, width: u32, height: u32) -> Vec<u8> {
        let width = width.min(self.width) as usize;
        let height = height.min(self.height) as usize;
        let stride = self.width as usize;

        let mut out = Vec::with_capacity(width * height);
        for row in self.pixels.chunks(stride).take(height) {
            out.extend_from_slice(&row[..width]);
        }
        out
    }
}

fn checked_size(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::Image(format!("empty image {}x{}", width, height)));
    }
    let size = width as u64 * height as u64;
    if size > MAX_IMAGE_PIXELS as u64 {
        return Err(Error::Image(format!("size too large: {} bytes", size)));
    }
    Ok(size as usize)
}

/// Tokenizer over the text header of a PGM file
struct PgmHeader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> PgmHeader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn skip_blanks_and_comments(&mut self) {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b == b'#' {
                while let Some(&c) = self.bytes.get(self.pos) {
                    self.pos += 1;
                    if c == b'\n' {
                        break;
                    }
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn token(&mut self) -> Result<&'a [u8]> {
        self.skip_blanks_and_comments();
        let start = self.pos;
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|b| !b.is_ascii_whitespace() && *b != b'#')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(Error::Image("truncated PGM header".into()));
        }
        Ok(&self.bytes[start..self.pos])
    }

    fn number(&mut self, what: &str) -> Result<u32> {
        let token = self.token()?;
        let value = std::str::from_utf8(token)
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|&v| v > 0)
            .ok_or_else(|| Error::Image(format!("invalid {} in PGM header", what)))?;
        Ok(value)
    }

    /// Pixel data after the single whitespace byte ending the header
    fn payload(&self) -> Result<&'a [u8]> {
        match self.bytes.get(self.pos) {
            Some(b) if b.is_ascii_whitespace() => Ok(&self.bytes[self.pos + 1..]),
            _ => Err(Error::Image("missing pixel data".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pgm() {
        let mut data = b"P5\n3 2\n255\n".to_vec();
        data.extend_from_slice(&[0, 1, 2, 3, 4, 5]);
        let img = Image::from_pgm(&data).unwrap();
        assert_eq!(img.width(), 3);
        assert_eq!(img.height(), 2);
        assert_eq!(img.max_value(), 255);
        assert_eq!(img.pixels(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_from_pgm_with_comments() {
        let mut data = b"P5\n# created by hand\n2 # width\n2\n# depth\n15\n".to_vec();
        data.extend_from_slice(&[10, 11, 12, 13]);
        let img = Image::from_pgm(&data).unwrap();
        assert_eq!((img.width(), img.height()), (2, 2));
        assert_eq!(img.max_value(), 15);
    }

    #[test]
    fn test_from_pgm_pixel_looks_like_whitespace() {
        let mut data = b"P5 2 1 255\n".to_vec();
        data.extend_from_slice(&[b'\n', b' ']);
        let img = Image::from_pgm(&data).unwrap();
        assert_eq!(img.pixels(), b"\n ");
    }

    #[test]
    fn test_from_pgm_short_payload() {
        let mut data = b"P5\n4 4\n255\n".to_vec();
        data.extend_from_slice(&[0; 15]);
        assert!(matches!(Image::from_pgm(&data), Err(Error::Image(_))));
    }

    #[test]
    fn test_from_pgm_rejects_ascii_pgm() {
        assert!(Image::from_pgm(b"P2\n1 1\n255\n0\n").is_err());
    }

    #[test]
    fn test_from_pgm_rejects_zero_dimension() {
        assert!(Image::from_pgm(b"P5\n0 1\n255\n").is_err());
    }

    #[test]
    fn test_to_pgm_decodes_back() {
        let img = Image::new(2, 2, vec![1, 2, 3, 4]).unwrap();
        let bytes = img.to_pgm();
        assert!(bytes.starts_with(b"P5\n2 2\n255\n"));
        assert_eq!(Image::from_pgm(&bytes).unwrap(), img);
    }

    #[test]
    fn test_parse_spec() {
        let img = Image::parse_spec("800x600x255").unwrap().unwrap();
        assert_eq!((img.width(), img.height()), (800, 600));
        assert!(img.pixels().iter().all(|&p| p == 0xFF));

        assert!(Image::parse_spec("picture.pgm").is_none());
        assert!(Image::parse_spec("800x600x256").is_none());
        assert!(Image::parse_spec("800x600").is_none());
    }

    #[test]
    fn test_monochrome_too_large() {
        assert!(Image::monochrome(4096, 4096, 0).is_err());
        assert!(Image::monochrome(2048, 2048, 0).is_ok());
    }

    #[test]
    fn test_window() {
        let img = Image::new(3, 3, (0..9).collect()).unwrap();
        assert_eq!(img.window(2, 2), vec![0, 1, 3, 4]);
        assert_eq!(img.window(3, 1), vec![0, 1, 2]);
        assert_eq!(img.window(5, 5), (0..9).collect::<Vec<_>>());
    }
}
