//! SPI flash geometry
//!
//! The default matches the only flash part found on IT8951 boards. Other
//! geometries can be described in a TOML file:
//!
//! ```toml
//! [flash]
//! block_size = 0x10000
//! block_count = 64
//! sector_size = 0x1000
//! ```

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Erase granularity and size of the SPI flash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashGeometry {
    block_size: u32,
    block_count: u32,
    sector_size: u32,
}

impl Default for FlashGeometry {
    fn default() -> Self {
        Self {
            block_size: 64 * 1024,
            block_count: 64,
            sector_size: 4 * 1024,
        }
    }
}

impl FlashGeometry {
    /// Validate and build a geometry
    pub fn new(block_size: u32, block_count: u32, sector_size: u32) -> Result<Self> {
        if block_size == 0 || !block_size.is_power_of_two() {
            return Err(Error::InvalidArgument(format!(
                "flash block size {} is not a power of two",
                block_size
            )));
        }
        if block_count == 0 {
            return Err(Error::InvalidArgument("flash block count is zero".into()));
        }
        if sector_size == 0 || !sector_size.is_power_of_two() || sector_size > block_size {
            return Err(Error::InvalidArgument(format!(
                "flash sector size {} does not divide the block size {}",
                sector_size, block_size
            )));
        }
        if block_size as u64 * block_count as u64 > u32::MAX as u64 + 1 {
            return Err(Error::InvalidArgument(
                "flash larger than the 32-bit address space".into(),
            ));
        }
        Ok(Self {
            block_size,
            block_count,
            sector_size,
        })
    }

    /// Erase block size in bytes
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Number of erase blocks
    pub fn block_count(&self) -> u32 {
        self.block_count
    }

    /// Sector size in bytes
    pub fn sector_size(&self) -> u32 {
        self.sector_size
    }

    /// Total flash size in bytes
    pub fn total_size(&self) -> u64 {
        self.block_size as u64 * self.block_count as u64
    }

    /// Start of the block containing `addr`
    pub fn align_down(&self, addr: u64) -> u64 {
        addr & !(self.block_size as u64 - 1)
    }

    /// `addr` itself when block-aligned, otherwise the next block boundary
    pub fn align_up(&self, addr: u64) -> u64 {
        let down = self.align_down(addr);
        if down == addr {
            addr
        } else {
            down + self.block_size as u64
        }
    }

    /// True when `addr` is on a block boundary
    pub fn is_aligned(&self, addr: u64) -> bool {
        self.align_down(addr) == addr
    }

    /// Number of blocks needed to cover `size` bytes
    pub fn blocks_for(&self, size: u64) -> u64 {
        size.div_ceil(self.block_size as u64)
    }

    /// Parse a TOML geometry description
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: TomlGeometryFile = toml::from_str(content)
            .map_err(|e| Error::InvalidArgument(format!("flash geometry: {}", e)))?;
        let defaults = Self::default();
        let flash = file.flash;
        Self::new(
            flash.block_size.unwrap_or(defaults.block_size),
            flash.block_count.unwrap_or(defaults.block_count),
            flash.sector_size.unwrap_or(defaults.sector_size),
        )
    }

    /// Load a TOML geometry description from a file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::InvalidArgument(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }
}

#[derive(Debug, serde::Deserialize)]
struct TomlGeometryFile {
    flash: TomlGeometry,
}

#[derive(Debug, serde::Deserialize)]
struct TomlGeometry {
    #[serde(default, deserialize_with = "deserialize_opt_hex_u32")]
    block_size: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_opt_hex_u32")]
    block_count: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_opt_hex_u32")]
    sector_size: Option<u32>,
}

/// Deserialize a u32 written as an integer or as a "0x..." string
fn deserialize_opt_hex_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum HexOrInt {
        Int(u32),
        Str(String),
    }

    match HexOrInt::deserialize(deserializer)? {
        HexOrInt::Int(n) => Ok(Some(n)),
        HexOrInt::Str(s) => parse_number(&s).map(Some).map_err(serde::de::Error::custom),
    }
}

fn parse_number(s: &str) -> std::result::Result<u32, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("invalid hex: {}", e))
    } else {
        s.parse().map_err(|e| format!("invalid number: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let geo = FlashGeometry::default();
        assert_eq!(geo.total_size(), 4 * 1024 * 1024);
        assert_eq!(geo.block_size(), 0x10000);
        assert_eq!(geo.sector_size(), 0x1000);
    }

    #[test]
    fn test_align() {
        let geo = FlashGeometry::default();
        assert_eq!(geo.align_down(0x12345), 0x10000);
        assert_eq!(geo.align_up(0x12345), 0x20000);
        assert_eq!(geo.align_up(0x20000), 0x20000);
        assert_eq!(geo.align_down(0x20000), 0x20000);
        assert_eq!(geo.align_up(0), 0);
        assert!(geo.is_aligned(0x30000));
        assert!(!geo.is_aligned(0x30001));
    }

    #[test]
    fn test_blocks_for() {
        let geo = FlashGeometry::default();
        assert_eq!(geo.blocks_for(0), 0);
        assert_eq!(geo.blocks_for(1), 1);
        assert_eq!(geo.blocks_for(0x10000), 1);
        assert_eq!(geo.blocks_for(0x10001), 2);
    }

    #[test]
    fn test_new_rejects_bad_values() {
        assert!(FlashGeometry::new(0, 64, 4096).is_err());
        assert!(FlashGeometry::new(3000, 64, 1000).is_err());
        assert!(FlashGeometry::new(0x10000, 0, 4096).is_err());
        assert!(FlashGeometry::new(0x1000, 64, 0x10000).is_err());
        assert!(FlashGeometry::new(0x10000, 128, 0x1000).is_ok());
    }

    #[test]
    fn test_from_toml() {
        let geo = FlashGeometry::from_toml_str(
            r#"
            [flash]
            block_size = "0x8000"
            block_count = 32
            "#,
        )
        .unwrap();
        assert_eq!(geo.block_size(), 0x8000);
        assert_eq!(geo.block_count(), 32);
        assert_eq!(geo.sector_size(), 0x1000);
        assert_eq!(geo.total_size(), 1024 * 1024);
    }

    #[test]
    fn test_from_toml_invalid() {
        assert!(FlashGeometry::from_toml_str("[flash]\nblock_size = 1000\n").is_err());
        assert!(FlashGeometry::from_toml_str("block_size = 4096\n").is_err());
    }
}
