//! Rectangular panel areas

use std::fmt;
use std::str::FromStr;

use log::info;

/// Rectangle on the panel; a zero width or height means "unspecified"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zone {
    /// Origin X
    pub x: u32,
    /// Origin Y
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Zone {
    /// Build a zone
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the zone covers no pixel
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Fit a user zone to an image and to the panel
    ///
    /// Width and height are first limited to the image (unset values take
    /// the image dimensions), then to the space left on the panel from the
    /// zone origin (unset values take all of it).
    pub fn sanitize(user: Option<Zone>, panel: (u32, u32), image: Option<(u32, u32)>) -> Zone {
        let mut zone = user.unwrap_or_default();
        if user.is_some() {
            info!("Zone (user args): {}", zone);
        }

        if let Some((img_width, img_height)) = image {
            if zone.width == 0 || zone.width > img_width {
                zone.width = img_width;
            }
            if zone.height == 0 || zone.height > img_height {
                zone.height = img_height;
            }
        }

        let (panel_width, panel_height) = panel;
        let room_x = panel_width.saturating_sub(zone.x);
        let room_y = panel_height.saturating_sub(zone.y);
        if zone.width == 0 || zone.width > room_x {
            zone.width = room_x;
        }
        if zone.height == 0 || zone.height > room_y {
            zone.height = room_y;
        }

        info!("Zone (sanitized): {}", zone);
        zone
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x={} y={} width={} height={}",
            self.x, self.y, self.width, self.height
        )
    }
}

impl FromStr for Zone {
    type Err = String;

    /// Parse `XxY` or `XxYxWxH`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split('x')
            .map(|v| v.parse::<u32>().map_err(|e| format!("invalid zone '{}': {}", s, e)))
            .collect::<Result<Vec<_>, _>>()?;

        match values[..] {
            [x, y] => Ok(Zone::new(x, y, 0, 0)),
            [x, y, width, height] => Ok(Zone::new(x, y, width, height)),
            _ => Err(format!("invalid zone '{}': expected XxY or XxYxWxH", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_zone_no_image_covers_panel() {
        let zone = Zone::sanitize(None, (1200, 1600), None);
        assert_eq!(zone, Zone::new(0, 0, 1200, 1600));
    }

    #[test]
    fn test_image_then_panel_clamp() {
        let user = Zone::new(1100, 0, 0, 0);
        let zone = Zone::sanitize(Some(user), (1200, 1600), Some((400, 300)));
        assert_eq!(zone, Zone::new(1100, 0, 100, 300));
    }

    #[test]
    fn test_height_clamped_against_image_height() {
        let user = Zone::new(0, 0, 100, 500);
        let zone = Zone::sanitize(Some(user), (1200, 1600), Some((400, 300)));
        assert_eq!(zone, Zone::new(0, 0, 100, 300));
    }

    #[test]
    fn test_fits_inside_panel() {
        let user = Zone::new(100, 200, 2000, 2000);
        let zone = Zone::sanitize(Some(user), (1200, 1600), None);
        assert_eq!(zone.x + zone.width, 1200);
        assert_eq!(zone.y + zone.height, 1600);
    }

    #[test]
    fn test_origin_beyond_panel_is_empty() {
        let user = Zone::new(1300, 0, 10, 10);
        let zone = Zone::sanitize(Some(user), (1200, 1600), None);
        assert!(zone.is_empty());
    }

    #[test]
    fn test_parse() {
        assert_eq!("10x20".parse::<Zone>().unwrap(), Zone::new(10, 20, 0, 0));
        assert_eq!(
            "10x20x30x40".parse::<Zone>().unwrap(),
            Zone::new(10, 20, 30, 40)
        );
        assert!("10x20x30".parse::<Zone>().is_err());
        assert!("axb".parse::<Zone>().is_err());
    }
}
