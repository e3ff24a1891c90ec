//! Point types and coordinate normalization.
//!
//! The movement history reports coordinates as packed 16-bit fields carried
//! in 32-bit integers. Which normalization applies depends on the
//! [`ResolutionMode`] the history was queried with.

use serde::{Deserialize, Serialize};

/// A normalized mouse position in the window's local coordinate space.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MousePoint {
    pub x: i32,
    pub y: i32,
}

impl MousePoint {
    pub const ORIGIN: MousePoint = MousePoint { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Mask both axes to their low 16 bits, as the history query expects.
    pub fn masked(self) -> Self {
        Self {
            x: mask_coord(self.x),
            y: mask_coord(self.y),
        }
    }
}

/// One raw sample from the platform movement history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryPoint {
    pub x: i32,
    pub y: i32,
    /// Message-clock timestamp in milliseconds.
    pub time: u32,
    pub extra_info: usize,
}

impl HistoryPoint {
    pub fn new(x: i32, y: i32, time: u32) -> Self {
        Self {
            x,
            y,
            time,
            extra_info: 0,
        }
    }
}

/// Coordinate convention used by the movement history query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Packed 16-bit screen points.
    #[default]
    Display,
    /// Absolute device coordinates in `0..=65535` spanning the virtual screen.
    HighResolution,
}

impl ResolutionMode {
    /// Raw value passed to the platform query.
    pub fn as_raw(self) -> u32 {
        match self {
            ResolutionMode::Display => 1,
            ResolutionMode::HighResolution => 2,
        }
    }

    /// Normalize a raw history sample into local coordinates.
    pub fn normalize(self, raw: &HistoryPoint, screen: &VirtualScreen) -> MousePoint {
        match self {
            ResolutionMode::Display => MousePoint {
                x: unpack_display_coord(raw.x),
                y: unpack_display_coord(raw.y),
            },
            ResolutionMode::HighResolution => MousePoint {
                x: scale_high_res_coord(raw.x, screen.left, screen.width),
                y: scale_high_res_coord(raw.y, screen.top, screen.height),
            },
        }
    }
}

/// Bounding geometry of all displays combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VirtualScreen {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

/// Keep the low 16 bits of a coordinate.
pub fn mask_coord(value: i32) -> i32 {
    value & 0x0000_FFFF
}

/// Recover a signed coordinate from a packed 16-bit display value.
pub fn unpack_display_coord(raw: i32) -> i32 {
    if raw >= 0x8000 {
        raw - 0x1_0000
    } else {
        raw
    }
}

/// Rescale an absolute high-resolution coordinate into virtual-screen pixels.
///
/// `local = (raw * (extent - 1) - origin * 65536) / extent`, truncating
/// toward zero. A non-positive extent leaves the value untouched.
pub fn scale_high_res_coord(raw: i32, origin: i32, extent: i32) -> i32 {
    if extent <= 0 {
        return raw;
    }
    let scaled = (raw as i64 * (extent as i64 - 1) - origin as i64 * 65536) / extent as i64;
    scaled as i32
}
