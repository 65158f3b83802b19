use crate::foundation::error::{FlipbookError, FlipbookResult};

pub use kurbo::{BezPath, Point, Rect, Vec2};

/// Lowest playback rate the studio accepts.
pub const MIN_FPS: u32 = 12;
/// Highest playback rate the studio accepts.
pub const MAX_FPS: u32 = 60;

/// Stable identifier of a [`crate::Layer`] within a project.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct LayerId(pub u64);

/// Stable identifier of a [`crate::Frame`] within a project.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameId(pub u64);

/// Playback rate in ticks per second; one tick lasts `1000 / fps` milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Fps(u32);

impl Fps {
    /// Build a rate, rejecting values outside `[MIN_FPS, MAX_FPS]`.
    pub fn new(fps: u32) -> FlipbookResult<Self> {
        if !(MIN_FPS..=MAX_FPS).contains(&fps) {
            return Err(FlipbookError::validation(format!(
                "fps must be in [{MIN_FPS}, {MAX_FPS}], got {fps}"
            )));
        }
        Ok(Self(fps))
    }

    /// Ticks per second.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Length of one tick in milliseconds.
    pub fn tick_ms(self) -> f64 {
        1000.0 / f64::from(self.0)
    }

    /// Duration of `ticks` in seconds.
    pub fn ticks_to_secs(self, ticks: u64) -> f64 {
        (ticks as f64) / f64::from(self.0)
    }

    /// Duration of `ticks` in milliseconds.
    pub fn ticks_to_ms(self, ticks: u64) -> f64 {
        (ticks as f64) * self.tick_ms()
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self(12)
    }
}

impl TryFrom<u32> for Fps {
    type Error = FlipbookError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Fps> for u32 {
    fn from(value: Fps) -> Self {
        value.0
    }
}

/// Canvas dimensions shared by every frame of a project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Build a canvas, rejecting a zero side.
    pub fn new(width: u32, height: u32) -> FlipbookResult<Self> {
        if width == 0 || height == 0 {
            return Err(FlipbookError::validation("canvas width/height must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// `width * height`.
    pub fn pixel_count(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha; `0` is fully transparent.
    pub a: u8,
}

impl Rgba8 {
    /// Transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Color from straight channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Color from `[r, g, b, a]` bytes.
    pub const fn from_array(px: [u8; 4]) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }

    /// `[r, g, b, a]` bytes.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> FlipbookResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(FlipbookError::validation(format!(
                "invalid hex color '{s}'"
            )));
        }
        let channel = |i: usize| -> FlipbookResult<u8> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| FlipbookError::validation(format!("invalid hex color '{s}'")))
        };
        match hex.len() {
            6 => Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, 255)),
            8 => Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => Err(FlipbookError::validation(format!(
                "invalid hex color '{s}'"
            ))),
        }
    }

    /// Premultiply into the rasterizer's byte order.
    pub fn to_premul(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let premul = |c: u8| -> u8 { crate::foundation::math::mul_div255_u8(u16::from(c), a) };
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }
}

impl From<Rgb8> for Rgba8 {
    fn from(c: Rgb8) -> Self {
        Self::new(c.r, c.g, c.b, 255)
    }
}

/// Opaque RGB8 color, used where alpha is forced to 255 (fill tool).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Rgb8 {
    /// Opaque color from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
